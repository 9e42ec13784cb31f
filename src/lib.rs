pub mod backend;
pub mod components;
pub mod config;
pub mod gesture;
pub mod logging;
pub mod playback;
pub mod session;
