pub mod admin_banner;
pub mod app;
pub mod hooks;
pub mod video_stage;
pub mod zoom_controls;

pub use app::{App, AppProps};
