pub mod resume;

pub use resume::{ProgressTracker, should_resume};
