pub mod geometry;
pub mod pinch_pan;
pub mod zoom_guard;

pub use geometry::{Point, Size, Transform};
pub use pinch_pan::{Gesture, MeasureContainer, PinchPanConfig, PinchPanController};
pub use zoom_guard::PageZoomGuard;
