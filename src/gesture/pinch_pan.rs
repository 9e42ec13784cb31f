use serde::Deserialize;
use tracing::trace;

use super::geometry::{Point, Size, Transform, max_translation};

/// Reads the current size of the element the gesture is captured on.
///
/// Called on every clamp, so the container may resize between gestures.
/// `None` means the element is not measurable right now.
pub trait MeasureContainer {
    fn container_size(&self) -> Option<Size>;
}

impl MeasureContainer for Size {
    fn container_size(&self) -> Option<Size> {
        Some(*self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PinchPanConfig {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for PinchPanConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 3.0,
        }
    }
}

impl PinchPanConfig {
    fn normalized(self) -> Self {
        let min_scale = if self.min_scale.is_finite() && self.min_scale > 0.0 {
            self.min_scale
        } else {
            1.0
        };
        let max_scale = if self.max_scale.is_finite() {
            self.max_scale.max(min_scale)
        } else {
            min_scale
        };
        Self {
            min_scale,
            max_scale,
        }
    }
}

/// Tracking data for the touch sequence in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    /// Two fingers down; scale follows the ratio of finger distances.
    Pinching {
        baseline_distance: f64,
        baseline_scale: f64,
    },
    /// One finger down while zoomed in; translation follows the finger.
    Panning { anchor: Point },
}

/// Turns touch sequences into a bounded scale + translate transform.
///
/// The transform is sticky between gestures. While at `min_scale` the
/// content is centred and cannot be panned; above it, translation is
/// clamped so the scaled content always covers the container.
#[derive(Debug, Clone)]
pub struct PinchPanController<M> {
    config: PinchPanConfig,
    container: M,
    content: Size,
    transform: Transform,
    gesture: Gesture,
}

impl<M: MeasureContainer> PinchPanController<M> {
    pub fn new(config: PinchPanConfig, container: M, content: Size) -> Self {
        let config = config.normalized();
        Self {
            config,
            container,
            content,
            transform: Transform::identity(config.min_scale),
            gesture: Gesture::Idle,
        }
    }

    pub fn config(&self) -> PinchPanConfig {
        self.config
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn css_transform(&self) -> String {
        self.transform.to_css()
    }

    pub fn is_zoomed(&self) -> bool {
        self.transform.scale > self.config.min_scale
    }

    pub fn can_zoom_in(&self) -> bool {
        self.transform.scale < self.config.max_scale
    }

    pub fn can_zoom_out(&self) -> bool {
        self.is_zoomed()
    }

    /// The hosting page recomputes the natural video size from the
    /// container width; the current translation is re-clamped against it.
    pub fn set_content_size(&mut self, content: Size) {
        if self.content == content {
            return;
        }
        self.content = content;
        self.set_scale(self.transform.scale);
    }

    pub fn touch_start(&mut self, touches: &[Point]) {
        self.gesture = match touches {
            [a, b] => Gesture::Pinching {
                baseline_distance: a.distance(*b),
                baseline_scale: self.transform.scale,
            },
            [p] if self.is_zoomed() => Gesture::Panning { anchor: *p },
            _ => Gesture::Idle,
        };
        trace!(gesture = ?self.gesture, "touch start");
    }

    /// Returns true when the move was consumed by the gesture, in which case
    /// the caller should suppress the platform's default scrolling.
    pub fn touch_move(&mut self, touches: &[Point]) -> bool {
        match (self.gesture, touches) {
            (
                Gesture::Pinching {
                    baseline_distance,
                    baseline_scale,
                },
                [a, b],
            ) => {
                if baseline_distance > 0.0 {
                    let candidate = a.distance(*b) / baseline_distance * baseline_scale;
                    self.set_scale(candidate);
                }
                true
            }
            (Gesture::Panning { anchor }, [p]) if self.is_zoomed() => {
                self.translate_clamped(p.x - anchor.x, p.y - anchor.y);
                self.gesture = Gesture::Panning { anchor: *p };
                true
            }
            _ => false,
        }
    }

    pub fn touch_end(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Back to `min_scale`, centred. Gesture tracking is left alone.
    pub fn reset(&mut self) {
        self.transform = Transform::identity(self.config.min_scale);
    }

    pub fn zoom_in(&mut self, step: f64) {
        self.set_scale(self.transform.scale + step);
    }

    pub fn zoom_out(&mut self, step: f64) {
        self.set_scale(self.transform.scale - step);
    }

    /// Programmatic pan, e.g. from arrow buttons. No-op while not zoomed in.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if self.is_zoomed() {
            self.translate_clamped(dx, dy);
        }
    }

    fn set_scale(&mut self, candidate: f64) {
        if !candidate.is_finite() {
            return;
        }
        let scale = candidate.clamp(self.config.min_scale, self.config.max_scale);
        let (max_x, max_y) = self.bounds(scale).unwrap_or((0.0, 0.0));
        self.transform = Transform {
            scale,
            translate_x: self.transform.translate_x.clamp(-max_x, max_x),
            translate_y: self.transform.translate_y.clamp(-max_y, max_y),
        };
    }

    fn translate_clamped(&mut self, dx: f64, dy: f64) {
        let Some((max_x, max_y)) = self.bounds(self.transform.scale) else {
            trace!("container not measurable, skipping pan");
            return;
        };
        self.transform.translate_x = (self.transform.translate_x + dx).clamp(-max_x, max_x);
        self.transform.translate_y = (self.transform.translate_y + dy).clamp(-max_y, max_y);
    }

    fn bounds(&self, scale: f64) -> Option<(f64, f64)> {
        if scale <= self.config.min_scale {
            return Some((0.0, 0.0));
        }
        let container = self.container.container_size()?;
        Some(max_translation(scale, self.content, container))
    }
}
