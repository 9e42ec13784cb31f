// Suppression of the browser's own page zoom (double-tap and pinch) so the
// only zooming on the page is the player's. Elements can opt back in with
// `data-allow-zoom="true"` on themselves or any ancestor.

/// Two touchends closer than this count as a double tap.
pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;

pub const ALLOW_ZOOM_ATTR: &str = "data-allow-zoom";

/// True when any `data-allow-zoom` value on the path from the event target
/// up to the root is `"true"`.
pub fn opted_in<I, S>(path: I) -> bool
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    path.into_iter()
        .flatten()
        .any(|v| v.as_ref() == "true")
}

#[derive(Debug, Default, Clone)]
pub struct PageZoomGuard {
    last_touch_end: Option<f64>,
}

impl PageZoomGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the touchend should have its default prevented.
    pub fn on_touch_end(&mut self, now_ms: f64, opted_in: bool) -> bool {
        let double_tap = self
            .last_touch_end
            .is_some_and(|last| now_ms - last <= DOUBLE_TAP_WINDOW_MS);
        self.last_touch_end = Some(now_ms);
        double_tap && !opted_in
    }

    pub fn on_touch_move(touch_count: u32, opted_in: bool) -> bool {
        touch_count > 1 && !opted_in
    }

    pub fn on_gesture_start(opted_in: bool) -> bool {
        !opted_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_tap_inside_window_is_prevented() {
        let mut guard = PageZoomGuard::new();
        assert!(!guard.on_touch_end(1_000.0, false));
        assert!(guard.on_touch_end(1_250.0, false));
        assert!(!guard.on_touch_end(1_600.0, false));
    }

    #[test]
    fn opt_in_allows_double_tap() {
        let mut guard = PageZoomGuard::new();
        guard.on_touch_end(0.0, true);
        assert!(!guard.on_touch_end(100.0, true));
    }

    #[test]
    fn multi_touch_moves_are_prevented() {
        assert!(!PageZoomGuard::on_touch_move(1, false));
        assert!(PageZoomGuard::on_touch_move(2, false));
        assert!(!PageZoomGuard::on_touch_move(2, true));
        assert!(PageZoomGuard::on_gesture_start(false));
    }

    #[test]
    fn opt_in_searches_ancestors() {
        assert!(opted_in([None, Some("false"), Some("true")]));
        assert!(!opted_in([None::<&str>, None]));
        assert!(!opted_in(Vec::<Option<String>>::new()));
    }
}
