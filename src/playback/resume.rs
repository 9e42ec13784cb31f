use tracing::debug;

use crate::backend::ProgressBackend;

/// Positions this close to the start are not worth resuming or saving.
pub const HEAD_MARGIN_SECS: f64 = 5.0;
/// Positions this close to the end count as finished.
pub const TAIL_MARGIN_SECS: f64 = 10.0;
/// Minimum movement since the last save before another one is scheduled.
pub const MIN_SAVE_DELTA_SECS: f64 = 5.0;
/// A scheduled save fires once time updates have been quiet this long.
pub const SAVE_DEBOUNCE_MS: f64 = 2_000.0;

fn inside_margins(time: f64, duration: f64) -> bool {
    time > HEAD_MARGIN_SECS && time < duration - TAIL_MARGIN_SECS
}

/// Whether playback should jump to a saved position once metadata loads.
pub fn should_resume(saved: f64, duration: f64) -> bool {
    saved > 0.0 && inside_margins(saved, duration)
}

/// Backend stores whole seconds.
pub fn whole_secs(time: f64) -> u64 {
    if time.is_finite() && time > 0.0 {
        time.floor() as u64
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSave {
    time: f64,
    due_ms: f64,
}

/// Decides when the "continue watching" position gets written back.
///
/// Callers feed player events in and send every returned time to the
/// backend. Timestamps are milliseconds from any monotonic-enough clock.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    enabled: bool,
    resumed: bool,
    last_saved: f64,
    pending: Option<PendingSave>,
}

impl ProgressTracker {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Anonymous viewers and moderated videos never save.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending = None;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The seek target, at most once per tracker.
    pub fn resume_point(&mut self, saved: f64, duration: f64) -> Option<f64> {
        if !self.enabled || self.resumed || !should_resume(saved, duration) {
            return None;
        }
        self.resumed = true;
        debug!(saved, "Resuming playback");
        Some(saved)
    }

    pub fn on_time_update(&mut self, time: f64, duration: f64, now_ms: f64) {
        if !self.enabled || time < HEAD_MARGIN_SECS || time > duration - TAIL_MARGIN_SECS {
            return;
        }
        if (time - self.last_saved).abs() < MIN_SAVE_DELTA_SECS {
            return;
        }
        self.pending = Some(PendingSave {
            time,
            due_ms: now_ms + SAVE_DEBOUNCE_MS,
        });
    }

    /// Returns the scheduled save once it is due.
    pub fn poll(&mut self, now_ms: f64) -> Option<f64> {
        let pending = self.pending.filter(|p| now_ms >= p.due_ms)?;
        self.pending = None;
        self.last_saved = pending.time;
        Some(pending.time)
    }

    pub fn on_pause(&mut self, time: f64) -> Option<f64> {
        self.flush_now(time)
    }

    /// Finished videos restart from the top next time.
    pub fn on_ended(&mut self) -> Option<f64> {
        self.flush_now(0.0)
    }

    /// Unload, tab hidden, or the player going away.
    pub fn on_leave(&mut self, time: f64, duration: f64) -> Option<f64> {
        if !inside_margins(time, duration) {
            return None;
        }
        self.flush_now(time)
    }

    fn flush_now(&mut self, time: f64) -> Option<f64> {
        if !self.enabled {
            return None;
        }
        self.pending = None;
        self.last_saved = time;
        Some(time)
    }
}

/// Fetches the saved position; any failure reads as "nothing saved".
pub async fn load_progress(backend: &dyn ProgressBackend, video_id: &str) -> f64 {
    match backend.video_progress(video_id).await {
        Ok(secs) => secs as f64,
        Err(err) => {
            debug!(%err, video_id, "No saved progress");
            0.0
        }
    }
}

/// Progress saves fail silently.
pub async fn save_progress(backend: &dyn ProgressBackend, video_id: &str, time: f64) {
    if let Err(err) = backend.save_video_progress(video_id, whole_secs(time)).await {
        debug!(%err, video_id, "Progress save failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, BackendResult};
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[test]
    fn resume_only_inside_margins() {
        assert!(!should_resume(0.0, 100.0));
        assert!(!should_resume(3.0, 100.0));
        assert!(should_resume(50.0, 100.0));
        assert!(!should_resume(95.0, 100.0));
        assert!(!should_resume(50.0, f64::NAN));
    }

    #[test]
    fn resumes_once() {
        let mut t = ProgressTracker::new(true);
        assert_eq!(t.resume_point(42.0, 100.0), Some(42.0));
        assert_eq!(t.resume_point(42.0, 100.0), None);
        assert_eq!(ProgressTracker::new(false).resume_point(42.0, 100.0), None);
    }

    #[test]
    fn time_updates_are_debounced() {
        let mut t = ProgressTracker::new(true);
        t.on_time_update(10.0, 100.0, 0.0);
        t.on_time_update(11.0, 100.0, 1_000.0);
        assert_eq!(t.poll(2_500.0), None);
        assert_eq!(t.poll(3_000.0), Some(11.0));
        assert_eq!(t.poll(9_000.0), None);

        // too close to the last save
        t.on_time_update(14.0, 100.0, 10_000.0);
        assert_eq!(t.poll(20_000.0), None);
        t.on_time_update(16.0, 100.0, 20_000.0);
        assert_eq!(t.poll(22_000.0), Some(16.0));
    }

    #[test]
    fn updates_near_edges_are_ignored() {
        let mut t = ProgressTracker::new(true);
        t.on_time_update(4.0, 100.0, 0.0);
        t.on_time_update(95.0, 100.0, 0.0);
        assert_eq!(t.poll(10_000.0), None);
    }

    #[test]
    fn pause_and_end_save_immediately() {
        let mut t = ProgressTracker::new(true);
        t.on_time_update(30.0, 100.0, 0.0);
        assert_eq!(t.on_pause(31.0), Some(31.0));
        assert_eq!(t.poll(5_000.0), None);
        assert_eq!(t.on_ended(), Some(0.0));
        assert_eq!(t.on_leave(92.0, 100.0), None);
        assert_eq!(t.on_leave(40.0, 100.0), Some(40.0));
    }

    #[test]
    fn disabled_tracker_never_saves() {
        let mut t = ProgressTracker::new(true);
        t.on_time_update(30.0, 100.0, 0.0);
        t.set_enabled(false);
        assert_eq!(t.poll(5_000.0), None);
        assert_eq!(t.on_pause(31.0), None);
        assert_eq!(t.on_ended(), None);
    }

    #[derive(Default)]
    struct Recorder {
        saved: RefCell<Vec<(String, u64)>>,
    }

    impl ProgressBackend for Recorder {
        fn video_progress<'a>(&'a self, _video_id: &'a str) -> BackendResult<'a, u64> {
            Box::pin(async { Err(BackendError::Rejected("no progress".into())) })
        }
        fn save_video_progress<'a>(&'a self, video_id: &'a str, secs: u64) -> BackendResult<'a, ()> {
            self.saved.borrow_mut().push((video_id.to_owned(), secs));
            Box::pin(async { Ok(()) })
        }
    }

    #[test_log::test]
    fn backend_helpers_degrade_and_floor() {
        let backend = Recorder::default();
        assert_eq!(block_on(load_progress(&backend, "v1")), 0.0);
        block_on(save_progress(&backend, "v1", 41.9));
        assert_eq!(*backend.saved.borrow(), vec![("v1".to_owned(), 41)]);
    }
}
