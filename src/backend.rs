// Typed surface of the remote backend. The generated client lives outside
// this crate; everything here only needs these calls.
use futures::future::LocalBoxFuture;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend is not reachable")]
    Unavailable,
    #[error("backend rejected the call: {0}")]
    Rejected(String),
}

pub type BackendResult<'a, T> = LocalBoxFuture<'a, Result<T, BackendError>>;

/// Idempotent privilege reads for the authenticated caller.
pub trait AdminBackend {
    fn is_caller_admin(&self) -> BackendResult<'_, bool>;
    fn verify_admin_access(&self) -> BackendResult<'_, bool>;
}

pub trait ProgressBackend {
    /// Saved position in whole seconds, 0 when nothing was saved.
    fn video_progress<'a>(&'a self, video_id: &'a str) -> BackendResult<'a, u64>;
    fn save_video_progress<'a>(&'a self, video_id: &'a str, secs: u64) -> BackendResult<'a, ()>;
}

/// Stand-in used when no backend client is configured: every call fails
/// with `Unavailable`, which callers treat as "not admin" / "no progress".
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

impl AdminBackend for OfflineBackend {
    fn is_caller_admin(&self) -> BackendResult<'_, bool> {
        Box::pin(async { Err(BackendError::Unavailable) })
    }
    fn verify_admin_access(&self) -> BackendResult<'_, bool> {
        Box::pin(async { Err(BackendError::Unavailable) })
    }
}

impl ProgressBackend for OfflineBackend {
    fn video_progress<'a>(&'a self, _video_id: &'a str) -> BackendResult<'a, u64> {
        Box::pin(async { Err(BackendError::Unavailable) })
    }
    fn save_video_progress<'a>(&'a self, _video_id: &'a str, _secs: u64) -> BackendResult<'a, ()> {
        Box::pin(async { Err(BackendError::Unavailable) })
    }
}
