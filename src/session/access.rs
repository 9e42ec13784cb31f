use tracing::{debug, info, warn};

use super::admin::AdminSessionCache;
use super::query::{AdminQuery, QueryCache, QueryKey};
use super::storage::KeyValueStore;
use crate::backend::{AdminBackend, BackendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSync {
    /// A record from an older schema was dropped; both queries must refetch.
    Reactivated,
    /// Valid stored evidence; both queries answered `true` locally.
    Restored,
    /// Nothing usable stored; both queries must refetch.
    Unverified,
}

/// Keeps the admin session cache and the admin query entries coherent.
///
/// Call [`AdminAccess::sync_session`] at session start and whenever the
/// active principal changes, then read through `is_caller_admin` /
/// `verify_admin_access`, which only hit the backend when nothing valid is
/// cached locally.
#[derive(Debug, Clone)]
pub struct AdminAccess<S> {
    session: AdminSessionCache<S>,
    queries: QueryCache,
}

impl<S: KeyValueStore> AdminAccess<S> {
    pub fn new(session: AdminSessionCache<S>, queries: QueryCache) -> Self {
        Self { session, queries }
    }

    pub fn session(&self) -> &AdminSessionCache<S> {
        &self.session
    }

    pub fn queries(&self) -> &QueryCache {
        &self.queries
    }

    pub fn sync_session(&self, principal: &str) -> SessionSync {
        if self.session.needs_revalidation() {
            info!("Forcing admin session reactivation due to version mismatch");
            self.session.force_reactivation();
            self.invalidate_all(principal);
            return SessionSync::Reactivated;
        }
        if self.session.is_stored_admin(principal) {
            debug!("Restoring admin session from local storage");
            for kind in AdminQuery::ALL {
                self.queries.set_data(QueryKey::new(kind, principal), true);
            }
            SessionSync::Restored
        } else {
            debug!("No stored admin session, backend verification required");
            self.invalidate_all(principal);
            SessionSync::Unverified
        }
    }

    pub fn cached(&self, kind: AdminQuery, principal: &str) -> Option<bool> {
        self.queries.get(&QueryKey::new(kind, principal))
    }

    pub async fn is_caller_admin(&self, principal: &str, backend: &dyn AdminBackend) -> bool {
        let is_admin = if self.session.is_stored_admin(principal) {
            debug!("Admin session restored from local storage");
            true
        } else {
            debug!("Checking admin status with backend");
            self.record(principal, backend.is_caller_admin().await)
        };
        self.queries
            .set_data(QueryKey::new(AdminQuery::IsCallerAdmin, principal), is_admin);
        is_admin
    }

    pub async fn verify_admin_access(&self, principal: &str, backend: &dyn AdminBackend) -> bool {
        if self.session.needs_revalidation() {
            info!("Session version mismatch, forcing revalidation");
            self.session.force_reactivation();
        }
        let is_admin = if self.session.is_stored_admin(principal) {
            debug!("Admin session restored from local storage (verify)");
            true
        } else {
            debug!("Verifying admin access with backend");
            let confirmed = self.record(principal, backend.verify_admin_access().await);
            if confirmed {
                self.queries
                    .set_data(QueryKey::new(AdminQuery::IsCallerAdmin, principal), true);
            }
            confirmed
        };
        self.queries
            .set_data(QueryKey::new(AdminQuery::VerifyAdminAccess, principal), is_admin);
        is_admin
    }

    pub fn logout(&self, principal: &str) {
        self.session.clear_admin_principal();
        self.queries.remove_principal(principal);
    }

    /// Persists a positive answer. Negative answers and failures are
    /// returned as `false` and leave storage untouched.
    fn record(&self, principal: &str, answer: Result<bool, BackendError>) -> bool {
        match answer {
            Ok(true) => {
                info!("Admin status confirmed by backend");
                self.session.set_admin_principal(principal);
                true
            }
            Ok(false) => false,
            Err(err) => {
                warn!(%err, "Admin check failed");
                false
            }
        }
    }

    fn invalidate_all(&self, principal: &str) {
        for kind in AdminQuery::ALL {
            self.queries.invalidate(QueryKey::new(kind, principal));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendResult;
    use crate::session::admin::ADMIN_SESSION_VERSION_KEY;
    use crate::session::query::QueryState;
    use crate::session::storage::MemoryStore;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeBackend {
        answer: Result<bool, BackendError>,
        calls: Cell<u32>,
    }

    impl FakeBackend {
        fn new(answer: Result<bool, BackendError>) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }

        fn reply(&self) -> BackendResult<'_, bool> {
            self.calls.set(self.calls.get() + 1);
            let answer = self.answer.clone();
            Box::pin(async move { answer })
        }
    }

    impl AdminBackend for FakeBackend {
        fn is_caller_admin(&self) -> BackendResult<'_, bool> {
            self.reply()
        }
        fn verify_admin_access(&self) -> BackendResult<'_, bool> {
            self.reply()
        }
    }

    fn access() -> (Rc<MemoryStore>, AdminAccess<Rc<MemoryStore>>) {
        let store = Rc::new(MemoryStore::new());
        let access = AdminAccess::new(AdminSessionCache::new(store.clone()), QueryCache::new());
        (store, access)
    }

    #[test_log::test]
    fn positive_answer_is_cached_and_short_circuits() {
        let (_, access) = access();
        let backend = FakeBackend::new(Ok(true));
        assert!(block_on(access.is_caller_admin("p", &backend)));
        assert!(block_on(access.is_caller_admin("p", &backend)));
        assert_eq!(backend.calls.get(), 1);
        assert!(access.session().is_stored_admin("p"));
        assert_eq!(access.cached(AdminQuery::IsCallerAdmin, "p"), Some(true));
    }

    #[test_log::test]
    fn negative_answer_is_never_persisted() {
        let (store, access) = access();
        let backend = FakeBackend::new(Ok(false));
        assert!(!block_on(access.verify_admin_access("p", &backend)));
        assert!(!block_on(access.verify_admin_access("p", &backend)));
        assert_eq!(backend.calls.get(), 2);
        assert!(store.is_empty());
        assert_eq!(access.cached(AdminQuery::VerifyAdminAccess, "p"), Some(false));
    }

    #[test_log::test]
    fn backend_failure_reads_as_not_admin() {
        let (store, access) = access();
        let backend = FakeBackend::new(Err(BackendError::Unavailable));
        assert!(!block_on(access.is_caller_admin("p", &backend)));
        assert!(store.is_empty());
    }

    #[test_log::test]
    fn verify_also_answers_is_caller_admin() {
        let (_, access) = access();
        let backend = FakeBackend::new(Ok(true));
        assert!(block_on(access.verify_admin_access("p", &backend)));
        assert_eq!(access.cached(AdminQuery::IsCallerAdmin, "p"), Some(true));
        assert_eq!(access.cached(AdminQuery::VerifyAdminAccess, "p"), Some(true));
    }

    #[test_log::test]
    fn sync_restores_valid_session() {
        let (_, access) = access();
        access.session().set_admin_principal("p");
        assert_eq!(access.sync_session("p"), SessionSync::Restored);
        for kind in AdminQuery::ALL {
            assert_eq!(access.cached(kind, "p"), Some(true));
        }
    }

    #[test_log::test]
    fn sync_for_other_principal_invalidates() {
        let (_, access) = access();
        access.session().set_admin_principal("p");
        assert_eq!(access.sync_session("q"), SessionSync::Unverified);
        let key = QueryKey::new(AdminQuery::IsCallerAdmin, "q");
        assert_eq!(access.queries().state(&key), Some(QueryState::Invalidated));
        // the stored record for p is kept
        assert!(access.session().is_stored_admin("p"));
    }

    #[test_log::test]
    fn sync_reactivates_stale_schema() {
        let (store, access) = access();
        access.session().set_admin_principal("p");
        access.queries().set_data(QueryKey::new(AdminQuery::IsCallerAdmin, "p"), true);
        store.set(ADMIN_SESSION_VERSION_KEY, "1").unwrap();

        assert_eq!(access.sync_session("p"), SessionSync::Reactivated);
        assert!(store.is_empty());
        assert_eq!(access.cached(AdminQuery::IsCallerAdmin, "p"), None);

        let backend = FakeBackend::new(Ok(true));
        assert!(block_on(access.verify_admin_access("p", &backend)));
        assert_eq!(backend.calls.get(), 1);
    }

    #[test_log::test]
    fn verify_discards_stale_record_before_trusting_it() {
        let (store, access) = access();
        access.session().set_admin_principal("p");
        store.set(ADMIN_SESSION_VERSION_KEY, "0").unwrap();
        let backend = FakeBackend::new(Ok(false));
        assert!(!block_on(access.verify_admin_access("p", &backend)));
        assert_eq!(backend.calls.get(), 1);
        assert!(store.is_empty());
    }

    #[test_log::test]
    fn logout_drops_record_and_queries() {
        let (_, access) = access();
        access.session().set_admin_principal("p");
        access.sync_session("p");
        access.logout("p");
        assert!(!access.session().has_stored_admin());
        assert_eq!(access.queries().state(&QueryKey::new(AdminQuery::IsCallerAdmin, "p")), None);
    }
}
