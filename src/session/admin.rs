use tracing::{debug, info, warn};

use super::storage::{KeyValueStore, StorageError};

pub const ADMIN_PRINCIPAL_KEY: &str = "vs_admin_principal";
pub const ADMIN_SESSION_VERSION_KEY: &str = "vs_admin_session_version";
/// Bump to invalidate every cached admin session on next load.
pub const CURRENT_SCHEMA_VERSION: &str = "2";

/// Persistent "this principal is an admin" flag.
///
/// Only positive backend answers are ever written here. An empty cache means
/// "unknown, ask the backend", never "confirmed non-admin". Storage failures
/// are logged and read as an empty cache.
#[derive(Debug, Clone)]
pub struct AdminSessionCache<S> {
    store: S,
}

impl<S: KeyValueStore> AdminSessionCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set_admin_principal(&self, principal: &str) {
        let res = self
            .store
            .set(ADMIN_PRINCIPAL_KEY, principal)
            .and_then(|()| {
                self.store
                    .set(ADMIN_SESSION_VERSION_KEY, CURRENT_SCHEMA_VERSION)
            });
        match res {
            Ok(()) => debug!(principal, "Stored admin principal"),
            Err(err) => warn!(%err, "Failed to store admin principal"),
        }
    }

    pub fn stored_principal(&self) -> Option<String> {
        self.read(ADMIN_PRINCIPAL_KEY)
    }

    pub fn session_version(&self) -> Option<String> {
        self.read(ADMIN_SESSION_VERSION_KEY)
    }

    pub fn has_stored_admin(&self) -> bool {
        self.stored_principal().is_some()
    }

    /// Whether the stored record is valid admin evidence for `principal`.
    ///
    /// A record written under another schema version is deleted on sight.
    pub fn is_stored_admin(&self, principal: &str) -> bool {
        let stored = self.stored_principal();
        let version = self.session_version();
        if stored.is_none() && version.is_none() {
            return false;
        }
        if version.as_deref() != Some(CURRENT_SCHEMA_VERSION) {
            debug!(?version, "Discarding admin session from another schema version");
            self.clear_admin_principal();
            return false;
        }
        stored.as_deref() == Some(principal)
    }

    pub fn clear_admin_principal(&self) {
        // Attempt both removals even if the first one fails.
        let a = self.store.remove(ADMIN_PRINCIPAL_KEY);
        let b = self.store.remove(ADMIN_SESSION_VERSION_KEY);
        if let Err(err) = a.and(b) {
            warn!(%err, "Failed to clear admin principal");
        }
    }

    /// True when something is stored under a schema version other than the
    /// current one. An empty store is not a mismatch.
    pub fn needs_revalidation(&self) -> bool {
        match self.session_version() {
            Some(v) => v != CURRENT_SCHEMA_VERSION,
            None => self.has_stored_admin(),
        }
    }

    pub fn force_reactivation(&self) {
        self.clear_admin_principal();
        info!("Admin session cleared for reactivation");
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|err: StorageError| {
            warn!(%err, key, "Failed to read admin session entry");
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStore;
    use std::rc::Rc;

    fn cache() -> (Rc<MemoryStore>, AdminSessionCache<Rc<MemoryStore>>) {
        let store = Rc::new(MemoryStore::new());
        (store.clone(), AdminSessionCache::new(store))
    }

    #[test_log::test]
    fn stored_admin_matches_only_its_principal() {
        let (_, cache) = cache();
        cache.set_admin_principal("principal-123");
        assert!(cache.is_stored_admin("principal-123"));
        assert!(!cache.is_stored_admin("principal-456"));
        // the mismatch did not purge the record
        assert!(cache.is_stored_admin("principal-123"));
    }

    #[test_log::test]
    fn cleared_cache_is_not_admin() {
        let (store, cache) = cache();
        cache.set_admin_principal("p");
        cache.clear_admin_principal();
        assert!(!cache.is_stored_admin("p"));
        assert!(store.is_empty());
        cache.clear_admin_principal();
    }

    #[test_log::test]
    fn fresh_cache_needs_no_revalidation() {
        let (_, cache) = cache();
        assert!(!cache.needs_revalidation());
        assert!(!cache.is_stored_admin("p"));
    }

    #[test_log::test]
    fn stale_version_is_purged_on_read() {
        let (store, cache) = cache();
        cache.set_admin_principal("p");
        store.set(ADMIN_SESSION_VERSION_KEY, "1").unwrap();
        assert!(cache.needs_revalidation());

        assert!(!cache.is_stored_admin("p"));
        assert!(!cache.needs_revalidation());
        assert!(store.is_empty());
    }

    #[test_log::test]
    fn principal_without_version_needs_revalidation() {
        let (store, cache) = cache();
        store.set(ADMIN_PRINCIPAL_KEY, "p").unwrap();
        assert!(cache.needs_revalidation());
        assert!(!cache.is_stored_admin("p"));
        assert!(!cache.has_stored_admin());
    }

    #[test_log::test]
    fn overwrite_keeps_only_latest_principal() {
        let (_, cache) = cache();
        cache.set_admin_principal("a");
        cache.set_admin_principal("b");
        assert!(!cache.is_stored_admin("a"));
        assert!(cache.is_stored_admin("b"));
        assert_eq!(cache.session_version().as_deref(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test_log::test]
    fn force_reactivation_clears_record() {
        let (_, cache) = cache();
        cache.set_admin_principal("p");
        cache.force_reactivation();
        assert!(!cache.has_stored_admin());
        assert!(!cache.is_stored_admin("p"));
    }

    #[test_log::test]
    fn storage_failures_degrade_to_empty() {
        let (store, cache) = cache();
        cache.set_admin_principal("p");
        store.set_unavailable(true);
        assert!(!cache.is_stored_admin("p"));
        assert!(!cache.needs_revalidation());
        cache.set_admin_principal("q");
        cache.clear_admin_principal();
        store.set_unavailable(false);
        // writes while unavailable were dropped, the old record survived
        assert!(cache.is_stored_admin("p"));
    }
}
