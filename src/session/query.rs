use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminQuery {
    IsCallerAdmin,
    VerifyAdminAccess,
}

impl AdminQuery {
    pub const ALL: [AdminQuery; 2] = [AdminQuery::IsCallerAdmin, AdminQuery::VerifyAdminAccess];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: AdminQuery,
    pub principal: String,
}

impl QueryKey {
    pub fn new(kind: AdminQuery, principal: &str) -> Self {
        Self {
            kind,
            principal: principal.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Fresh(bool),
    Invalidated,
}

/// Client-side cache of answered queries, shared by handle.
///
/// A missing or invalidated entry means the next reader must fetch.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Rc<RefCell<HashMap<QueryKey, QueryState>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<bool> {
        match self.entries.borrow().get(key) {
            Some(QueryState::Fresh(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn state(&self, key: &QueryKey) -> Option<QueryState> {
        self.entries.borrow().get(key).copied()
    }

    pub fn set_data(&self, key: QueryKey, value: bool) {
        self.entries
            .borrow_mut()
            .insert(key, QueryState::Fresh(value));
    }

    pub fn invalidate(&self, key: QueryKey) {
        self.entries
            .borrow_mut()
            .insert(key, QueryState::Invalidated);
    }

    pub fn needs_fetch(&self, key: &QueryKey) -> bool {
        self.get(key).is_none()
    }

    pub fn remove_principal(&self, principal: &str) {
        self.entries
            .borrow_mut()
            .retain(|k, _| k.principal != principal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidated_entries_need_fetch() {
        let cache = QueryCache::new();
        let key = QueryKey::new(AdminQuery::IsCallerAdmin, "p");
        assert!(cache.needs_fetch(&key));
        cache.set_data(key.clone(), true);
        assert_eq!(cache.get(&key), Some(true));
        cache.invalidate(key.clone());
        assert_eq!(cache.state(&key), Some(QueryState::Invalidated));
        assert!(cache.needs_fetch(&key));
    }

    #[test]
    fn handles_share_entries() {
        let cache = QueryCache::new();
        let other = cache.clone();
        other.set_data(QueryKey::new(AdminQuery::VerifyAdminAccess, "p"), false);
        other.set_data(QueryKey::new(AdminQuery::VerifyAdminAccess, "q"), true);
        assert_eq!(
            cache.get(&QueryKey::new(AdminQuery::VerifyAdminAccess, "p")),
            Some(false)
        );
        cache.remove_principal("p");
        assert_eq!(other.state(&QueryKey::new(AdminQuery::VerifyAdminAccess, "p")), None);
        assert_eq!(other.get(&QueryKey::new(AdminQuery::VerifyAdminAccess, "q")), Some(true));
    }
}
