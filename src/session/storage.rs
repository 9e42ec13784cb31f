use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("storage call failed: {0}")]
    Js(String),
}

impl From<JsValue> for StorageError {
    fn from(value: JsValue) -> Self {
        StorageError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Synchronous string key-value store that survives reloads.
///
/// Methods take `&self`: implementations live behind shared handles on a
/// single-threaded UI runtime.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// `window.localStorage`, looked up on every call so a store disabled after
/// start-up degrades to `Unavailable` instead of a stale handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn store(&self) -> Result<web_sys::Storage, StorageError> {
        let win = web_sys::window().ok_or(StorageError::Unavailable)?;
        win.local_storage()?.ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.store()?.get_item(key)?)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.store()?.set_item(key, value)?)
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Ok(self.store()?.remove_item(key)?)
    }
}

/// In-memory store, used off-browser and in tests.
///
/// `set_unavailable(true)` makes every call fail, mimicking a browser with
/// storage disabled or over quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    unavailable: RefCell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.borrow_mut() = unavailable;
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check(&self) -> Result<(), StorageError> {
        if *self.unavailable.borrow() {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a"), Ok(None));
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a"), Ok(Some("1".to_owned())));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set_unavailable(true);
        assert_eq!(store.get("a"), Err(StorageError::Unavailable));
        assert_eq!(store.set("b", "2"), Err(StorageError::Unavailable));
        assert_eq!(store.remove("a"), Err(StorageError::Unavailable));
        store.set_unavailable(false);
        assert_eq!(store.len(), 1);
    }
}
