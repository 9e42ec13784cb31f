pub mod access;
pub mod admin;
pub mod query;
pub mod storage;

pub use access::{AdminAccess, SessionSync};
pub use admin::AdminSessionCache;
pub use query::{AdminQuery, QueryCache, QueryKey};
pub use storage::{BrowserStorage, KeyValueStore, MemoryStore, StorageError};
