//! Client-side key/value persistence used to resume drafts across reloads.
//!
//! Browsers back this with local storage; the terminal host uses a JSON file.

use async_trait::async_trait;

mod file;
mod keys;
mod memory;

pub use file::FileSessionStore;
pub use keys::{KeySpace, StoreKey, KEY_SCHEMA_VERSION};
pub use memory::InMemorySessionStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
