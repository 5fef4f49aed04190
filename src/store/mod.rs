// src/store/mod.rs
// =============================================================================
// A minimal key-value interface over persisted state.
//
// Both the link registry and the detail cache persist through this trait, so
// the crawl and extract logic never touch file paths directly:
// - fs: one file per key inside a directory (production)
// - memory: a HashMap behind a mutex (tests, dry runs)
// =============================================================================

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Keys must be a single, plain path component
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Byte-oriented storage keyed by short strings.
///
/// Implementations must make `put` atomic from the point of view of `get`:
/// a reader sees either the previous value or the complete new one.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
}

// Rejects anything that could escape the store root or collide with the
// temporary files written by FsStore.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0']);

    if bad {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
