// src/store/fs.rs
// =============================================================================
// Filesystem-backed store: every key is a file directly inside `root`.
//
// Writes go to a hidden temporary sibling first and are then renamed into
// place. If the process dies mid-write, the key simply does not exist yet,
// so a restarted run refetches it instead of reading a truncated document.
//
// Layout on disk, for root "cache/":
//   cache/abc123.json           finished entry
//   cache/.abc123.json.partial  write in progress (or left by a crash)
//
// Rust concepts:
// - #[async_trait]: async fn in a trait used as `dyn KeyValueStore`
// - Match guards on io::ErrorKind to treat "not found" as an ordinary miss
// =============================================================================

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{validate_key, KeyValueStore, StoreError};

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    // Store rooted at a directory
    //
    // The directory is created lazily on the first `put`, so reading from a
    // store that was never written is just a miss.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Validates the key, then joins it onto the root
    // "abc.json" -> "<root>/abc.json"; "../x" -> InvalidKey
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

// Attaches the key to an io::Error so the message says which entry failed
fn io_error(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl KeyValueStore for FsStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        // A missing file is a miss, every other read failure is an error
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    // Write to ".{key}.partial", then rename over "{key}"
    //
    // rename within one directory replaces the target in a single step, so a
    // reader sees either the old value or the new one, never half of it.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(key, e))?;

        let partial = self.root.join(format!(".{}.partial", key));
        fs::write(&partial, value)
            .await
            .map_err(|e| io_error(key, e))?;
        fs::rename(&partial, &path)
            .await
            .map_err(|e| io_error(key, e))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        fs::try_exists(&path).await.map_err(|e| io_error(key, e))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why tokio::fs instead of std::fs?
//    - std::fs blocks the thread; tokio::fs runs the call on a blocking pool
//    - The rest of the program is async, so we keep the runtime responsive
//
// 2. What is `Err(e) if e.kind() == ErrorKind::NotFound`?
//    - A match arm with a guard: only taken when the condition is true
//    - Other errors (permissions, disk full) fall through to the next arm
//
// 3. Why is the partial file hidden (leading dot)?
//    - So a directory listing of the cache shows only finished entries
//    - A leftover partial file is harmless; the next put overwrites it
// -----------------------------------------------------------------------------
