// src/registry.rs
// =============================================================================
// The link registry: the persisted, ordered list of detail links to fetch.
//
// File format (newline-delimited URLs, UTF-8):
//   https://api.divar.ir/v8/posts-v2/web/abc123
//   https://api.divar.ir/v8/posts-v2/web/def456
//
// How it is used:
// 1. After a crawl finds links, the pipeline saves them here
// 2. On the next run, a non-empty registry replaces the crawl entirely
// 3. `--refresh` ignores it and overwrites it with a fresh crawl
//
// Rust concepts:
// - impl Into<String>: accept both &str and String for the key
// - Iterator chains: lines() -> trim -> filter -> collect
// =============================================================================

use std::sync::Arc;
use tracing::debug;

use crate::error::{HarvestError, Result};
use crate::store::KeyValueStore;

pub const DEFAULT_REGISTRY_KEY: &str = "links.txt";

pub struct LinkRegistry {
    store: Arc<dyn KeyValueStore>,
    key: String,   // Store key, "links.txt" unless configured otherwise
}

impl LinkRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    // Saves the links, one per line, replacing any previous list
    //
    // Parameters:
    //   links: detail URLs in crawl order
    //
    // Example:
    //   save(&["https://x/web/a".into(), "https://x/web/b".into()])
    //   -> file contents "https://x/web/a\nhttps://x/web/b\n"
    pub async fn save(&self, links: &[String]) -> Result<()> {
        let mut body = String::new();
        for link in links {
            body.push_str(link);
            body.push('\n');   // Trailing newline on every line, including the last
        }
        self.store.put(&self.key, body.as_bytes()).await?;
        debug!(key = %self.key, count = links.len(), "saved link registry");
        Ok(())
    }

    // Loads the links in the order they were saved
    //
    // Returns:
    //   - Empty Vec if nothing was ever saved
    //   - Blank lines and surrounding whitespace are dropped
    //   - CorruptRegistry if the file is not valid UTF-8
    pub async fn load(&self) -> Result<Vec<String>> {
        let bytes = match self.store.get(&self.key).await? {
            Some(bytes) => bytes,
            None => return Ok(Vec::new()),
        };

        let text = String::from_utf8(bytes).map_err(|_| HarvestError::CorruptRegistry {
            key: self.key.clone(),
        })?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    // True once a registry has been saved, even an empty one
    //
    // The pipeline resumes on `load()` being non-empty, not on this.
    pub async fn exists(&self) -> Result<bool> {
        Ok(self.store.exists(&self.key).await?)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a plain text file instead of JSON?
//    - One URL per line is easy to inspect, edit, or trim by hand
//    - `wc -l links.txt` tells you how many listings are queued
//
// 2. Why does load() skip blank lines?
//    - Editors add trailing newlines; a hand-edited file should still load
//    - A file with only blank lines loads as empty, so the next run crawls
//
// 3. What does `.map(str::trim)` mean?
//    - It passes the function `str::trim` directly instead of a closure
//    - Same as `.map(|line| line.trim())`
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FsStore, MemoryStore};
    use tempfile::TempDir;

    fn sample_links() -> Vec<String> {
        vec![
            "https://api.example.com/v8/posts-v2/web/zzz999".to_string(),
            "https://api.example.com/v8/posts-v2/web/abc123".to_string(),
            "https://api.example.com/v8/posts-v2/web/mmm555".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let registry = LinkRegistry::new(Arc::new(MemoryStore::new()), DEFAULT_REGISTRY_KEY);
        assert!(!registry.exists().await.unwrap());

        registry.save(&sample_links()).await.unwrap();

        assert!(registry.exists().await.unwrap());
        assert_eq!(registry.load().await.unwrap(), sample_links());
    }

    #[tokio::test]
    async fn test_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let registry = LinkRegistry::new(Arc::new(FsStore::new(dir.path())), "links.txt");

        registry.save(&sample_links()).await.unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("links.txt")).unwrap();
        assert_eq!(on_disk.lines().count(), 3);
        assert!(on_disk.ends_with('\n'));
        assert_eq!(registry.load().await.unwrap(), sample_links());
    }

    #[tokio::test]
    async fn test_load_skips_blank_lines() {
        let store = Arc::new(MemoryStore::new());
        store
            .put("links.txt", b"https://a/1\r\n\n  https://a/2  \n")
            .await
            .unwrap();

        let registry = LinkRegistry::new(store, "links.txt");
        assert_eq!(
            registry.load().await.unwrap(),
            vec!["https://a/1".to_string(), "https://a/2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_registry_loads_empty() {
        let registry = LinkRegistry::new(Arc::new(MemoryStore::new()), "links.txt");
        assert!(registry.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_reported() {
        let store = Arc::new(MemoryStore::new());
        store.put("links.txt", &[0xff, 0xfe, b'\n']).await.unwrap();

        let registry = LinkRegistry::new(store, "links.txt");
        let err = registry.load().await.unwrap_err();
        assert!(matches!(err, HarvestError::CorruptRegistry { .. }));
    }
}
