// src/cache.rs
// =============================================================================
// This module is the detail cache: get-or-fetch for per-listing documents.
//
// How it works:
// 1. Take the token from the last path segment of the listing link
// 2. Look for "{token}.json" in the store
// 3. Hit: return the stored text as-is (no network call, no delay)
// 4. Miss: GET the link, store the document, sleep a politeness delay
//
// Guarantees:
// - A token is fetched over the network at most once for the lifetime of the
//   store; after that, `fetch` is a pure read
// - Writes are atomic (see src/store/fs.rs), so an interrupted batch can be
//   restarted and will skip every token already fetched
//
// Rust concepts:
// - Arc<dyn Trait>: the store can be on disk or in memory
// - map_err + ?: turning library errors into our own HarvestError
// =============================================================================

use reqwest::Client;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::crawl::token_from_url;
use crate::error::{HarvestError, Result};
use crate::politeness::Politeness;
use crate::store::KeyValueStore;

// A listing's detail document, as persisted in the cache
#[derive(Debug, Clone, PartialEq)]
pub struct DetailDocument {
    /// Listing token, also the cache key without ".json"
    pub token: String,
    /// Exact text of the cache entry
    pub raw: String,
    /// `raw` parsed as JSON
    pub value: Value,
}

pub struct DetailCache {
    client: Client,
    store: Arc<dyn KeyValueStore>,
    politeness: Politeness,   // Only applied after a network fetch
}

impl DetailCache {
    pub fn new(client: Client, store: Arc<dyn KeyValueStore>, politeness: Politeness) -> Self {
        Self {
            client,
            store,
            politeness,
        }
    }

    // Returns the cached document for a link, fetching it on a miss
    //
    // Parameters:
    //   link: detail URL, e.g. "https://api.divar.ir/v8/posts-v2/web/abc123"
    //
    // Returns: DetailDocument for token "abc123"
    //
    // Errors:
    //   - InvalidLink if the URL has no path segment to use as a token
    //   - Status / Request / Decode if the network fetch fails (nothing is stored)
    //   - CorruptCache / CorruptCacheEncoding if a stored entry is damaged
    pub async fn fetch(&self, link: &str) -> Result<DetailDocument> {
        let token =
            token_from_url(link).ok_or_else(|| HarvestError::InvalidLink(link.to_string()))?;
        let key = cache_key(&token);

        if let Some(bytes) = self.store.get(&key).await? {
            debug!(%token, "cache hit");
            return decode_cached(token, bytes);
        }

        info!(%token, "fetching listing");
        let value = self.download(link).await?;
        let raw = to_cache_text(&value).map_err(|source| HarvestError::Decode {
            url: link.to_string(),
            source,
        })?;

        // Store first, then sleep: a crash during the delay loses nothing
        self.store.put(&key, raw.as_bytes()).await?;
        self.politeness.pause().await;

        Ok(DetailDocument { token, raw, value })
    }

    // GETs a detail document and parses it as JSON
    //
    // Any non-2xx status is an error; we never retry.
    async fn download(&self, link: &str) -> Result<Value> {
        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|source| HarvestError::Request {
                url: link.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(HarvestError::Status {
                url: link.to_string(),
                status: response.status(),
            });
        }

        let body = response.text().await.map_err(|source| HarvestError::Request {
            url: link.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| HarvestError::Decode {
            url: link.to_string(),
            source,
        })
    }
}

// "abc123" -> "abc123.json"
fn cache_key(token: &str) -> String {
    format!("{}.json", token)
}

// Turns stored bytes back into a document
//
// Damaged entries are reported, never patched up: the operator deletes the
// file and the next run refetches it.
fn decode_cached(token: String, bytes: Vec<u8>) -> Result<DetailDocument> {
    let raw = String::from_utf8(bytes).map_err(|source| HarvestError::CorruptCacheEncoding {
        token: token.clone(),
        source,
    })?;
    let value = serde_json::from_str(&raw).map_err(|source| HarvestError::CorruptCache {
        token: token.clone(),
        source,
    })?;
    Ok(DetailDocument { token, raw, value })
}

// Serializes a document the way it is stored on disk
//
// One-space indentation, non-ASCII kept as-is, so cache files stay readable:
//   {
//    "seo": {
//     "title": "آپارتمان"
//    }
//   }
fn to_cache_text(value: &Value) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b" "));
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| {
        serde_json::Error::io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is "get-or-fetch"?
//    - Look in the cache first; only go to the network if it isn't there
//    - After the first run, re-running the harvest costs no requests at all
//
// 2. Why store a String (`raw`) as well as the parsed Value?
//    - `raw` is exactly what is on disk, byte for byte
//    - A miss and every later hit return the same `raw`, which makes the
//      cache easy to test and easy to diff
//
// 3. Why not String::from_utf8_lossy on a bad cache file?
//    - Lossy decoding replaces bad bytes with U+FFFD and carries on
//    - That would quietly put garbage into records; an error is better
//
// 4. What does PrettyFormatter::with_indent(b" ") do?
//    - serde_json's pretty printer normally indents with two spaces
//    - with_indent lets us choose; one space keeps big documents compact
// -----------------------------------------------------------------------------
