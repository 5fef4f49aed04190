// src/error.rs
// =============================================================================
// Error types for the harvesting pipeline.
//
// Three families, matching how the pipeline reacts to them:
// - HarvestError: fatal. Transport failures, corrupt persisted state. These
//   propagate to the caller and stop the run.
// - ExtractError (src/extract/mod.rs): per-document. The pipeline logs the
//   document, counts it and moves on.
// - StoreError (src/store/mod.rs): raised by storage backends, wrapped into
//   HarvestError when it reaches the pipeline.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, HarvestError>;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// The server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },

    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the JSON we expected
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("link has no listing token: {0}")]
    InvalidLink(String),

    #[error("cached document for {token} is not valid JSON: {source}")]
    CorruptCache {
        token: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cached document for {token} is not valid UTF-8: {source}")]
    CorruptCacheEncoding {
        token: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("link registry '{key}' is not valid UTF-8")]
    CorruptRegistry { key: String },

    /// Only raised in strict mode; otherwise layout problems are reported
    #[error("document {token} has an unrecognized facts layout ({widgets} widgets)")]
    UnrecognizedLayout { token: String, widgets: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HarvestError {
    /// True for failures that came from talking to the remote API.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HarvestError::Status { .. } | HarvestError::Request { .. } | HarvestError::Decode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let status = HarvestError::Status {
            url: "https://example.com".to_string(),
            status: StatusCode::TOO_MANY_REQUESTS,
        };
        assert!(status.is_transport());
        assert_eq!(status.to_string(), "HTTP 429 Too Many Requests from https://example.com");

        let link = HarvestError::InvalidLink("https://example.com/".to_string());
        assert!(!link.is_transport());
    }
}
