// src/http.rs
// Builds the single reqwest client shared by the crawler and the cache.
// Connection pooling is the only reason to share it; requests are still
// issued one at a time.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

use crate::config::HarvestConfig;

pub fn build_client(config: &HarvestConfig) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    match HeaderValue::from_str(&config.user_agent) {
        Ok(agent) => {
            headers.insert(USER_AGENT, agent);
        }
        Err(_) => warn!(agent = %config.user_agent, "ignoring unusable user agent"),
    }

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
}
