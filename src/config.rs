// src/config.rs
// =============================================================================
// Runtime configuration for a harvest.
//
// `HarvestConfig::default()` carries the production constants; the CLI
// (src/cli.rs) overrides them from flags or HARVEST_* environment variables.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::crawl::SearchFilter;
use crate::politeness::Politeness;

pub const SEARCH_URL: &str = "https://api.divar.ir/v8/postlist/w/search";
pub const DETAIL_URL: &str = "https://api.divar.ir/v8/posts-v2/web/";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 11.0; Win64; x64) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/134.0.6998.166 Safari/537.36";

/// Page number and widget count reported with the first pagination block
pub const START_PAGE: u32 = 1;
pub const START_COUNT: u32 = 26;
/// Widgets the API adds per search page
pub const PAGE_INCREMENT: u32 = 24;
pub const TARGET_COUNT: usize = 1000;

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub search_url: String,
    /// Prefix that a listing token is appended to
    pub detail_url: String,
    pub filter: SearchFilter,

    /// Holds the link registry
    pub data_dir: PathBuf,
    /// Holds one JSON document per listing token
    pub cache_dir: PathBuf,
    pub registry_key: String,

    pub start_page: u32,
    pub start_count: u32,
    pub page_increment: u32,
    pub target_count: usize,

    pub politeness: Politeness,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            search_url: SEARCH_URL.to_string(),
            detail_url: DETAIL_URL.to_string(),
            filter: SearchFilter::default(),
            data_dir: PathBuf::from("."),
            cache_dir: PathBuf::from("cache"),
            registry_key: crate::registry::DEFAULT_REGISTRY_KEY.to_string(),
            start_page: START_PAGE,
            start_count: START_COUNT,
            page_increment: PAGE_INCREMENT,
            target_count: TARGET_COUNT,
            politeness: Politeness::new(Duration::from_secs(1), Duration::from_secs(3)),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarvestConfig::default();
        assert_eq!(config.registry_key, "links.txt");
        assert_eq!(config.page_increment, 24);
        assert_eq!(config.target_count, 1000);
        assert!(config.detail_url.ends_with('/'));
        assert!(!config.politeness.is_disabled());
    }
}
