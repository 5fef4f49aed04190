// src/crawl/mod.rs
// =============================================================================
// This module discovers listings by paging through the search endpoint.
//
// Submodules:
// - cursor: the immutable pagination state threaded between requests
// - link: listing links and the token embedded in them
// - search: the crawler loop, request payload and response decoding
//
// The crawl only produces links. Fetching the listings themselves is the
// detail cache's job (src/cache.rs).
// =============================================================================

mod cursor;
mod link;
mod search;

pub use cursor::{PaginationBlock, PaginationData, SearchCursor};
pub use link::{token_from_url, ListingLink};
pub use search::{derive_links, CrawlOutcome, SearchCrawler, SearchFilter};
