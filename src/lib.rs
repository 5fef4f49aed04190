// src/lib.rs
// =============================================================================
// listing-harvester: crawl a paginated listing search API, cache every
// listing's detail document, and project the documents into flat records.
//
// Modules, leaf-first:
// - store: key-value persistence (filesystem or in-memory)
// - registry: the saved list of discovered links
// - cache: get-or-fetch for detail documents
// - crawl: the search cursor and crawler
// - extract: detail document -> ExtractedRecord
// - pipeline: runs everything in order
// - output: CSV / JSON / console exporters
// =============================================================================

pub mod cache;
pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod http;
pub mod output;
pub mod pipeline;
pub mod politeness;
pub mod registry;
pub mod store;

pub use cache::{DetailCache, DetailDocument};
pub use config::HarvestConfig;
pub use crawl::{CrawlOutcome, ListingLink, SearchCrawler, SearchCursor, SearchFilter};
pub use error::{HarvestError, Result};
pub use extract::{ExtractError, ExtractedRecord, RecordExtractor};
pub use pipeline::{HarvestOptions, HarvestReport, Pipeline};
pub use politeness::Politeness;
pub use registry::LinkRegistry;
pub use store::{FsStore, KeyValueStore, MemoryStore, StoreError};
