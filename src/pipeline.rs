// src/pipeline.rs
// =============================================================================
// This module ties the pieces together. Data only flows one way:
//
//   SearchCrawler -> LinkRegistry -> DetailCache -> RecordExtractor -> records
//
// How it works:
// 1. If the registry already holds links (and no refresh was asked for),
//    reuse them. Otherwise crawl the search endpoint and save the result.
// 2. For every link, get the detail document from the cache (fetching on a
//    miss).
// 3. Extract a record from each document. Documents we cannot use are
//    logged, counted and skipped; only transport and storage failures stop
//    the run.
//
// Rust concepts:
// - Arc<dyn Trait>: shared ownership of a storage backend chosen at runtime
// - Struct update syntax: `..HarvestReport::default()`
// - Exhaustive match on an error enum
// =============================================================================

use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::DetailCache;
use crate::config::HarvestConfig;
use crate::crawl::{CrawlOutcome, SearchCrawler, SearchCursor};
use crate::error::{HarvestError, Result};
use crate::extract::{ExtractError, ExtractedRecord, RecordExtractor};
use crate::registry::LinkRegistry;
use crate::store::{FsStore, KeyValueStore};

// Switches that change how a harvest behaves
#[derive(Debug, Clone, Copy, Default)]
pub struct HarvestOptions {
    /// Crawl again even if a link registry exists
    pub refresh: bool,
    /// Abort on a facts layout we do not recognize instead of skipping it
    pub strict: bool,
}

// Everything a harvest produced, plus what it had to skip and why
#[derive(Debug, Default)]
pub struct HarvestReport {
    /// Extracted records, in registry order
    pub records: Vec<ExtractedRecord>,
    /// Number of links processed
    pub links: usize,
    /// Present when this run crawled instead of resuming from the registry
    pub crawled: Option<CrawlOutcome>,
    /// Tokens of documents with no facts items
    pub no_facts: Vec<String>,
    /// (token, name of the missing field)
    pub missing_fields: Vec<(String, &'static str)>,
    /// (token, widget count)
    pub unrecognized_layouts: Vec<(String, usize)>,
}

impl HarvestReport {
    // Total number of documents that produced no record
    pub fn skipped(&self) -> usize {
        self.no_facts.len() + self.missing_fields.len() + self.unrecognized_layouts.len()
    }
}

pub struct Pipeline {
    crawler: SearchCrawler,
    registry: LinkRegistry,
    cache: DetailCache,
    extractor: RecordExtractor,
    start: SearchCursor,   // Cursor for the first search request
    target: usize,         // Stop crawling once more stubs than this were seen
}

impl Pipeline {
    // Builds a pipeline from its parts
    //
    // Parameters:
    //   config: endpoints, filter, crawl bounds and politeness delays
    //   client: shared HTTP client (connection pooling)
    //   registry_store: where the link registry is persisted
    //   cache_store: where detail documents are persisted
    //
    // Tests pass MemoryStores here; production uses `from_config`.
    pub fn new(
        config: &HarvestConfig,
        client: Client,
        registry_store: Arc<dyn KeyValueStore>,
        cache_store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            crawler: SearchCrawler::new(client.clone(), config),
            registry: LinkRegistry::new(registry_store, config.registry_key.clone()),
            cache: DetailCache::new(client, cache_store, config.politeness),
            extractor: RecordExtractor::new(),
            start: SearchCursor::start(config.start_page, config.start_count),
            target: config.target_count,
        }
    }

    // Production wiring: the registry lives in `data_dir`, documents in
    // `cache_dir`, both as plain files.
    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        let client = crate::http::build_client(config).map_err(HarvestError::Client)?;
        Ok(Self::new(
            config,
            client,
            Arc::new(FsStore::new(&config.data_dir)),
            Arc::new(FsStore::new(&config.cache_dir)),
        ))
    }

    // Returns the links to fetch, crawling only when needed
    //
    // Parameters:
    //   refresh: crawl even if the registry already holds links
    //
    // Returns: (links, Some(outcome)) after a crawl, (links, None) on resume
    //
    // A registry that exists but holds no links does not count as a resume
    // point: an earlier crawl that found nothing is retried.
    pub async fn discover(&self, refresh: bool) -> Result<(Vec<String>, Option<CrawlOutcome>)> {
        if !refresh {
            let saved = self.registry.load().await?;
            if !saved.is_empty() {
                info!(count = saved.len(), "resuming from saved link registry");
                return Ok((saved, None));
            }
        }

        let outcome = self.crawler.run(self.start.clone(), self.target).await?;
        let links: Vec<String> = outcome.links.iter().map(|l| l.url.clone()).collect();

        // Nothing worth resuming from, so leave any previous registry alone
        if links.is_empty() {
            warn!(pages = outcome.pages, skipped = outcome.skipped, "crawl found no links");
            return Ok((links, Some(outcome)));
        }

        self.registry.save(&links).await?;
        info!(
            count = links.len(),
            pages = outcome.pages,
            skipped = outcome.skipped,
            "saved link registry"
        );
        Ok((links, Some(outcome)))
    }

    // Runs a whole harvest: discover, fetch, extract
    //
    // Returns: a HarvestReport with every record and every skipped document
    //
    // Errors:
    //   - transport/storage failures abort immediately
    //   - an unrecognized layout aborts only when `options.strict` is set
    pub async fn run(&self, options: HarvestOptions) -> Result<HarvestReport> {
        let (links, crawled) = self.discover(options.refresh).await?;
        let mut report = HarvestReport {
            links: links.len(),
            crawled,
            ..HarvestReport::default()
        };

        for (index, link) in links.iter().enumerate() {
            // Cache hit = pure read, miss = one GET + politeness delay
            let document = self.cache.fetch(link).await?;
            let token = document.token;

            match self.extractor.extract(&document.value) {
                Ok(Some(record)) => report.records.push(record),
                Ok(None) => {
                    warn!(%token, "document has no facts items, skipping");
                    report.no_facts.push(token);
                }
                Err(ExtractError::MissingField(field)) => {
                    warn!(%token, field, "document is missing a field, skipping");
                    report.missing_fields.push((token, field));
                }
                Err(ExtractError::UnrecognizedLayout { widgets }) => {
                    if options.strict {
                        return Err(HarvestError::UnrecognizedLayout { token, widgets });
                    }
                    warn!(%token, widgets, "unrecognized facts layout, skipping");
                    report.unrecognized_layouts.push((token, widgets));
                }
            }

            if (index + 1) % 100 == 0 {
                info!(done = index + 1, total = links.len(), "processing listings");
            }
        }

        info!(
            records = report.records.len(),
            skipped = report.skipped(),
            "harvest finished"
        );
        Ok(report)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc<dyn KeyValueStore> instead of a generic parameter?
//    - `dyn` picks the implementation at runtime (FsStore or MemoryStore)
//    - Arc lets the test keep a handle to the same store and inspect it
//      after the pipeline wrote to it
//    - A generic `Pipeline<S: KeyValueStore>` would also work, but every type
//      that mentions Pipeline would then carry the parameter too
//
// 2. What is `..HarvestReport::default()`?
//    - Struct update syntax: fill the fields we name, take the rest from
//      another value (here, the Default one with empty Vecs)
//
// 3. Why `let token = document.token;` and then `document.value`?
//    - Moving one field out of a struct is allowed ("partial move")
//    - We can keep using the other fields, just not `document` as a whole
//
// 4. Why is the match exhaustive without a `_ =>` arm?
//    - ExtractError has exactly two variants and we handle both
//    - If someone adds a third, the compiler points us right here
// -----------------------------------------------------------------------------
