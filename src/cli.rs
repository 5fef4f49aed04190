// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Every option can also come from a HARVEST_* environment variable, which is
// handy for cron jobs. Options shared by both subcommands live in
// `CommonArgs` and are flattened into each of them.
//
// Usage:
//   listing-harvester harvest --out data.csv
//   listing-harvester harvest --refresh --strict
//   listing-harvester crawl --target 200 --city 1,2
//   HARVEST_MIN_DELAY_MS=0 HARVEST_MAX_DELAY_MS=0 listing-harvester harvest
//
// Rust concepts:
// - #[command(flatten)]: reuse one Args struct inside several subcommands
// - `///` on a field becomes that flag's --help text
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use listing_harvester::config::{self, HarvestConfig};
use listing_harvester::{Politeness, SearchFilter};

// The whole CLI: one required subcommand
#[derive(Parser, Debug)]
#[command(
    name = "listing-harvester",
    version,
    about = "Harvest real-estate listings into a de-duplicated, resumable snapshot",
    long_about = "listing-harvester pages through the listing search API, caches every \
                  listing's detail document on disk and extracts flat records. \
                  Interrupted runs resume where they stopped: saved links are reused \
                  and cached documents are never fetched twice."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

// The two subcommands
//
// `harvest` does everything; `crawl` stops after the link registry is saved,
// which is useful to inspect links.txt before committing to a long fetch.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl (or resume), fetch every listing and export the records
    ///
    /// Example: listing-harvester harvest --out data.csv
    Harvest {
        #[command(flatten)]
        common: CommonArgs,

        /// CSV file to write the records to
        #[arg(long, env = "HARVEST_OUT", default_value = "data.csv")]
        out: PathBuf,

        /// Print the records as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Crawl again even if a link registry already exists
        #[arg(long)]
        refresh: bool,

        /// Fail on a facts layout that matches no known variant
        #[arg(long)]
        strict: bool,
    },

    /// Only discover listing links and save them to the registry
    ///
    /// Example: listing-harvester crawl --target 200
    Crawl {
        #[command(flatten)]
        common: CommonArgs,

        /// Crawl again even if a link registry already exists
        #[arg(long)]
        refresh: bool,
    },
}

// Options both subcommands accept
//
// Defaults mirror HarvestConfig::default(), see src/config.rs.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding the link registry (links.txt)
    #[arg(long, env = "HARVEST_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory holding one cached JSON document per listing
    #[arg(long, env = "HARVEST_CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Stop crawling once more than this many listings were seen
    #[arg(long, env = "HARVEST_TARGET", default_value_t = config::TARGET_COUNT)]
    pub target: usize,

    /// City id to search in (repeatable)
    #[arg(long = "city", env = "HARVEST_CITY", default_value = "1", value_delimiter = ',')]
    pub cities: Vec<String>,

    #[arg(long, env = "HARVEST_CATEGORY", default_value = "residential-sell")]
    pub category: String,

    #[arg(long, env = "HARVEST_SORT", default_value = "sort_date")]
    pub sort: String,

    #[arg(long, env = "HARVEST_SEARCH_URL", default_value = config::SEARCH_URL)]
    pub search_url: String,

    #[arg(long, env = "HARVEST_DETAIL_URL", default_value = config::DETAIL_URL)]
    pub detail_url: String,

    /// Shortest pause after a network request, in milliseconds
    #[arg(long, env = "HARVEST_MIN_DELAY_MS", default_value_t = 1000)]
    pub min_delay_ms: u64,

    /// Longest pause after a network request, in milliseconds
    #[arg(long, env = "HARVEST_MAX_DELAY_MS", default_value_t = 3000)]
    pub max_delay_ms: u64,

    /// Request timeout in seconds
    #[arg(long, env = "HARVEST_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    #[arg(long, env = "HARVEST_USER_AGENT", default_value = config::USER_AGENT)]
    pub user_agent: String,
}

impl CommonArgs {
    // Turns parsed flags into the library's configuration
    //
    // Returns: HarvestConfig with every flag applied; fields without a flag
    //          (page increment, start cursor) keep their defaults
    //
    // Example:
    //   --min-delay-ms 0 --max-delay-ms 0  ->  politeness disabled
    pub fn to_config(&self) -> HarvestConfig {
        HarvestConfig {
            search_url: self.search_url.clone(),
            detail_url: self.detail_url.clone(),
            filter: SearchFilter {
                city_ids: self.cities.clone(),
                category: self.category.clone(),
                sort: self.sort.clone(),
            },
            data_dir: self.data_dir.clone(),
            cache_dir: self.cache_dir.clone(),
            target_count: self.target,
            politeness: Politeness::new(
                Duration::from_millis(self.min_delay_ms),
                Duration::from_millis(self.max_delay_ms),
            ),
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout,
            ..HarvestConfig::default()
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `env = "HARVEST_TARGET"` do?
//    - If --target is not given, clap reads the HARVEST_TARGET variable
//    - If neither is set, default_value_t applies
//    - Needs clap's "env" feature (see Cargo.toml)
//
// 2. default_value vs default_value_t?
//    - default_value takes a string that clap parses like user input
//    - default_value_t takes an already-typed value, e.g. a usize constant
//
// 3. What is value_delimiter = ','?
//    - Lets `--city 1,2` mean the same as `--city 1 --city 2`
//
// 4. Why does main.rs declare `mod cli` instead of lib.rs?
//    - The CLI is only for the binary; library users build HarvestConfig directly
// -----------------------------------------------------------------------------
