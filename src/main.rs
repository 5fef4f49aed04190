// src/main.rs
// =============================================================================
// Entry point of the listing-harvester CLI.
//
// What happens here:
// 1. Set up logging (RUST_LOG, default: info for this crate)
// 2. Parse command-line arguments using clap
// 3. Run the pipeline for the chosen subcommand
// 4. Export / print the results
// 5. Exit with code 0 on success, 2 on any error
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use listing_harvester::output;
use listing_harvester::{HarvestOptions, Pipeline};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listing_harvester=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            common,
            out,
            json,
            refresh,
            strict,
        } => {
            let config = common.to_config();
            let pipeline = Pipeline::from_config(&config)?;

            let report = pipeline
                .run(HarvestOptions { refresh, strict })
                .await
                .context("harvest failed")?;

            let file = File::create(&out)
                .with_context(|| format!("could not create {}", out.display()))?;
            output::write_csv(&report.records, file)?;

            output::print_results(&report, json, &config.detail_url)?;
            if !json {
                println!("💾 Wrote {} record(s) to {}", report.records.len(), out.display());
            }
            Ok(())
        }
        Commands::Crawl { common, refresh } => {
            let config = common.to_config();
            let pipeline = Pipeline::from_config(&config)?;

            let (links, crawled) = pipeline.discover(refresh).await.context("crawl failed")?;
            match crawled {
                Some(outcome) => println!(
                    "🔍 Crawled {} page(s): {} link(s), {} stub(s) without token, {} duplicate(s)",
                    outcome.pages,
                    outcome.links.len(),
                    outcome.skipped,
                    outcome.duplicates
                ),
                None => println!(
                    "📄 Link registry already holds {} link(s); use --refresh to crawl again",
                    links.len()
                ),
            }
            Ok(())
        }
    }
}
