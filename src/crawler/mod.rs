//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Page and asset fetchers with an optional bounded retry
//! - HTML content extraction and link classification
//! - The per-domain frontier
//! - Asset downloads
//! - Overall crawl coordination

mod coordinator;
mod downloader;
mod fetcher;
mod frontier;
mod links;
mod parser;

pub use coordinator::{Coordinator, DomainCrawl};
pub use downloader::{DownloadOutcome, Downloader};
pub use fetcher::{build_http_client, AssetFetcher, HttpFetcher, PageFetcher, RetryPolicy};
pub use frontier::Frontier;
pub use links::{ClassifiedLinks, LinkClass, LinkRules};
pub use parser::{extract_page, ExtractedPage};

use crate::config::Config;
use crate::output::{load_events, write_aggregate, RunSummary};
use std::path::Path;

/// Runs the complete pipeline over the configured event records
///
/// This is the main entry point for a crawl. It will:
/// 1. Load the event records
/// 2. Crawl each record's domain in turn
/// 3. Attach the kept pages to each record
/// 4. Write the aggregate file, replacing any previous one
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `pages` - Fetcher used for pages (browser session or plain HTTP)
/// * `assets` - Fetcher used for documents
/// * `fresh` - Ignore persisted visited sets
///
/// # Returns
///
/// * `Ok(RunSummary)` - Every record was processed and the aggregate written
/// * `Err(CorpusError)` - The input could not be read or the aggregate could
///   not be written
pub async fn run_pipeline(
    config: &Config,
    pages: &dyn PageFetcher,
    assets: &dyn AssetFetcher,
    fresh: bool,
) -> crate::Result<RunSummary> {
    let mut events = load_events(Path::new(&config.output.input_path))?;
    tracing::info!(
        "Loaded {} event records from {}",
        events.len(),
        config.output.input_path
    );

    let coordinator = Coordinator::new(config, pages, assets).fresh(fresh);
    let summary = coordinator.run(&mut events).await;

    write_aggregate(Path::new(&config.output.aggregate_path), &events)?;
    Ok(summary)
}
