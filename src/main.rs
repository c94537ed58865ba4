//! Corpus crawler main entry point
//!
//! This is the command-line interface for the event corpus crawler.

use anyhow::Context;
use clap::Parser;
use corpus_crawler::browser::BrowserSession;
use corpus_crawler::config::{load_config_with_hash, Config, Renderer};
use corpus_crawler::crawler::{run_pipeline, AssetFetcher, HttpFetcher, PageFetcher};
use corpus_crawler::output::{load_events, print_statistics, RunSummary};
use corpus_crawler::url::parse_homepage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Corpus crawler: builds page corpora for event homepages
///
/// For every event record, crawls the pages of the event's own domain that
/// look relevant, snapshots them, downloads linked documents and writes the
/// records back with the pages attached.
#[derive(Parser, Debug)]
#[command(name = "corpus-crawler")]
#[command(version)]
#[command(about = "A bounded, resumable single-domain event crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore persisted visited sets and crawl every domain from scratch
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(&config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("corpus_crawler=info,warn"),
            1 => EnvFilter::new("corpus_crawler=debug,info"),
            2 => EnvFilter::new("corpus_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Corpus Crawler Dry Run ===\n");

    let crawler = &config.crawler;
    println!("Crawler Configuration:");
    println!("  Max kept pages per domain: {}", crawler.max_pages);
    println!("  Max content length: {} chars", crawler.max_content_length);
    println!("  Fetch timeout: {}s", crawler.fetch_timeout);
    println!("  Render settle delay: {}ms", crawler.render_settle_delay);
    println!("  Politeness delay: {}ms", crawler.politeness_delay);
    println!(
        "  Mark visited on filter reject: {}",
        crawler.mark_visited_on_filter_reject
    );
    println!("  Max fetch retries: {}", crawler.max_fetch_retries);
    println!("  Renderer: {:?}", crawler.renderer);

    println!("\nRelevance:");
    println!("  Keywords: {}", config.relevance.keywords.join(", "));
    println!("  Assets: {}", config.relevance.asset_extensions.join(", "));
    println!("  Images (never downloaded): {}", config.relevance.image_extensions.join(", "));

    println!("\nOutput:");
    println!("  Input: {}", config.output.input_path);
    println!("  Corpus directory: {}", config.output.directory);
    println!("  Aggregate: {}", config.output.aggregate_path);
    println!("  Error log: {}", config.output.error_log);

    let events = load_events(Path::new(&config.output.input_path))?;
    println!("\nEvent Records ({}):", events.len());
    let mut crawlable = 0;
    for event in &events {
        match event.homepage().map(parse_homepage) {
            Some(Ok((url, domain))) => {
                crawlable += 1;
                println!("  - {} ({})", url, domain);
            }
            Some(Err(e)) => println!("  - {} (skipped: {})", event.homepage().unwrap_or(""), e),
            None => println!("  - <no link> (skipped)"),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} of {} event records", crawlable, events.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring persisted visited sets)");
    } else {
        tracing::info!("Starting crawl (resuming persisted visited sets)");
    }

    let http = HttpFetcher::new(&config.crawler).context("Failed to build HTTP client")?;

    let summary = match config.crawler.renderer {
        Renderer::Http => run_interruptible(config, &http, &http, fresh).await?,
        Renderer::Browser => {
            let session = BrowserSession::launch(&config.browser, &config.crawler).await?;
            let result = run_interruptible(config, &session, &http, fresh).await;
            session.close().await;
            result?
        }
    };

    if let Some(summary) = summary {
        println!();
        print_statistics(&summary);
    }
    Ok(())
}

/// Runs the pipeline until it finishes or Ctrl-C is pressed
///
/// Returns `None` when interrupted; the aggregate file is then left as it
/// was before the run.
async fn run_interruptible(
    config: &Config,
    pages: &dyn PageFetcher,
    assets: &dyn AssetFetcher,
    fresh: bool,
) -> anyhow::Result<Option<RunSummary>> {
    tokio::select! {
        result = run_pipeline(config, pages, assets, fresh) => {
            let summary = result.context("Crawl failed")?;
            tracing::info!("Crawl completed successfully");
            Ok(Some(summary))
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, stopping crawl");
            Ok(None)
        }
    }
}
