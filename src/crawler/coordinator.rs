//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop for one event homepage and the pass
//! over all event records:
//! - Loading the domain's visited set and preparing its directories
//! - Driving each frontier URL through the page state machine
//! - Snapshotting kept pages and dispatching links
//! - Persisting the visited set after every processed URL

use crate::config::{Config, CrawlerConfig};
use crate::crawler::downloader::{DownloadOutcome, Downloader};
use crate::crawler::fetcher::{AssetFetcher, PageFetcher, RetryPolicy};
use crate::crawler::frontier::{politeness_pause, Frontier};
use crate::crawler::links::LinkRules;
use crate::crawler::parser::extract_page;
use crate::output::{attach_pages, CrawlStatistics, ErrorLog, EventRecord, PageRecord, RunSummary};
use crate::relevance::RelevanceFilter;
use crate::state::{CrawlStatus, DomainState, PageState};
use crate::storage::{write_atomic, DomainLayout, DomainStateStore};
use crate::url::{parse_homepage, snapshot_file_name};
use crate::{CorpusError, StartupError};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Result of one finished domain crawl
#[derive(Debug, Clone)]
pub struct DomainCrawl {
    pub domain: String,

    /// Kept pages, in the order they were fetched
    pub pages: Vec<PageRecord>,

    pub status: CrawlStatus,
    pub stats: CrawlStatistics,
}

/// Mutable state owned by a single domain crawl
struct DomainRun {
    state: DomainState,
    layout: DomainLayout,
    frontier: Frontier,
    pages: Vec<PageRecord>,
    stats: CrawlStatistics,

    /// Asset URLs already handed to the downloader in this crawl
    downloaded: HashSet<String>,
}

/// Main crawler coordinator structure
///
/// Crawls are strictly sequential: one event record's crawl runs to
/// completion before the next begins, and within a crawl one URL is
/// processed at a time.
pub struct Coordinator<'a> {
    config: CrawlerConfig,
    relevance: RelevanceFilter,
    rules: LinkRules,
    store: DomainStateStore,
    error_log: ErrorLog,
    retry: RetryPolicy,
    pages: &'a dyn PageFetcher,
    assets: &'a dyn AssetFetcher,
    fresh: bool,
}

impl<'a> Coordinator<'a> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `pages` - Fetcher returning final page HTML (browser or plain HTTP)
    /// * `assets` - Fetcher returning raw document bytes
    pub fn new(config: &Config, pages: &'a dyn PageFetcher, assets: &'a dyn AssetFetcher) -> Self {
        Self {
            config: config.crawler.clone(),
            relevance: RelevanceFilter::from_config(&config.relevance),
            rules: LinkRules::from_config(&config.relevance),
            store: DomainStateStore::new(&config.output.directory),
            error_log: ErrorLog::new(&config.output.error_log),
            retry: RetryPolicy::from_config(&config.crawler),
            pages,
            assets,
            fresh: false,
        }
    }

    /// Ignore persisted visited sets; they are still written back
    pub fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Crawls every event record and attaches its kept pages
    ///
    /// A startup failure for one record is logged and leaves that record
    /// with an empty page list; the remaining records are still crawled.
    pub async fn run(&self, events: &mut [EventRecord]) -> RunSummary {
        let mut summary = RunSummary::start();
        let total = events.len();

        for (index, event) in events.iter_mut().enumerate() {
            let homepage = event.homepage().map(str::to_string);
            tracing::info!(
                "Event {}/{}: {}",
                index + 1,
                total,
                homepage.as_deref().unwrap_or("<no link>")
            );

            let result = match homepage.as_deref() {
                Some(link) => self.crawl(link).await,
                None => Err(StartupError::MissingHomepage),
            };

            match result {
                Ok(crawl) => {
                    summary.record_crawl(crawl.status, &crawl.stats);
                    attach_pages(event, crawl.pages);
                }
                Err(e) => {
                    self.error_log.record(format_args!(
                        "Crawl not started for {}: {}",
                        homepage.as_deref().unwrap_or("<no link>"),
                        e
                    ));
                    summary.record_startup_failure();
                    attach_pages(event, Vec::new());
                }
            }
        }

        summary.finish();
        summary
    }

    /// Crawls the domain of one homepage until the frontier is exhausted or
    /// the kept-page bound is reached
    ///
    /// # Returns
    ///
    /// * `Ok(DomainCrawl)` - Normal termination, either way
    /// * `Err(StartupError)` - Invalid homepage, unreadable visited set, or
    ///   the domain directories could not be created
    pub async fn crawl(&self, homepage: &str) -> Result<DomainCrawl, StartupError> {
        let (seed, domain) =
            parse_homepage(homepage).map_err(|source| StartupError::InvalidHomepage {
                url: homepage.to_string(),
                source,
            })?;

        let state = if self.fresh {
            DomainState::new(&domain)
        } else {
            self.store.load(&domain)?
        };
        let layout = self.store.layout(&domain);
        layout.prepare()?;

        let downloader = Downloader::new(
            self.assets,
            &self.rules,
            &self.relevance,
            self.retry,
            &self.error_log,
        );

        let mut run = DomainRun {
            state,
            layout,
            frontier: Frontier::seeded(seed),
            pages: Vec::new(),
            stats: CrawlStatistics::default(),
            downloaded: HashSet::new(),
        };

        tracing::info!(
            "Crawling {} ({} URLs already visited, bound {})",
            domain,
            run.state.len(),
            self.config.max_pages
        );

        let mut status = CrawlStatus::Running;
        while !status.is_finished() {
            if run.pages.len() >= self.config.max_pages {
                status = CrawlStatus::BoundReached;
                continue;
            }
            let Some(url) = run.frontier.pop() else {
                status = CrawlStatus::Exhausted;
                continue;
            };
            if run.state.is_visited(url.as_str()) {
                tracing::debug!("Already visited: {}", url);
                continue;
            }

            tracing::debug!("Processing URL: {}", url);
            if let Err(e) = self.process_url(&mut run, &downloader, url).await {
                tracing::error!("Crawl loop error: {}", e);
            }
        }

        tracing::info!(
            "Finished {}: {} ({} pages kept, {} fetched, {} queued)",
            domain,
            status,
            run.pages.len(),
            run.stats.pages_fetched,
            run.frontier.len()
        );

        Ok(DomainCrawl {
            domain,
            pages: run.pages,
            status,
            stats: run.stats,
        })
    }

    /// Drives one URL from `Seeded` to `Done`
    async fn process_url(
        &self,
        run: &mut DomainRun,
        downloader: &Downloader<'_>,
        url: Url,
    ) -> Result<(), CorpusError> {
        let state = PageState::Seeded.advance(PageState::Fetching)?;

        let html = match self
            .retry
            .run(|| self.pages.fetch_page(url.as_str()))
            .await
        {
            Ok(html) => html,
            Err(e) => {
                let state = state.advance(PageState::FetchFailed)?;
                run.stats.fetch_failures += 1;
                self.error_log
                    .record(format_args!("Page fetch failed for {}: {}", url, e));
                self.mark_visited(run, &url);
                politeness_pause(self.config.politeness_delay()).await;
                state.advance(PageState::Done)?;
                return Ok(());
            }
        };
        run.stats.pages_fetched += 1;

        let page = extract_page(&html, &url);

        if !self.relevance.is_relevant(&[url.as_str(), &page.title]) {
            let state = state.advance(PageState::FilteredOut)?;
            run.stats.pages_filtered += 1;
            tracing::debug!("Filtered out: {} ({:?})", url, page.title);

            // Traversal does not depend on relevance; downloads do
            let links = self.rules.classify_links(page.links, &run.state);
            run.frontier.extend(links.pages);

            if self.config.mark_visited_on_filter_reject {
                self.mark_visited(run, &url);
                politeness_pause(self.config.politeness_delay()).await;
            }
            state.advance(PageState::Done)?;
            return Ok(());
        }

        let state = state.advance(PageState::Extracting)?;
        let snapshot = run.layout.pages_dir().join(snapshot_file_name(&url));
        if let Err(e) = write_atomic(&snapshot, page.html.as_bytes()) {
            run.stats.persistence_failures += 1;
            self.error_log
                .record(format_args!("Snapshot write failed for {}: {}", url, e));
        }
        run.pages.push(PageRecord::new(
            url.as_str(),
            page.title.as_str(),
            &page.text,
            self.config.max_content_length,
        ));
        run.stats.pages_kept += 1;
        tracing::info!("Kept page {} [{}]", url, page.title);

        let state = state.advance(PageState::Linked)?;
        let links = self.rules.classify_links(page.links, &run.state);
        let queued = run.frontier.extend(links.pages);
        tracing::debug!("{} new URLs queued from {}", queued, url);

        let assets_dir = run.layout.assets_dir();
        for asset in links.assets {
            self.download(run, downloader, &asset, &assets_dir).await;
        }

        self.mark_visited(run, &url);
        politeness_pause(self.config.politeness_delay()).await;
        state.advance(PageState::Done)?;
        Ok(())
    }

    async fn download(
        &self,
        run: &mut DomainRun,
        downloader: &Downloader<'_>,
        asset: &Url,
        assets_dir: &Path,
    ) {
        if !run.downloaded.insert(asset.as_str().to_string()) {
            run.stats.assets_skipped += 1;
            return;
        }
        match downloader.maybe_download(asset, assets_dir).await {
            DownloadOutcome::Downloaded(_) => run.stats.assets_downloaded += 1,
            DownloadOutcome::SkippedImage | DownloadOutcome::SkippedIrrelevant => {
                run.stats.assets_skipped += 1
            }
            DownloadOutcome::Failed => run.stats.asset_failures += 1,
        }
    }

    /// Marks `url` visited and rewrites the visited set
    ///
    /// A failed write is logged; the in-memory set stays authoritative for
    /// the rest of the crawl.
    fn mark_visited(&self, run: &mut DomainRun, url: &Url) {
        run.state.mark_visited(url.as_str());
        if let Err(e) = self.store.save(&run.state) {
            run.stats.persistence_failures += 1;
            self.error_log.record(format_args!(
                "Visited set write failed for {}: {}",
                run.state.domain(),
                e
            ));
        }
    }
}
