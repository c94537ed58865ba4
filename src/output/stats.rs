//! Crawl statistics
//!
//! Counters accumulated by each domain crawl and summed over a run.

use crate::state::CrawlStatus;
use chrono::{DateTime, Utc};
use std::ops::AddAssign;

/// Counters for one domain crawl, or a whole run once summed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Page fetch attempts that returned HTML
    pub pages_fetched: u64,

    /// Pages that passed the relevance filter and were recorded
    pub pages_kept: u64,

    /// Pages fetched but rejected by the relevance filter
    pub pages_filtered: u64,

    /// Page fetches abandoned after an error
    pub fetch_failures: u64,

    pub assets_downloaded: u64,

    /// Asset links skipped (image, irrelevant, already downloaded)
    pub assets_skipped: u64,

    pub asset_failures: u64,

    /// Visited-set, snapshot or asset writes that failed
    pub persistence_failures: u64,
}

impl AddAssign<&CrawlStatistics> for CrawlStatistics {
    fn add_assign(&mut self, other: &CrawlStatistics) {
        self.pages_fetched += other.pages_fetched;
        self.pages_kept += other.pages_kept;
        self.pages_filtered += other.pages_filtered;
        self.fetch_failures += other.fetch_failures;
        self.assets_downloaded += other.assets_downloaded;
        self.assets_skipped += other.assets_skipped;
        self.asset_failures += other.asset_failures;
        self.persistence_failures += other.persistence_failures;
    }
}

/// Summary of a full pipeline run over all event records
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Event records whose crawl ran to a normal end
    pub events_crawled: u64,

    /// Event records whose crawl could not start
    pub events_failed: u64,

    pub bound_reached: u64,
    pub exhausted: u64,

    pub totals: CrawlStatistics,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            events_crawled: 0,
            events_failed: 0,
            bound_reached: 0,
            exhausted: 0,
            totals: CrawlStatistics::default(),
        }
    }

    /// Folds one finished domain crawl into the summary
    pub fn record_crawl(&mut self, status: CrawlStatus, stats: &CrawlStatistics) {
        self.events_crawled += 1;
        match status {
            CrawlStatus::BoundReached => self.bound_reached += 1,
            CrawlStatus::Exhausted => self.exhausted += 1,
            CrawlStatus::Running => {}
        }
        self.totals += stats;
    }

    pub fn record_startup_failure(&mut self) {
        self.events_failed += 1;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints the run summary to stdout in a formatted manner
pub fn print_statistics(summary: &RunSummary) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    if let Some(finished) = summary.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = summary.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Events:");
    println!("  Crawled: {}", summary.events_crawled);
    println!("    page bound reached: {}", summary.bound_reached);
    println!("    frontier exhausted: {}", summary.exhausted);
    println!("  Failed to start: {}", summary.events_failed);
    println!();

    let t = &summary.totals;
    println!("Pages:");
    println!("  Fetched: {}", t.pages_fetched);
    println!("  Kept: {}", t.pages_kept);
    println!("  Filtered out: {}", t.pages_filtered);
    println!("  Fetch failures: {}", t.fetch_failures);
    println!();

    println!("Assets:");
    println!("  Downloaded: {}", t.assets_downloaded);
    println!("  Skipped: {}", t.assets_skipped);
    println!("  Failed: {}", t.asset_failures);
    println!();

    if t.persistence_failures > 0 {
        println!("Persistence failures: {}", t.persistence_failures);
        println!();
    }

    let keep_rate = if t.pages_fetched > 0 {
        (t.pages_kept as f64 / t.pages_fetched as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Keep Rate: {:.1}% ({} / {} fetched pages kept)",
        keep_rate, t.pages_kept, t.pages_fetched
    );
}
