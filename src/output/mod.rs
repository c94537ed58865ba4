//! Output module for the corpus artifacts
//!
//! This module handles:
//! - Event and page records passed to the downstream analysis stage
//! - Assembling crawl results into the aggregate file
//! - The append-only error log
//! - Crawl statistics

mod assembler;
mod error_log;
mod records;
pub mod stats;

pub use assembler::{attach_pages, load_events, write_aggregate};
pub use error_log::ErrorLog;
pub use records::{truncate_chars, EventRecord, PageRecord};
pub use stats::{print_statistics, CrawlStatistics, RunSummary};
