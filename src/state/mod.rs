//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: per-URL progress through one traversal iteration
//! - `CrawlStatus`: whether a domain crawl is running or how it ended
//! - `DomainState`: the visited set owned by the active domain crawl

mod domain_state;
mod page_state;

// Re-export main types
pub use domain_state::DomainState;
pub use page_state::{CrawlStatus, PageState};
