//! Crawl frontier for a single domain crawl
//!
//! This module handles:
//! - FIFO (breadth-first) ordering of discovered pages
//! - Handing each URL out at most once per crawl run
//! - The politeness pause between visited-marked URLs

use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// Pending URLs of the current domain crawl
///
/// Not persisted: a crash loses the queue and the next run starts again
/// from the homepage, skipping what the visited set already holds.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,

    /// Every URL ever queued in this run, popped or not
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed URL
    pub fn seeded(seed: Url) -> Self {
        let mut frontier = Self::new();
        frontier.push(seed);
        frontier
    }

    /// Queues `url` unless it was already queued during this run
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: Url) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Queues every URL, returning how many were new
    pub fn extend<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = Url>,
    {
        urls.into_iter().filter(|url| self.push(url.clone())).count()
    }

    pub fn pop(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Sleeps for the politeness delay, if any
pub async fn politeness_pause(delay: Duration) {
    if !delay.is_zero() {
        tracing::trace!("Politeness delay {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
