use crate::url::extract_domain;
use std::collections::BTreeSet;
use url::Url;

/// Visited set of the domain currently being crawled
///
/// Owned exclusively by one domain crawl. Only URLs whose authority equals
/// `domain` can enter the set, and the set only grows.
#[derive(Debug, Clone)]
pub struct DomainState {
    domain: String,
    visited: BTreeSet<String>,
}

impl DomainState {
    /// Creates an empty state for `domain`
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            visited: BTreeSet::new(),
        }
    }

    /// Builds the state from a persisted visited set
    ///
    /// Entries are normalized the way links are resolved (parsed, fragment
    /// removed), so sets written with raw link strings still match. Entries
    /// that are not valid URLs of this domain are dropped with a warning.
    pub fn with_visited<I>(domain: impl Into<String>, visited: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut state = Self::new(domain);
        for url in visited {
            match normalize_entry(&url) {
                Some(normalized) if state.belongs(&normalized) => {
                    state.visited.insert(normalized);
                }
                _ => {
                    tracing::warn!(
                        "Dropping visited entry {} outside domain {}",
                        url,
                        state.domain
                    );
                }
            }
        }
        state
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns true if `url` has the crawl's authority
    pub fn belongs(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| extract_domain(&u))
            .is_some_and(|d| d == self.domain)
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Marks `url` visited; test-and-mark in one step
    ///
    /// Returns true if the URL was newly added, false if it was already
    /// visited or belongs to another domain.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if !self.belongs(url) {
            tracing::warn!("Refusing to mark {} visited for {}", url, self.domain);
            return false;
        }
        self.visited.insert(url.to_string())
    }

    pub fn visited(&self) -> &BTreeSet<String> {
        &self.visited
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

fn normalize_entry(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}
