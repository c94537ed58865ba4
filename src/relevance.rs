//! Keyword relevance filter
//!
//! A pure predicate deciding whether a page is kept or an asset downloaded:
//! a candidate is relevant when any of its strings, case-folded, contains
//! one of the configured keywords.

use crate::config::RelevanceConfig;

/// Case-insensitive keyword containment test
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl RelevanceFilter {
    /// Builds a filter from raw keywords, lower-casing them once
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &RelevanceConfig) -> Self {
        Self::new(&config.keywords)
    }

    /// Returns true iff any candidate contains any keyword
    ///
    /// Empty candidates never match.
    ///
    /// # Examples
    ///
    /// ```
    /// use corpus_crawler::RelevanceFilter;
    ///
    /// let filter = RelevanceFilter::new(["congress", "2025"]);
    /// assert!(filter.is_relevant(&["https://example.org/team", "Congress 2025"]));
    /// assert!(!filter.is_relevant(&["https://example.org/team", "Our team"]));
    /// ```
    pub fn is_relevant(&self, candidates: &[&str]) -> bool {
        candidates
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.to_lowercase())
            .any(|c| self.keywords.iter().any(|k| c.contains(k.as_str())))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}
