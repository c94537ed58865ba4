//! Link classification
//!
//! Every resolved anchor target falls into exactly one class: a same-domain
//! page to traverse, a document to hand to the downloader, or nothing.

use crate::config::RelevanceConfig;
use crate::state::DomainState;
use crate::url::{extract_domain, path_extension};
use std::collections::HashSet;
use url::Url;

/// Outcome of classifying one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    /// Same authority, not yet visited
    Page,
    /// Path ends in a document extension, any domain
    Asset,
    Discard,
}

/// Links of one page, split by class
#[derive(Debug, Clone, Default)]
pub struct ClassifiedLinks {
    pub pages: Vec<Url>,
    pub assets: Vec<Url>,
}

/// Extension lists used to classify links
#[derive(Debug, Clone)]
pub struct LinkRules {
    asset_extensions: HashSet<String>,
    image_extensions: HashSet<String>,
}

impl LinkRules {
    pub fn new<A, I, S>(asset_extensions: A, image_extensions: I) -> Self
    where
        A: IntoIterator<Item = S>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalize = |e: S| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
        Self {
            asset_extensions: asset_extensions.into_iter().map(normalize).collect(),
            image_extensions: image_extensions.into_iter().map(normalize).collect(),
        }
    }

    pub fn from_config(config: &RelevanceConfig) -> Self {
        Self::new(&config.asset_extensions, &config.image_extensions)
    }

    pub fn is_image(&self, url: &Url) -> bool {
        path_extension(url).is_some_and(|ext| self.image_extensions.contains(&ext))
    }

    /// True for document extensions; an image extension always wins
    pub fn is_asset(&self, url: &Url) -> bool {
        path_extension(url).is_some_and(|ext| {
            self.asset_extensions.contains(&ext) && !self.image_extensions.contains(&ext)
        })
    }

    /// Classifies one link found while crawling `state`'s domain
    pub fn classify(&self, url: &Url, state: &DomainState) -> LinkClass {
        if self.is_asset(url) {
            return LinkClass::Asset;
        }
        if self.is_image(url) {
            return LinkClass::Discard;
        }

        let same_domain = extract_domain(url).is_some_and(|d| d == state.domain());
        if same_domain && !state.is_visited(url.as_str()) {
            LinkClass::Page
        } else {
            LinkClass::Discard
        }
    }

    /// Partitions a page's links, keeping document order within each class
    pub fn classify_links(&self, links: Vec<Url>, state: &DomainState) -> ClassifiedLinks {
        let mut classified = ClassifiedLinks::default();
        for link in links {
            match self.classify(&link, state) {
                LinkClass::Page => classified.pages.push(link),
                LinkClass::Asset => classified.assets.push(link),
                LinkClass::Discard => {
                    tracing::trace!("Discarding link {}", link);
                }
            }
        }
        classified
    }
}
