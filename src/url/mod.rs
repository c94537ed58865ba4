//! URL handling module for the corpus crawler
//!
//! This module provides authority extraction for domain scoping, anchor
//! resolution, and the filesystem names derived from URLs.

mod domain;
mod filename;

pub use domain::{extract_domain, parse_homepage};
pub use filename::{asset_file_name, snapshot_file_name};

use url::Url;

/// Resolves an anchor href against the page it was found on
///
/// Returns None if the link should be ignored:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is dropped so `page#a` and `page#b`
/// are the same frontier entry.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use corpus_crawler::url::resolve_link;
///
/// let base = Url::parse("https://example.org/congress/").unwrap();
/// let url = resolve_link("programme.pdf#p2", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.org/congress/programme.pdf");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute)
}

/// Returns the lower-cased extension of the URL's last path segment
pub fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}
