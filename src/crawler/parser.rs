//! HTML content extractor
//!
//! This module turns a rendered document into:
//! - The cleaned HTML that is snapshotted (image nodes removed)
//! - The page title
//! - The plain text kept in the page record
//! - Every anchor target, resolved to an absolute URL

use crate::url::resolve_link;
use scraper::{Html, Node, Selector};
use url::Url;

/// Elements whose text never reaches the page record
const SKIPPED_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Information extracted from one rendered page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// The page title (from the <title> tag), empty when absent
    pub title: String,

    /// Text nodes, trimmed, one per line
    pub text: String,

    /// Serialized document with every <img> removed
    pub html: String,

    /// Resolved anchor targets, in document order
    pub links: Vec<Url>,
}

/// Parses rendered HTML and extracts everything the crawl loop needs
///
/// Image nodes are detached from the tree first, so neither the snapshot
/// nor the text ever contain them.
///
/// # Arguments
///
/// * `html` - The rendered HTML
/// * `page_url` - The URL the page was fetched from, used to resolve links
///
/// # Example
///
/// ```
/// use corpus_crawler::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Congress 2025</title></head>
///     <body><img src="logo.png"><a href="/team">Team</a></body></html>"#;
/// let page_url = Url::parse("https://example.org/congress").unwrap();
/// let page = extract_page(html, &page_url);
/// assert_eq!(page.title, "Congress 2025");
/// assert!(!page.html.contains("logo.png"));
/// assert_eq!(page.links[0].as_str(), "https://example.org/team");
/// ```
pub fn extract_page(html: &str, page_url: &Url) -> ExtractedPage {
    let mut document = Html::parse_document(html);
    remove_images(&mut document);

    ExtractedPage {
        title: extract_title(&document),
        text: extract_text(&document),
        html: document.html(),
        links: extract_links(&document, page_url),
    }
}

fn remove_images(document: &mut Html) {
    let Ok(selector) = Selector::parse("img") else {
        return;
    };
    let ids: Vec<_> = document.select(&selector).map(|e| e.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_text(document: &Html) -> String {
    let mut lines = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| SKIPPED_TEXT_ELEMENTS.contains(&e.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}

fn extract_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .collect()
}
