//! Event and page records exchanged with the pipeline stages around the crawler

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One kept page: URL, title and truncated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,

    #[serde(rename = "titre", default)]
    pub title: String,

    /// Extracted text, at most the configured number of characters
    #[serde(rename = "contenu", default)]
    pub content: String,
}

impl PageRecord {
    /// Builds a record, truncating `text` to `max_chars` characters
    pub fn new(url: impl Into<String>, title: impl Into<String>, text: &str, max_chars: usize) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: truncate_chars(text, max_chars).to_string(),
        }
    }
}

/// Returns the longest prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

const LINK_FIELD: &str = "lien";

/// An event (congress) record from the upstream enrichment stage
///
/// Only the homepage link (`lien`) is interpreted, and only when it is a
/// string; every field, `lien` included, is carried through untouched in
/// its original order. The crawl result is attached as `pages_liées`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(
        rename = "pages_liées",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pages: Option<Vec<PageRecord>>,
}

impl EventRecord {
    /// Homepage URL, if the record carries a non-blank string one
    pub fn homepage(&self) -> Option<&str> {
        self.extra
            .get(LINK_FIELD)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}
