//! Corpus crawler: a bounded, resumable single-domain crawler
//!
//! This crate starts from an event homepage, walks same-domain pages that look
//! relevant to the event, snapshots them, downloads linked documents and
//! attaches the resulting page records to the event for downstream analysis.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod relevance;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for corpus crawler operations
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Startup error: {0}")]
    Startup(#[from] StartupError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("Failed to read event records from {path}: {message}")]
    Input { path: PathBuf, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Failure to retrieve a single page or asset
///
/// Every variant carries the offending URL so the error log line is
/// self-contained.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("network failure for {url}: {message}")]
    Network { url: String, message: String },

    #[error("timeout fetching {url}")]
    Timeout { url: String },

    #[error("render failure for {url}: {message}")]
    Render { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// Returns the URL the failed fetch was aimed at
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::Render { url, .. }
            | Self::Status { url, .. } => url,
        }
    }
}

/// Best-effort write failures (visited set, snapshot, asset, aggregate)
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors that abort a single domain crawl before it starts
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("event record has no homepage link")]
    MissingHomepage,

    #[error("invalid homepage {url}: {source}")]
    InvalidHomepage { url: String, source: UrlError },

    #[error("malformed visited set {path}: {source}")]
    MalformedState {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for corpus crawler operations
pub type Result<T> = std::result::Result<T, CorpusError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{EventRecord, PageRecord};
pub use relevance::RelevanceFilter;
pub use state::{CrawlStatus, DomainState, PageState};
pub use storage::DomainStateStore;
pub use crate::url::extract_domain;
