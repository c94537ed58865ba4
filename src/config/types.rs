use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the corpus crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub relevance: RelevanceConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub output: OutputConfig,
}

/// How page HTML is obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Renderer {
    /// Headless Chrome, scripts executed before the DOM is read
    #[default]
    Browser,
    /// Plain HTTP GET, no script execution
    Http,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of kept pages per domain crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum number of characters stored in a page record
    #[serde(rename = "max-content-length", default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Navigation / download timeout (seconds)
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Wait after navigation before reading the DOM (milliseconds)
    #[serde(rename = "render-settle-delay", default = "default_render_settle_delay")]
    pub render_settle_delay: u64,

    /// Wait after every URL marked visited (milliseconds)
    #[serde(rename = "politeness-delay", default = "default_politeness_delay")]
    pub politeness_delay: u64,

    /// Whether a page rejected by the relevance filter is marked visited
    #[serde(
        rename = "mark-visited-on-filter-reject",
        default = "default_mark_visited_on_filter_reject"
    )]
    pub mark_visited_on_filter_reject: bool,

    /// Extra attempts after a failed fetch (0 disables retry)
    #[serde(rename = "max-fetch-retries", default)]
    pub max_fetch_retries: u32,

    #[serde(default)]
    pub renderer: Renderer,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn render_settle_delay(&self) -> Duration {
        Duration::from_millis(self.render_settle_delay)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_content_length: default_max_content_length(),
            fetch_timeout: default_fetch_timeout(),
            render_settle_delay: default_render_settle_delay(),
            politeness_delay: default_politeness_delay(),
            mark_visited_on_filter_reject: default_mark_visited_on_filter_reject(),
            max_fetch_retries: 0,
            renderer: Renderer::default(),
        }
    }
}

/// Keyword and extension lists driving retention and downloads
#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceConfig {
    /// Case-insensitive substrings marking a URL/title/filename as relevant
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Document extensions eligible for download (without the dot)
    #[serde(rename = "asset-extensions", default = "default_asset_extensions")]
    pub asset_extensions: Vec<String>,

    /// Extensions never downloaded nor followed
    #[serde(rename = "image-extensions", default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            asset_extensions: default_asset_extensions(),
            image_extensions: default_image_extensions(),
        }
    }
}

/// Headless browser launch options
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Disable the Chrome sandbox (needed in most containers)
    #[serde(rename = "no-sandbox", default = "default_true")]
    pub no_sandbox: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when absent
    #[serde(rename = "chrome-executable", default)]
    pub chrome_executable: Option<String>,

    #[serde(rename = "extra-args", default)]
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: true,
            chrome_executable: None,
            extra_args: Vec::new(),
        }
    }
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// JSON array of event records to enrich
    #[serde(rename = "input-path")]
    pub input_path: String,

    /// Root directory holding one sub-directory per crawled domain
    pub directory: String,

    /// Where the enriched event records are written
    #[serde(rename = "aggregate-path")]
    pub aggregate_path: String,

    /// Append-only failure log
    #[serde(rename = "error-log")]
    pub error_log: String,
}

fn default_max_pages() -> usize {
    300
}

fn default_max_content_length() -> usize {
    10_000
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_render_settle_delay() -> u64 {
    3_000
}

fn default_politeness_delay() -> u64 {
    2_000
}

fn default_mark_visited_on_filter_reject() -> bool {
    true
}

fn default_true() -> bool {
    true
}

fn default_keywords() -> Vec<String> {
    [
        "congre",
        "congres",
        "congress",
        "congresse",
        "congresses",
        "2025",
        "2026",
        "2027",
        "event",
        "events",
        "planning",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_asset_extensions() -> Vec<String> {
    ["pdf", "docx", "pptx", "txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "svg", "webp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
