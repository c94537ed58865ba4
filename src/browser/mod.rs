//! Headless browser session used to render pages
//!
//! One Chrome process is launched per pipeline run and shared by every
//! domain crawl. Pages are opened in a fresh tab, given the render-settle
//! delay to run their scripts, and read back as the final DOM.
//!
//! Built on chromiumoxide (CDP) behind the `browser` cargo feature.

use crate::config::{BrowserConfig, CrawlerConfig};
use crate::crawler::PageFetcher;
use crate::{CorpusError, FetchError};
use async_trait::async_trait;
#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use chromiumoxide::error::CdpError;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig as CdpBrowserConfig};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;

/// Common Chrome executable paths to check
#[cfg(feature = "browser")]
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

/// A launched Chrome process and its CDP event loop
///
/// Release it with [`BrowserSession::close`]. If the session is dropped
/// instead, chromiumoxide kills the child process and the handler task ends
/// with the closed connection.
#[cfg(feature = "browser")]
pub struct BrowserSession {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    fetch_timeout: Duration,
    settle_delay: Duration,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Launches the browser
    ///
    /// # Arguments
    ///
    /// * `browser` - Process settings (headless, sandbox, executable, extra args)
    /// * `crawler` - Navigation timeout and render-settle delay
    pub async fn launch(
        browser: &BrowserConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, CorpusError> {
        tracing::info!("Launching browser (headless={})", browser.headless);

        let mut builder = CdpBrowserConfig::builder().request_timeout(crawler.fetch_timeout());
        if let Some(path) = find_chrome(browser) {
            tracing::info!("Using Chrome at {}", path.display());
            builder = builder.chrome_executable(path);
        }

        // with_head means NOT headless
        if !browser.headless {
            builder = builder.with_head();
        }
        if browser.no_sandbox {
            builder = builder.arg("--no-sandbox");
        }
        builder = builder
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        for arg in &browser.extra_args {
            builder = builder.arg(arg.as_str());
        }

        let config = builder
            .build()
            .map_err(|e| CorpusError::Browser(format!("invalid browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CorpusError::Browser(format!("failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            fetch_timeout: crawler.fetch_timeout(),
            settle_delay: crawler.render_settle_delay(),
        })
    }

    /// Closes the browser and waits for the process to exit
    pub async fn close(self) {
        let mut browser = self.browser.into_inner();
        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        tracing::info!("Browser closed");
    }

    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| classify_cdp_error(url, e))?;

        let result = async {
            match tokio::time::timeout(self.fetch_timeout, page.goto(url)).await {
                Err(_) => {
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                    })
                }
                Ok(Err(e)) => return Err(classify_cdp_error(url, e)),
                Ok(Ok(_)) => {}
            }
            tokio::time::sleep(self.settle_delay).await;
            page.content().await.map_err(|e| classify_cdp_error(url, e))
        }
        .await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }
        result
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageFetcher for BrowserSession {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.render(url).await
    }
}

/// Configured executable first, then well-known install locations
///
/// `None` lets chromiumoxide run its own detection.
#[cfg(feature = "browser")]
fn find_chrome(config: &BrowserConfig) -> Option<PathBuf> {
    if let Some(path) = &config.chrome_executable {
        return Some(PathBuf::from(path));
    }
    CHROME_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

#[cfg(feature = "browser")]
fn classify_cdp_error(url: &str, e: CdpError) -> FetchError {
    let message = e.to_string();
    if matches!(e, CdpError::Timeout) {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if message.contains("net::ERR") {
        FetchError::Network {
            url: url.to_string(),
            message,
        }
    } else {
        FetchError::Render {
            url: url.to_string(),
            message,
        }
    }
}

// Stub for when the browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserSession {
    _private: (),
}

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn launch(
        _browser: &BrowserConfig,
        _crawler: &CrawlerConfig,
    ) -> Result<Self, CorpusError> {
        Err(CorpusError::Browser(
            "browser support not compiled; rebuild with --features browser or set renderer = \"http\""
                .to_string(),
        ))
    }

    pub async fn close(self) {}
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageFetcher for BrowserSession {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        Err(FetchError::Render {
            url: url.to_string(),
            message: "browser support not compiled".to_string(),
        })
    }
}
