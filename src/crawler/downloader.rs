//! Asset downloader
//!
//! Fetches documents linked from kept pages and stores them verbatim under
//! the domain's asset directory.

use crate::crawler::fetcher::{AssetFetcher, RetryPolicy};
use crate::crawler::links::LinkRules;
use crate::output::ErrorLog;
use crate::relevance::RelevanceFilter;
use crate::storage::write_atomic;
use crate::url::asset_file_name;
use std::path::{Path, PathBuf};
use url::Url;

/// Result of one `maybe_download` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bytes written to the given path
    Downloaded(PathBuf),
    /// Image extension, never fetched
    SkippedImage,
    /// No keyword in the URL, never fetched
    SkippedIrrelevant,
    /// Fetch or write failed; already logged
    Failed,
}

pub struct Downloader<'a> {
    fetcher: &'a dyn AssetFetcher,
    rules: &'a LinkRules,
    relevance: &'a RelevanceFilter,
    retry: RetryPolicy,
    error_log: &'a ErrorLog,
}

impl<'a> Downloader<'a> {
    pub fn new(
        fetcher: &'a dyn AssetFetcher,
        rules: &'a LinkRules,
        relevance: &'a RelevanceFilter,
        retry: RetryPolicy,
        error_log: &'a ErrorLog,
    ) -> Self {
        Self {
            fetcher,
            rules,
            relevance,
            retry,
            error_log,
        }
    }

    /// Downloads `url` into `target_dir` if it is a relevant non-image asset
    ///
    /// Only the URL is checked for relevance; the content is never inspected
    /// before the download. Failures are written to the error log and never
    /// propagate to the page crawl.
    ///
    /// # Arguments
    ///
    /// * `url` - The asset URL
    /// * `target_dir` - The domain's asset directory
    pub async fn maybe_download(&self, url: &Url, target_dir: &Path) -> DownloadOutcome {
        if self.rules.is_image(url) {
            tracing::debug!("Skipping image {}", url);
            return DownloadOutcome::SkippedImage;
        }
        if !self.relevance.is_relevant(&[url.as_str()]) {
            tracing::debug!("Skipping irrelevant asset {}", url);
            return DownloadOutcome::SkippedIrrelevant;
        }

        let bytes = match self
            .retry
            .run(|| self.fetcher.fetch_asset(url.as_str()))
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                self.error_log
                    .record(format_args!("Asset download failed for {}: {}", url, e));
                return DownloadOutcome::Failed;
            }
        };

        let path = target_dir.join(asset_file_name(url));
        if let Err(e) = write_atomic(&path, &bytes) {
            self.error_log
                .record(format_args!("Asset write failed for {}: {}", url, e));
            return DownloadOutcome::Failed;
        }

        tracing::info!("Downloaded {} ({} bytes) to {}", url, bytes.len(), path.display());
        DownloadOutcome::Downloaded(path)
    }
}
