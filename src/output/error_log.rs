//! Append-only failure log
//!
//! One free-form line per failure, naming the URL and the cause. The crawler
//! never reads it back; it is meant for a human going through a finished run.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry and mirrors it to the tracing output
    ///
    /// Failing to write the log is itself only reported through tracing.
    pub fn record(&self, message: impl Display) {
        let line = message.to_string().replace('\n', " ");
        tracing::error!("{}", line);

        if let Err(e) = self.append(&line) {
            tracing::warn!("Cannot append to error log {}: {}", self.path.display(), e);
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}
