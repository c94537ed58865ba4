//! Output assembler: reads event records, attaches crawl results, writes
//! the aggregate corpus file

use crate::output::records::{EventRecord, PageRecord};
use crate::storage::write_json_atomic;
use crate::{CorpusError, PersistenceError};
use std::path::Path;

/// Loads the JSON array of event records produced upstream
pub fn load_events(path: &Path) -> Result<Vec<EventRecord>, CorpusError> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| CorpusError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Attaches the crawl result to its event record
///
/// Done once per record; any value from a previous pipeline run is
/// replaced.
pub fn attach_pages(event: &mut EventRecord, pages: Vec<PageRecord>) {
    if event.pages.is_some() {
        tracing::debug!(
            "Replacing existing pages for {}",
            event.homepage().unwrap_or("<no link>")
        );
    }
    event.pages = Some(pages);
}

/// Writes every event record as one aggregate file
///
/// The previous artifact is replaced atomically: a crash mid-write leaves
/// the old file intact.
pub fn write_aggregate(path: &Path, events: &[EventRecord]) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_json_atomic(path, events)?;
    tracing::info!("Wrote {} event records to {}", events.len(), path.display());
    Ok(())
}
