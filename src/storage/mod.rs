//! Storage module for persisting crawl data
//!
//! The corpus is plain files, one directory per crawled domain:
//!
//! ```text
//! <output>/<domain>/pages_html/<snapshot>.html
//! <output>/<domain>/fichiers/<asset>
//! <output>/<domain>/pages_visitées.json
//! ```
//!
//! Whole-file rewrites go through a temp file in the same directory followed
//! by a rename, so a crash leaves either the old or the new content.

mod visited;

pub use visited::DomainStateStore;

use crate::{PersistenceError, StartupError};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const PAGES_DIR: &str = "pages_html";
const ASSETS_DIR: &str = "fichiers";
const VISITED_FILE: &str = "pages_visitées.json";

/// Paths of one domain's corpus directory
#[derive(Debug, Clone)]
pub struct DomainLayout {
    root: PathBuf,
}

impl DomainLayout {
    pub fn new(output_dir: &Path, domain: &str) -> Self {
        Self {
            root: output_dir.join(domain),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of cleaned HTML snapshots
    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_DIR)
    }

    /// Directory of downloaded documents
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    pub fn visited_path(&self) -> PathBuf {
        self.root.join(VISITED_FILE)
    }

    /// Creates the snapshot and asset directories
    pub fn prepare(&self) -> Result<(), StartupError> {
        for dir in [self.pages_dir(), self.assets_dir()] {
            std::fs::create_dir_all(&dir).map_err(|source| StartupError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Replaces `path` with `bytes` via temp file + rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Serializes `value` as 4-space indented JSON and writes it atomically
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), PersistenceError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| PersistenceError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    buf.push(b'\n');
    write_atomic(path, &buf)
}
