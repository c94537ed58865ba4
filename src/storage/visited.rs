use crate::state::DomainState;
use crate::storage::{write_json_atomic, DomainLayout};
use crate::{PersistenceError, StartupError};
use std::path::PathBuf;

/// Persists per-domain visited sets across process runs
///
/// Each domain's set lives in its own JSON file (a sorted list of URL
/// strings) under the corpus root. Sets are never shared between domains.
#[derive(Debug, Clone)]
pub struct DomainStateStore {
    output_dir: PathBuf,
}

impl DomainStateStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn layout(&self, domain: &str) -> DomainLayout {
        DomainLayout::new(&self.output_dir, domain)
    }

    /// Loads the visited set for `domain`
    ///
    /// A missing file yields an empty set. An unreadable or malformed file
    /// is a startup error for this domain: there is no silent recovery.
    pub fn load(&self, domain: &str) -> Result<DomainState, StartupError> {
        let path = self.layout(domain).visited_path();

        if !path.exists() {
            tracing::debug!("No visited set for {}, starting empty", domain);
            return Ok(DomainState::new(domain));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| StartupError::Io {
            path: path.clone(),
            source,
        })?;
        let urls: Vec<String> = serde_json::from_str(&content)
            .map_err(|source| StartupError::MalformedState { path, source })?;

        let state = DomainState::with_visited(domain, urls);
        tracing::info!("Loaded {} visited URLs for {}", state.len(), domain);
        Ok(state)
    }

    /// Overwrites the persisted set with the current state
    pub fn save(&self, state: &DomainState) -> Result<(), PersistenceError> {
        let path = self.layout(state.domain()).visited_path();
        write_json_atomic(&path, state.visited())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, DomainStateStore) {
        let dir = TempDir::new().unwrap();
        let store = DomainStateStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_load_missing_is_empty() {
        let (_dir, store) = store();
        let state = store.load("example.org").unwrap();
        assert!(state.is_empty());
        assert_eq!(state.domain(), "example.org");
    }

    #[test]
    fn test_save_then_load_across_runs() {
        let (_dir, store) = store();
        store.layout("example.org").prepare().unwrap();

        let mut state = DomainState::new("example.org");
        state.mark_visited("https://example.org/b");
        state.mark_visited("https://example.org/a");
        store.save(&state).unwrap();

        let content =
            std::fs::read_to_string(store.layout("example.org").visited_path()).unwrap();
        let listed: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(
            listed,
            vec!["https://example.org/a", "https://example.org/b"]
        );

        let reloaded = store.load("example.org").unwrap();
        assert!(reloaded.is_visited("https://example.org/a"));
        assert!(reloaded.is_visited("https://example.org/b"));
    }

    #[test]
    fn test_malformed_file_is_startup_error() {
        let (_dir, store) = store();
        let layout = store.layout("example.org");
        layout.prepare().unwrap();
        std::fs::write(layout.visited_path(), "{not json").unwrap();

        assert!(matches!(
            store.load("example.org"),
            Err(StartupError::MalformedState { .. })
        ));
    }

    #[test]
    fn test_load_resumes_raw_link_entries() {
        let (_dir, store) = store();
        let layout = store.layout("example.org");
        layout.prepare().unwrap();
        std::fs::write(
            layout.visited_path(),
            r#"["https://example.org", "https://example.org/a#x"]"#,
        )
        .unwrap();

        let state = store.load("example.org").unwrap();
        assert!(state.is_visited("https://example.org/"));
        assert!(state.is_visited("https://example.org/a"));
    }

    #[test]
    fn test_domains_are_isolated() {
        let (_dir, store) = store();
        store.layout("example.org").prepare().unwrap();

        let mut state = DomainState::new("example.org");
        state.mark_visited("https://example.org/a");
        store.save(&state).unwrap();

        assert!(store.load("other.org").unwrap().is_empty());
    }

    #[test]
    fn test_save_without_directory_fails() {
        let (_dir, store) = store();
        let state = DomainState::new("example.org");
        assert!(store.save(&state).is_err());
    }
}
