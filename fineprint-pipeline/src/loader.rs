//! Plain-text document loading.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::{PipelineError, PipelineResult};
use crate::store::{DocumentId, DocumentStatus, DocumentStore};

/// Source recorded for documents read from disk.
pub const FILE_SOURCE: &str = "file";

/// Status message for documents too short to analyze.
pub const INSUFFICIENT_CONTENT: &str = "Insufficient content";

/// Counts from a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Documents stored as `Fetched`
    pub fetched: usize,
    /// Documents stored as `Error` because they were too short
    pub insufficient: usize,
    /// Paths already present in the store
    pub duplicates: usize,
}

/// Store `text` under `url` as a fetched document.
///
/// Texts with fewer than `min_text_length` characters are kept with an
/// [`INSUFFICIENT_CONTENT`] error status. Returns `None` for a known URL.
pub fn load_text(
    store: &dyn DocumentStore,
    url: &str,
    source: &str,
    text: &str,
    min_text_length: usize,
) -> PipelineResult<Option<DocumentId>> {
    let Some(id) = store.add_document(url, source)? else {
        return Ok(None);
    };

    if is_insufficient(text, min_text_length) {
        store.update_status(id, DocumentStatus::error(INSUFFICIENT_CONTENT))?;
    } else {
        store.store_text(id, text)?;
        store.update_status(id, DocumentStatus::Fetched)?;
    }
    Ok(Some(id))
}

fn is_insufficient(text: &str, min_text_length: usize) -> bool {
    text.trim().is_empty() || text.chars().count() < min_text_length
}

/// Load every `*.txt` file under `dir`, recursively.
pub fn load_directory(
    store: &dyn DocumentStore,
    dir: &Path,
    min_text_length: usize,
) -> PipelineResult<LoadSummary> {
    let mut summary = LoadSummary::default();
    load_recursive(store, dir, min_text_length, &mut summary)?;
    debug!(
        dir = %dir.display(),
        fetched = summary.fetched,
        insufficient = summary.insufficient,
        duplicates = summary.duplicates,
        "loaded documents"
    );
    Ok(summary)
}

fn load_recursive(
    store: &dyn DocumentStore,
    dir: &Path,
    min_text_length: usize,
    summary: &mut LoadSummary,
) -> PipelineResult<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    let io_error = |e: std::io::Error| PipelineError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    let mut paths = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            load_recursive(store, &path, min_text_length, summary)?;
        } else if path.extension().map_or(false, |e| e == "txt") {
            let text = fs::read_to_string(&path).map_err(|e| PipelineError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let url = format!("file://{}", path.display());
            match load_text(store, &url, FILE_SOURCE, &text, min_text_length)? {
                None => summary.duplicates += 1,
                Some(_) if is_insufficient(&text, min_text_length) => {
                    warn!(path = %path.display(), "document too short to analyze");
                    summary.insufficient += 1;
                }
                Some(_) => summary.fetched += 1,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn long_text() -> String {
        "These terms govern your use of the service. ".repeat(5)
    }

    #[test]
    fn short_text_is_insufficient() {
        let store = MemoryStore::new();
        let id = load_text(&store, "https://a.example", "crawl", "Too short.", 100)
            .unwrap()
            .unwrap();
        assert_eq!(
            store.document(id).unwrap().status,
            DocumentStatus::error(INSUFFICIENT_CONTENT)
        );
        assert_eq!(store.document_text(id).unwrap(), None);
    }

    #[test]
    fn long_text_is_fetched() {
        let store = MemoryStore::new();
        let text = long_text();
        let id = load_text(&store, "https://a.example", "crawl", &text, 100)
            .unwrap()
            .unwrap();
        assert_eq!(store.document(id).unwrap().status, DocumentStatus::Fetched);
        assert_eq!(store.document_text(id).unwrap(), Some(text));
    }

    #[test]
    fn loads_nested_txt_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("acme");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("a.txt"), long_text()).unwrap();
        fs::write(nested.join("b.txt"), long_text()).unwrap();
        fs::write(nested.join("short.txt"), "tiny").unwrap();
        fs::write(nested.join("notes.md"), long_text()).unwrap();

        let store = MemoryStore::new();
        let summary = load_directory(&store, dir.path(), 100).unwrap();
        assert_eq!(
            summary,
            LoadSummary {
                fetched: 2,
                insufficient: 1,
                duplicates: 0,
            }
        );

        let again = load_directory(&store, dir.path(), 100).unwrap();
        assert_eq!(again.duplicates, 3);
        assert_eq!(store.count_by_status().unwrap().total(), 3);
    }

    #[test]
    fn missing_directory_loads_nothing() {
        let store = MemoryStore::new();
        let summary = load_directory(&store, Path::new("/no/such/dir"), 100).unwrap();
        assert_eq!(summary, LoadSummary::default());
    }
}
