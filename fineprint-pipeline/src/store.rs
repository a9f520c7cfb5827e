//! Document storage used by the pipeline.
//!
//! [`DocumentStore`] is the boundary to whatever persists documents, their
//! extracted text and findings. [`MemoryStore`] keeps everything in process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use fineprint::DetectionResult;
use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, PipelineResult};

pub type DocumentId = u64;

/// Processing state of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Known but not fetched yet
    Pending,
    /// Text is available for analysis
    Fetched,
    /// Detection has run
    Analyzed,
    /// Fetching or analysis failed
    Error { message: String },
}

impl DocumentStatus {
    pub fn error(message: impl Into<String>) -> Self {
        DocumentStatus::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub url: String,
    /// Where the URL came from (search provider, crawl, local file)
    pub source: String,
    pub status: DocumentStatus,
}

/// A detection that cleared the configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub document_id: DocumentId,
    pub confidence: f64,
    pub matched_text: String,
    pub context: String,
    pub pattern_names: Vec<String>,
}

impl Finding {
    pub fn from_detection(document_id: DocumentId, detection: &DetectionResult) -> Self {
        Self {
            document_id,
            confidence: detection.confidence,
            matched_text: detection.matched_text.clone(),
            context: detection.context.clone(),
            pattern_names: detection
                .pattern_names
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Pattern names as a JSON array, the form they are persisted in.
    pub fn pattern_names_json(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string(&self.pattern_names)?)
    }

    /// Inverse of [`pattern_names_json`](Self::pattern_names_json); an empty
    /// string decodes to no names.
    pub fn pattern_names_from_json(raw: &str) -> PipelineResult<Vec<String>> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(raw)?)
    }
}

/// Document counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub fetched: usize,
    pub analyzed: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.fetched + self.analyzed + self.error
    }
}

/// Persistence operations the pipeline needs.
///
/// Implementations serialize their own access; every method takes `&self`.
pub trait DocumentStore: Send + Sync {
    /// Register a URL. Returns `None` when the URL is already known.
    fn add_document(&self, url: &str, source: &str) -> PipelineResult<Option<DocumentId>>;

    fn pending_documents(&self, limit: usize) -> PipelineResult<Vec<Document>>;

    fn fetched_documents(&self, limit: usize) -> PipelineResult<Vec<Document>>;

    fn store_text(&self, id: DocumentId, text: &str) -> PipelineResult<()>;

    fn document_text(&self, id: DocumentId) -> PipelineResult<Option<String>>;

    fn update_status(&self, id: DocumentId, status: DocumentStatus) -> PipelineResult<()>;

    fn insert_finding(&self, finding: &Finding) -> PipelineResult<()>;

    /// Findings with `confidence >= min_confidence`, most confident first.
    fn findings(&self, min_confidence: f64) -> PipelineResult<Vec<Finding>>;

    fn count_by_status(&self) -> PipelineResult<StatusCounts>;
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: Vec<Document>,
    urls: HashMap<String, DocumentId>,
    texts: HashMap<DocumentId, String>,
    findings: Vec<Finding>,
}

impl MemoryState {
    fn document_mut(&mut self, id: DocumentId) -> PipelineResult<&mut Document> {
        id.checked_sub(1)
            .and_then(|idx| self.documents.get_mut(idx as usize))
            .ok_or(PipelineError::UnknownDocument(id))
    }

    fn with_status(&self, limit: usize, wanted: fn(&DocumentStatus) -> bool) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|doc| wanted(&doc.status))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// In-process [`DocumentStore`]. Ids start at 1 in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PipelineResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| PipelineError::Store("memory store lock poisoned".to_string()))
    }

    /// Look up a document by id.
    pub fn document(&self, id: DocumentId) -> PipelineResult<Document> {
        Ok(self.lock()?.document_mut(id)?.clone())
    }
}

impl DocumentStore for MemoryStore {
    fn add_document(&self, url: &str, source: &str) -> PipelineResult<Option<DocumentId>> {
        let mut state = self.lock()?;
        if state.urls.contains_key(url) {
            return Ok(None);
        }
        let id = state.documents.len() as DocumentId + 1;
        state.documents.push(Document {
            id,
            url: url.to_string(),
            source: source.to_string(),
            status: DocumentStatus::Pending,
        });
        state.urls.insert(url.to_string(), id);
        Ok(Some(id))
    }

    fn pending_documents(&self, limit: usize) -> PipelineResult<Vec<Document>> {
        Ok(self
            .lock()?
            .with_status(limit, |status| matches!(status, DocumentStatus::Pending)))
    }

    fn fetched_documents(&self, limit: usize) -> PipelineResult<Vec<Document>> {
        Ok(self
            .lock()?
            .with_status(limit, |status| matches!(status, DocumentStatus::Fetched)))
    }

    fn store_text(&self, id: DocumentId, text: &str) -> PipelineResult<()> {
        let mut state = self.lock()?;
        state.document_mut(id)?;
        state.texts.insert(id, text.to_string());
        Ok(())
    }

    fn document_text(&self, id: DocumentId) -> PipelineResult<Option<String>> {
        Ok(self.lock()?.texts.get(&id).cloned())
    }

    fn update_status(&self, id: DocumentId, status: DocumentStatus) -> PipelineResult<()> {
        self.lock()?.document_mut(id)?.status = status;
        Ok(())
    }

    fn insert_finding(&self, finding: &Finding) -> PipelineResult<()> {
        let mut state = self.lock()?;
        state.document_mut(finding.document_id)?;
        state.findings.push(finding.clone());
        Ok(())
    }

    fn findings(&self, min_confidence: f64) -> PipelineResult<Vec<Finding>> {
        let mut findings: Vec<Finding> = self
            .lock()?
            .findings
            .iter()
            .filter(|finding| finding.confidence >= min_confidence)
            .cloned()
            .collect();
        findings.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(findings)
    }

    fn count_by_status(&self) -> PipelineResult<StatusCounts> {
        let state = self.lock()?;
        let mut counts = StatusCounts::default();
        for doc in &state.documents {
            match doc.status {
                DocumentStatus::Pending => counts.pending += 1,
                DocumentStatus::Fetched => counts.fetched += 1,
                DocumentStatus::Analyzed => counts.analyzed += 1,
                DocumentStatus::Error { .. } => counts.error += 1,
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineprint::Detector;

    fn finding(document_id: DocumentId, confidence: f64) -> Finding {
        Finding {
            document_id,
            confidence,
            matched_text: "hidden prize".to_string(),
            context: "a hidden prize".to_string(),
            pattern_names: vec!["hidden_reward".to_string()],
        }
    }

    #[test]
    fn urls_are_unique() {
        let store = MemoryStore::new();
        assert_eq!(store.add_document("https://a.example/tos", "crawl").unwrap(), Some(1));
        assert_eq!(store.add_document("https://b.example/tos", "crawl").unwrap(), Some(2));
        assert_eq!(store.add_document("https://a.example/tos", "bing").unwrap(), None);
        assert_eq!(store.count_by_status().unwrap().pending, 2);
    }

    #[test]
    fn status_transitions() {
        let store = MemoryStore::new();
        let id = store.add_document("https://a.example/tos", "crawl").unwrap().unwrap();
        store.store_text(id, "some text").unwrap();
        store.update_status(id, DocumentStatus::Fetched).unwrap();
        assert_eq!(store.fetched_documents(10).unwrap().len(), 1);
        assert!(store.pending_documents(10).unwrap().is_empty());

        store.update_status(id, DocumentStatus::error("timeout")).unwrap();
        let counts = store.count_by_status().unwrap();
        assert_eq!(counts.error, 1);
        assert_eq!(counts.total(), 1);
        assert_eq!(store.document(id).unwrap().status, DocumentStatus::error("timeout"));
    }

    #[test]
    fn limit_applies() {
        let store = MemoryStore::new();
        for n in 0..5 {
            store.add_document(&format!("https://{}.example", n), "crawl").unwrap();
        }
        assert_eq!(store.pending_documents(3).unwrap().len(), 3);
    }

    #[test]
    fn unknown_document_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update_status(7, DocumentStatus::Analyzed),
            Err(PipelineError::UnknownDocument(7))
        ));
        assert!(store.store_text(0, "x").is_err());
        assert!(store.insert_finding(&finding(3, 0.5)).is_err());
        assert_eq!(store.document_text(1).unwrap(), None);
    }

    #[test]
    fn findings_filtered_and_sorted() {
        let store = MemoryStore::new();
        for n in 0..3 {
            store.add_document(&format!("https://{}.example", n), "crawl").unwrap();
        }
        store.insert_finding(&finding(1, 0.4)).unwrap();
        store.insert_finding(&finding(2, 0.9)).unwrap();
        store.insert_finding(&finding(3, 0.2)).unwrap();

        let confidences: Vec<_> = store
            .findings(0.3)
            .unwrap()
            .iter()
            .map(|f| f.confidence)
            .collect();
        assert_eq!(confidences, vec![0.9, 0.4]);
    }

    #[test]
    fn pattern_names_round_trip_through_json() {
        let found = finding(1, 0.5);
        let json = found.pattern_names_json().unwrap();
        assert_eq!(json, r#"["hidden_reward"]"#);
        assert_eq!(Finding::pattern_names_from_json(&json).unwrap(), found.pattern_names);
        assert!(Finding::pattern_names_from_json("").unwrap().is_empty());
        assert!(matches!(
            Finding::pattern_names_from_json("{not json"),
            Err(PipelineError::Serialization(_))
        ));
    }

    #[test]
    fn finding_from_detection() {
        let detection = Detector::new()
            .analyze("There is a hidden prize in the sweepstakes.")
            .unwrap();
        let found = Finding::from_detection(4, &detection);
        assert_eq!(found.document_id, 4);
        assert_eq!(found.matched_text, "hidden prize");
        assert_eq!(
            found.pattern_names,
            vec!["contest_words", "hidden_reward", "reward_mention"]
        );
    }
}
