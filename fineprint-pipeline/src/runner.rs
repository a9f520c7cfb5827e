//! Runs the detector over every fetched document in a store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fineprint::Detector;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::errors::PipelineResult;
use crate::progress::{Phase, SearchProgress};
use crate::store::{Document, DocumentStatus, DocumentStore, Finding};

/// Analysis occupies the last fifth of the overall progress bar.
const ANALYSIS_START: f64 = 0.8;
const ANALYSIS_SPAN: f64 = 0.2;

/// Cloneable handle that asks a running [`AnalysisRunner`] to stop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents marked `Analyzed` by this run
    pub analyzed: usize,
    /// Findings stored by this run
    pub findings: usize,
    /// Documents marked `Error` by this run
    pub failed: usize,
    pub stopped: bool,
}

#[derive(Debug)]
pub struct AnalysisRunner {
    settings: Settings,
    detector: Detector,
    stop: StopHandle,
}

impl AnalysisRunner {
    /// Runner whose detector follows `settings.linguistic`.
    pub fn new(settings: Settings) -> Self {
        let detector = Detector::from_config(&settings.linguistic);
        Self::with_detector(settings, detector)
    }

    pub fn with_detector(settings: Settings, detector: Detector) -> Self {
        Self {
            settings,
            detector,
            stop: StopHandle::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Analyze fetched documents, reporting progress after each step.
    ///
    /// The stop flag is checked between documents. A failure on a single
    /// document is recorded on it and the run continues; failures reading
    /// the store itself end the run with an [`Phase::Error`] report.
    pub fn run(
        &self,
        store: &dyn DocumentStore,
        on_progress: &mut dyn FnMut(&SearchProgress),
    ) -> PipelineResult<RunSummary> {
        match self.run_inner(store, on_progress) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                error!(error = %err, "analysis run failed");
                on_progress(&SearchProgress::failed(&err));
                Err(err)
            }
        }
    }

    fn run_inner(
        &self,
        store: &dyn DocumentStore,
        on_progress: &mut dyn FnMut(&SearchProgress),
    ) -> PipelineResult<RunSummary> {
        let min_confidence = self.settings.min_confidence_threshold;
        on_progress(&SearchProgress::from_store(
            store,
            min_confidence,
            Phase::Analyzing,
            "Analyzing documents for hidden rewards...",
            ANALYSIS_START,
        )?);

        let fetched = store.fetched_documents(self.settings.max_total_documents)?;
        let total = fetched.len();
        let mut summary = RunSummary::default();

        for (i, doc) in fetched.iter().enumerate() {
            if self.stop.is_stop_requested() {
                summary.stopped = true;
                break;
            }

            on_progress(&SearchProgress::from_store(
                store,
                min_confidence,
                Phase::Analyzing,
                format!("Analyzing {}/{}: {}...", i + 1, total, doc.url),
                ANALYSIS_START + i as f64 / total as f64 * ANALYSIS_SPAN,
            )?);

            match self.analyze_document(store, doc) {
                Ok(found) => {
                    summary.analyzed += 1;
                    if found {
                        summary.findings += 1;
                    }
                }
                Err(err) => {
                    warn!(document = doc.id, url = %doc.url, error = %err, "analysis failed");
                    store.update_status(doc.id, DocumentStatus::error(err.to_string()))?;
                    summary.failed += 1;
                }
            }
        }

        let message = if summary.stopped {
            "Analysis stopped by user.".to_string()
        } else {
            let counts = store.count_by_status()?;
            let results = store.findings(min_confidence)?.len();
            format!(
                "Analysis complete! Found {} potential hidden reward(s) in {} documents.",
                results, counts.analyzed
            )
        };
        info!(
            analyzed = summary.analyzed,
            findings = summary.findings,
            failed = summary.failed,
            stopped = summary.stopped,
            "{}",
            message
        );

        on_progress(&SearchProgress::from_store(
            store,
            min_confidence,
            Phase::Complete,
            message,
            1.0,
        )?);
        Ok(summary)
    }

    /// Returns whether a finding was stored.
    fn analyze_document(&self, store: &dyn DocumentStore, doc: &Document) -> PipelineResult<bool> {
        let text = match store.document_text(doc.id)? {
            Some(text) if !text.is_empty() => text,
            _ => {
                debug!(document = doc.id, "no text stored; marking analyzed");
                store.update_status(doc.id, DocumentStatus::Analyzed)?;
                return Ok(false);
            }
        };

        let mut found = false;
        if let Some(detection) = self.detector.analyze(&text) {
            if detection.confidence >= self.settings.min_confidence_threshold {
                store.insert_finding(&Finding::from_detection(doc.id, &detection))?;
                found = true;

                let excerpt: String = detection.matched_text.chars().take(80).collect();
                if detection.confidence >= self.settings.high_confidence_threshold {
                    info!(
                        url = %doc.url,
                        confidence = detection.confidence,
                        matched = %excerpt,
                        "high-confidence match"
                    );
                } else {
                    debug!(
                        url = %doc.url,
                        confidence = detection.confidence,
                        matched = %excerpt,
                        "match"
                    );
                }
            }
        }

        store.update_status(doc.id, DocumentStatus::Analyzed)?;
        Ok(found)
    }
}
