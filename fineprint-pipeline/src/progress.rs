//! Progress snapshots handed to the run callback.

use std::fmt;

use serde::Serialize;

use crate::errors::PipelineResult;
use crate::store::DocumentStore;

/// Where the pipeline is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Analyzing,
    Complete,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Analyzing => "analyzing",
            Phase::Complete => "complete",
            Phase::Error => "error",
        })
    }
}

/// Snapshot of the store and the current action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchProgress {
    pub phase: Phase,
    /// Every document known to the store
    pub total_discovered: usize,
    /// Documents with text, analyzed or not
    pub total_fetched: usize,
    pub total_analyzed: usize,
    /// Findings at or above the configured threshold
    pub total_results: usize,
    pub current_action: String,
    /// Fraction in `[0, 1]`
    pub percent_complete: f64,
    pub is_running: bool,
}

impl Default for SearchProgress {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            total_discovered: 0,
            total_fetched: 0,
            total_analyzed: 0,
            total_results: 0,
            current_action: String::new(),
            percent_complete: 0.0,
            is_running: false,
        }
    }
}

impl SearchProgress {
    /// Counts read from `store`; findings below `min_confidence` are not
    /// counted as results.
    pub fn from_store(
        store: &dyn DocumentStore,
        min_confidence: f64,
        phase: Phase,
        current_action: impl Into<String>,
        percent_complete: f64,
    ) -> PipelineResult<Self> {
        let counts = store.count_by_status()?;
        Ok(Self {
            phase,
            total_discovered: counts.total(),
            total_fetched: counts.fetched + counts.analyzed,
            total_analyzed: counts.analyzed,
            total_results: store.findings(min_confidence)?.len(),
            current_action: current_action.into(),
            percent_complete,
            is_running: phase == Phase::Analyzing,
        })
    }

    /// An error snapshot carrying only the message.
    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            phase: Phase::Error,
            current_action: format!("Error: {}", error),
            ..Self::default()
        }
    }
}
