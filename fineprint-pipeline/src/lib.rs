#![doc(
    issue_tracker_base_url = "https://github.com/fineprint/fineprint/issues/"
)]

//! Batch analysis driver for [`fineprint`].
//!
//! Documents are loaded into a [`DocumentStore`], then an [`AnalysisRunner`]
//! scores every fetched document and keeps the ones above the configured
//! threshold as [`Finding`]s.
//!
//! ## Modules
//!
//! - [`config`] - [`Settings`] from TOML and `FINEPRINT_*` environment variables
//! - [`errors`] - Error types for the pipeline
//! - [`store`] - Document store trait and the in-memory implementation
//! - [`loader`] - Plain-text document loading
//! - [`progress`] - Progress snapshots passed to the run callback
//! - [`runner`] - The analysis loop with its stop flag
//!
//! ## Example
//!
//! ```
//! use fineprint_pipeline::{load_text, AnalysisRunner, DocumentStore, MemoryStore, Settings};
//!
//! let store = MemoryStore::new();
//! let text = format!(
//!     "{} If you've read this far, email us at prize@acme.com to claim your $500 gift card.",
//!     "These terms govern your use of the service.".repeat(3),
//! );
//! load_text(&store, "https://acme.example/tos", "manual", &text, 100).unwrap();
//!
//! let runner = AnalysisRunner::new(Settings::default());
//! let summary = runner.run(&store, &mut |_| {}).unwrap();
//! assert_eq!(summary.findings, 1);
//! assert_eq!(store.findings(0.3).unwrap().len(), 1);
//! ```

pub mod config;
pub mod errors;
pub mod loader;
pub mod progress;
pub mod runner;
pub mod store;
mod tracing_init;

pub use config::Settings;
pub use errors::{PipelineError, PipelineResult};
pub use loader::{load_directory, load_text, LoadSummary, FILE_SOURCE, INSUFFICIENT_CONTENT};
pub use progress::{Phase, SearchProgress};
pub use runner::{AnalysisRunner, RunSummary, StopHandle};
pub use store::{
    Document, DocumentId, DocumentStatus, DocumentStore, Finding, MemoryStore, StatusCounts,
};
pub use tracing_init::init_tracing;
