// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod metrics;
pub mod prompt;
pub mod severity;
pub mod types;

// Normalization pipeline (classifier, synthesizer, normalizer, dedup, dispatcher)
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{analyze, Analysis, AnalyzeRequest, ResponseMode};
pub use crate::api::{router, AppState};
pub use crate::error::{AnalyzeError, AnalyzeResult};
pub use crate::types::{Issue, OccurrenceDetails, Source, SourceType};
