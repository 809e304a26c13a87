use thiserror::Error;

/// Terminal failures of a single `analyze` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    #[error("invalid input: {0}")]
    Validation(String),

    /// Model service unreachable or answered with a non-success status.
    #[error("model request failed: {0}")]
    Transport(String),

    /// Model service answered but reported its own failure.
    #[error("model service error: {0}")]
    Upstream(String),

    #[error("unexpected format: {0}")]
    Format(String),
}

impl AnalyzeError {
    /// Short, stable name used for metrics labels and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::Validation(_) => "validation",
            AnalyzeError::Transport(_) => "transport",
            AnalyzeError::Upstream(_) => "upstream",
            AnalyzeError::Format(_) => "format",
        }
    }
}

pub type AnalyzeResult<T> = Result<T, AnalyzeError>;
