use thiserror::Error;

/// Top-level error type for a locate request.
///
/// Weak or unparseable queries, empty candidate sets and ambiguous selectors are
/// not errors; they surface through the ranked result instead.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("document too large: {size} bytes exceeds the {limit} byte limit")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error("document fetch failed: {0}")]
    Fetch(String),

    #[error("unsupported render mode: {0}")]
    UnsupportedRenderMode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
