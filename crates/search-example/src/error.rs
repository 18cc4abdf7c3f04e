use thiserror::Error;

/// Failures raised by the search component.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A negative result limit.
    #[error("limit must not be negative, got {0}")]
    InvalidLimit(i64),

    /// An optimization other than `sample`.
    #[error("unknown optimization \"{0}\"; expected \"sample\" or nothing")]
    UnknownOptimization(String),

    /// The corpus file could not be read.
    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    /// The corpus file is not a JSON array of documents.
    #[error("invalid corpus: {0}")]
    Corpus(#[from] serde_json::Error),
}
