//! Error types for statute ingestion.
//!
//! Uses the dual-error pattern: `IngestError` for library consumers with
//! detailed error context, and `TableError` for the per-page table
//! extraction capability, which is always recovered from locally.

use thiserror::Error;

/// Main error type for the ingestion library.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Token budget must be positive.
    #[error("Invalid token budget: {0}. Expected a positive number of tokens")]
    InvalidMaxTokens(usize),

    /// The token-counting dependency failed. Fatal for the current document only.
    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    /// A word-break repair rule did not compile.
    #[error("Invalid repair rule #{index} ('{pattern}'): {source}")]
    InvalidRule {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Statute JSON did not have the expected `법령 → 조문 → 조문단위` root.
    #[error("Unrecognized statute JSON: missing {0}")]
    UnrecognizedStatute(String),

    /// `inspect` was asked for an article the document does not have.
    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    /// Some documents of a batch failed; the others were written.
    #[error("{failed} of {total} documents failed")]
    BatchFailed { failed: usize, total: usize },

    /// The worker pool could not be started.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A document failed; carries the file name for batch reports.
    #[error("{path}: {source}")]
    Document {
        path: String,
        #[source]
        source: Box<IngestError>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngestError {
    /// Attach the originating document path to an error.
    #[must_use]
    pub fn in_document(self, path: impl Into<String>) -> Self {
        Self::Document {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Failure of the injected table-extraction capability for one page.
#[derive(Debug, Error)]
#[error("Table extraction failed on page {page}: {message}")]
pub struct TableError {
    pub page: usize,
    pub message: String,
}

impl TableError {
    /// Create a new table extraction error.
    #[must_use]
    pub fn new(page: usize, message: impl Into<String>) -> Self {
        Self {
            page,
            message: message.into(),
        }
    }
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
