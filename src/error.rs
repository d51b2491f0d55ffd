/// Error types for fontscape operations.
///
/// Every fallible operation in the crate returns `Result<T, FontscapeError>`.
/// Errors are well-typed so callers (and the HTTP layer) can pattern-match
/// them into precise responses.
use thiserror::Error;

/// The main error type for fontscape operations.
#[derive(Error, Debug)]
pub enum FontscapeError {
    /// Font index not present in the catalog
    #[error("Font index {index} not found in catalog of {count} fonts")]
    FontNotFound {
        /// The index that was queried
        index: usize,
        /// Number of fonts in the catalog
        count: usize,
    },

    /// Font label not present in the catalog
    #[error("Font '{label}' not found in catalog")]
    LabelNotFound {
        /// The label that was queried
        label: String,
    },

    /// A query used a metric the database was not built with
    #[error("Metric '{metric}' is not configured (available: {available})")]
    UnsupportedMetric {
        /// The metric that was requested
        metric: String,
        /// Comma-separated list of configured metrics
        available: String,
    },

    /// Embedding dimensions don't match the catalog/database
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected number of dimensions
        expected: usize,
        /// Actual number of dimensions
        actual: usize,
    },

    /// Invalid data format or structure
    #[error("Invalid data: {reason}")]
    InvalidData {
        /// Description of why the data is invalid
        reason: String,
    },

    /// Dimensionality reduction could not run on the given sample
    #[error("Reduction error: {0}")]
    ReductionError(String),

    /// Interpolation requested but no decoder model is attached
    #[error("No glyph decoder model is attached to this service")]
    ModelUnavailable,

    /// Serialization error when converting data to/from JSON
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Catalog snapshot could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Result type alias for fontscape operations.
pub type FontscapeResult<T> = Result<T, FontscapeError>;
