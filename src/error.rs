use thiserror::Error;

/// Errors returned by the clustering entry points in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Points in a dataset have inconsistent dimensionality, or a flat buffer
    /// does not hold a whole number of rows.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality (or buffer length).
        expected: usize,
        /// Found dimensionality (or buffer length).
        found: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("non-finite coordinate at row {row}, column {col}")]
    NonFinite {
        /// Point index.
        row: usize,
        /// Feature index.
        col: usize,
    },

    /// The algorithm does not support this many features.
    #[error("unsupported dimensionality: expected {expected} features, found {found}")]
    UnsupportedDimension {
        /// Dimensionality the algorithm supports.
        expected: usize,
        /// Dimensionality of the input.
        found: usize,
    },

    /// The bucket projector failed; the fit is aborted.
    #[error("projection failed: {0}")]
    Projection(String),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
