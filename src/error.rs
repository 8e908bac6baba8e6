//! Error types for statserve
//!
//! Three layers of errors:
//!
//! - [`StatError`]: raised by the numeric routines in [`crate::stats`]
//! - [`crate::dispatch::TestError`]: the `{message}` envelope returned to callers
//! - [`StatserveError`]: startup and CLI failures (config, I/O, JSON)

use thiserror::Error;

/// Result type for the numeric routines
pub type StatResult<T> = std::result::Result<T, StatError>;

/// Crate-level result type
pub type Result<T> = std::result::Result<T, StatserveError>;

/// Errors raised while validating or computing a statistical test
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    /// A sequence that must hold observations is empty
    #[error("{field} must not be empty")]
    EmptyData {
        /// Name of the offending field
        field: String,
    },

    /// Fewer observations or groups than the test needs
    #[error("{field} needs at least {required} values, got {got}")]
    InsufficientData {
        /// Name of the offending field
        field: String,
        /// Minimum accepted count
        required: usize,
        /// Actual count
        got: usize,
    },

    /// Two sequences that must align have different lengths
    #[error("{left} and {right} must have the same length ({left_len} != {right_len})")]
    LengthMismatch {
        /// Name of the first field
        left: String,
        /// Name of the second field
        right: String,
        /// Length of the first field
        left_len: usize,
        /// Length of the second field
        right_len: usize,
    },

    /// NaN or infinity in the input
    #[error("{field} contains a non-finite value at index {index}")]
    NonFinite {
        /// Name of the offending field
        field: String,
        /// Position of the first non-finite value
        index: usize,
    },

    /// Negative frequency in a contingency table
    #[error("observed frequencies must be non-negative (row {row}, column {col} is {value})")]
    NegativeCount {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Offending value
        value: f64,
    },

    /// Contingency table rows of unequal width
    #[error("observed must be rectangular: row {row} has {got} columns, expected {expected}")]
    RaggedTable {
        /// Row index
        row: usize,
        /// Columns in row 0
        expected: usize,
        /// Columns in this row
        got: usize,
    },

    /// The computation is undefined for this input (zero variance, singular fit, ...)
    #[error("{0}")]
    Degenerate(String),

    /// A reference distribution could not be constructed
    #[error("distribution error: {0}")]
    Distribution(String),
}

impl StatError {
    /// Whether the error describes malformed input rather than a numerical failure
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Degenerate(_) | Self::Distribution(_))
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate(reason.into())
    }

    pub(crate) fn distribution(err: impl std::fmt::Display) -> Self {
        Self::Distribution(err.to_string())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Host/port pair does not form a socket address
    #[error("invalid listen address {addr}: {reason}")]
    InvalidAddress {
        /// The rejected `host:port` string
        addr: String,
        /// Parser message
        reason: String,
    },

    /// CORS origin is not a valid header value
    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),

    /// `tracing` filter directive could not be parsed
    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidLogFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        reason: String,
    },
}

/// Top-level error for the server and CLI
#[derive(Debug, Error)]
pub enum StatserveError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Socket or stdin/stdout failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON on the command line
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A statistical test failed
    #[error("{0}")]
    Test(#[from] crate::dispatch::TestError),

    /// Unknown test identifier
    #[error("unknown test {0:?} (expected one of: ttest, mannwhitney, anova, chi2, corr, regression)")]
    UnknownTest(String),
}
