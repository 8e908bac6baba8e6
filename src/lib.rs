//! # statserve
//!
//! Canned statistical tests served as JSON endpoints.
//!
//! Six classical tests share one dispatch contract: a JSON payload goes in,
//! is validated for the selected test, computed, rounded, and comes back as a
//! flat result envelope or a `{"message": ...}` error.
//!
//! ## Tests
//!
//! | Identifier | Test | Payload |
//! |---|---|---|
//! | `ttest` | Independent two-sample t-test | `{group1, group2}` |
//! | `mannwhitney` | Mann-Whitney U | `{group1, group2}` |
//! | `anova` | One-way ANOVA | `{groups}` |
//! | `chi2` | Chi-square test of independence | `{observed}` |
//! | `corr` | Pearson correlation | `{x, y}` |
//! | `regression` | Simple linear regression | `{x, y}` |
//!
//! ## Example
//!
//! ```rust
//! use statserve::dispatch::{run, TestKind};
//!
//! let payload = serde_json::json!({"observed": [[10, 20], [30, 40]]});
//! let result = run(TestKind::Chi2, payload).unwrap();
//! assert!(!result.significant());
//!
//! let err = run(TestKind::TTest, serde_json::json!({"group1": [1, 2]})).unwrap_err();
//! assert!(err.message.contains("group2"));
//! ```
//!
//! ## Architecture
//!
//! - [`stats`]: numeric routines over `f64` slices, tails from `statrs`
//! - [`dispatch`]: the parse → validate → compute → round pipeline
//! - `api`: axum router (feature `server`)
//! - [`config`]: explicit startup configuration
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
// Clippy allows (MUST come after deny/warn to override them)
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // usize -> f64 for sample sizes
#![allow(clippy::cast_possible_truncation)] // u128 -> u64 for metrics
#![allow(clippy::cast_sign_loss)] // rounded non-negative f64 -> usize
#![allow(clippy::must_use_candidate)] // Not all methods need #[must_use]
#![allow(clippy::doc_markdown)] // Allow technical terms without backticks
#![allow(clippy::uninlined_format_args)] // Prefer explicit format args
#![allow(clippy::missing_panics_doc)] // Allow missing Panics doc sections
#![allow(clippy::float_cmp)] // Exact comparisons for ties and zero checks
#![allow(clippy::many_single_char_names)] // Statistical notation (n, r, t, u)

/// HTTP API (axum router, handlers, CORS)
#[cfg(feature = "server")]
pub mod api;
/// Command-line interface for the `statserve` binary
#[cfg(feature = "server")]
pub mod cli;
/// Server configuration (bind address, CORS origins, log filter)
pub mod config;
/// Uniform dispatch contract for the statistical tests
///
/// Parses a JSON payload into the selected test's request, validates it,
/// computes the test, and returns a rounded result envelope or a
/// `{message}` error.
pub mod dispatch;
/// Error types
pub mod error;
/// Request counters exported in Prometheus format
#[cfg(feature = "server")]
pub mod metrics;
/// Statistical routines
pub mod stats;

pub use dispatch::{run, TestError, TestKind, TestResult};
pub use error::{Result, StatserveError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.starts_with("0."));
        assert!(VERSION.contains('.'));
    }
}
