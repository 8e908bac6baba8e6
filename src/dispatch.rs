//! Statistical test dispatch
//!
//! Every test goes through the same pipeline:
//!
//! ```text
//! JSON payload → parse → validate → compute → round → TestResult
//!                  └──────────┴─────────┴──────────→ TestError {message}
//! ```
//!
//! A test is described by a [`StatTest`] implementation (request type,
//! validator, compute function). [`dispatch`] is the only code path that
//! drives them; [`run`] selects the descriptor from a [`TestKind`].
//!
//! ## Example
//!
//! ```rust
//! use statserve::dispatch::{run, TestKind, TestResult};
//!
//! let payload = serde_json::json!({"group1": [12, 15, 9, 14, 18], "group2": [10, 11, 8, 13, 12]});
//! let result = run(TestKind::TTest, payload).unwrap();
//! if let TestResult::TTest(r) = result {
//!     assert_eq!(r.mean1, 13.6);
//!     assert_eq!(r.sig, r.p < 0.05);
//! }
//! ```

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    str::FromStr,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{StatError, StatResult, StatserveError},
    stats,
};

/// Decimal places kept in every reported float
pub const DECIMALS: i32 = 4;

/// Round to [`DECIMALS`] places, half away from zero, without producing -0.0
#[must_use]
pub fn round4(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    let scaled = value * scale;
    // Magnitudes this large carry no fractional digits to round
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn round_each<'a>(fields: impl IntoIterator<Item = &'a mut f64>) {
    for v in fields {
        *v = round4(*v);
    }
}

// ============================================================================
// Test identifiers
// ============================================================================

/// Supported statistical tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    /// Independent two-sample t-test
    TTest,
    /// Mann-Whitney U test
    MannWhitney,
    /// One-way ANOVA
    Anova,
    /// Chi-square test of independence
    Chi2,
    /// Pearson correlation
    Corr,
    /// Simple linear regression
    Regression,
}

impl TestKind {
    /// All tests, in the order they are advertised
    pub const ALL: [TestKind; 6] = [
        TestKind::TTest,
        TestKind::MannWhitney,
        TestKind::Anova,
        TestKind::Chi2,
        TestKind::Corr,
        TestKind::Regression,
    ];

    /// Wire identifier (also the URL path segment)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TestKind::TTest => "ttest",
            TestKind::MannWhitney => "mannwhitney",
            TestKind::Anova => "anova",
            TestKind::Chi2 => "chi2",
            TestKind::Corr => "corr",
            TestKind::Regression => "regression",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = StatserveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StatserveError::UnknownTest(s.to_string()))
    }
}

/// Identifiers of every supported test, in fixed order
#[must_use]
pub fn list_tests() -> Vec<&'static str> {
    TestKind::ALL.iter().map(|k| k.as_str()).collect()
}

// ============================================================================
// Error envelope
// ============================================================================

/// Whether a failure was caused by the input or by the computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, malformed, or mismatched input
    #[default]
    Validation,
    /// The statistical routine could not produce a result
    Computation,
}

/// Error envelope returned to callers as `{"message": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct TestError {
    /// Failure category (not serialized)
    #[serde(skip)]
    pub kind: ErrorKind,
    /// Human-readable description
    pub message: String,
}

impl TestError {
    /// Validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    /// Computation failure
    pub fn computation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Computation,
            message: message.into(),
        }
    }
}

impl From<StatError> for TestError {
    fn from(err: StatError) -> Self {
        if err.is_validation() {
            Self::validation(err.to_string())
        } else {
            Self::computation(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TestError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation(format!("invalid request body: {err}"))
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Two independent samples (t-test, Mann-Whitney)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoSampleRequest {
    /// First sample
    pub group1: Vec<f64>,
    /// Second sample
    pub group2: Vec<f64>,
}

/// k independent samples (ANOVA)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsRequest {
    /// Samples, one per group
    pub groups: Vec<Vec<f64>>,
}

/// Contingency table (chi-square)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRequest {
    /// Observed frequencies, one inner array per row
    pub observed: Vec<Vec<f64>>,
}

/// Paired observations (correlation, regression)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XyRequest {
    /// Predictor
    pub x: Vec<f64>,
    /// Response
    pub y: Vec<f64>,
}

// ============================================================================
// Results
// ============================================================================

/// t-test envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTestResponse {
    /// Test name
    pub test: String,
    /// t statistic
    pub t: f64,
    /// p-value
    pub p: f64,
    /// Mean of group1
    pub mean1: f64,
    /// Mean of group2
    pub mean2: f64,
    /// p < 0.05
    pub sig: bool,
}

/// Mann-Whitney envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MannWhitneyResponse {
    /// Test name
    pub test: String,
    /// U statistic of group1
    #[serde(rename = "U")]
    pub u: f64,
    /// p-value
    pub p: f64,
    /// Median of group1
    pub median1: f64,
    /// Median of group2
    pub median2: f64,
    /// p < 0.05
    pub sig: bool,
}

/// ANOVA envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaResponse {
    /// Test name
    pub test: String,
    /// F statistic
    #[serde(rename = "F")]
    pub f: f64,
    /// p-value
    pub p: f64,
    /// Group means in input order
    pub means: Vec<f64>,
    /// p < 0.05
    pub sig: bool,
}

/// Chi-square envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chi2Response {
    /// Test name
    pub test: String,
    /// Chi-square statistic
    pub chi2: f64,
    /// p-value
    pub p: f64,
    /// Degrees of freedom
    pub dof: usize,
    /// Expected frequencies under independence
    pub expected: Vec<Vec<f64>>,
    /// p < 0.05
    pub sig: bool,
}

/// Fitted line attached to the correlation envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Slope
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
}

/// Correlation envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResponse {
    /// Test name
    pub test: String,
    /// Pearson r
    pub r: f64,
    /// p-value
    pub p: f64,
    /// OLS line of y on x
    pub regression: Line,
    /// p < 0.05
    pub sig: bool,
}

/// Regression envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResponse {
    /// Test name
    pub test: String,
    /// Slope
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
    /// Pearson r
    pub r: f64,
    /// p-value for slope ≠ 0
    pub p: f64,
    /// Standard error of the slope
    pub stderr: f64,
    /// Standard error of the intercept
    pub intercept_stderr: f64,
    /// p < 0.05
    pub sig: bool,
}

/// Result of any test, serialized as its flat envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TestResult {
    /// t-test
    TTest(TTestResponse),
    /// Mann-Whitney U
    MannWhitney(MannWhitneyResponse),
    /// One-way ANOVA
    Anova(AnovaResponse),
    /// Chi-square
    Chi2(Chi2Response),
    /// Pearson correlation
    Corr(CorrelationResponse),
    /// Linear regression
    Regression(RegressionResponse),
}

impl TestResult {
    /// Which test produced this result
    #[must_use]
    pub fn kind(&self) -> TestKind {
        match self {
            TestResult::TTest(_) => TestKind::TTest,
            TestResult::MannWhitney(_) => TestKind::MannWhitney,
            TestResult::Anova(_) => TestKind::Anova,
            TestResult::Chi2(_) => TestKind::Chi2,
            TestResult::Corr(_) => TestKind::Corr,
            TestResult::Regression(_) => TestKind::Regression,
        }
    }

    /// Reported p-value
    #[must_use]
    pub fn p_value(&self) -> f64 {
        match self {
            TestResult::TTest(r) => r.p,
            TestResult::MannWhitney(r) => r.p,
            TestResult::Anova(r) => r.p,
            TestResult::Chi2(r) => r.p,
            TestResult::Corr(r) => r.p,
            TestResult::Regression(r) => r.p,
        }
    }

    /// Significance flag
    #[must_use]
    pub fn significant(&self) -> bool {
        match self {
            TestResult::TTest(r) => r.sig,
            TestResult::MannWhitney(r) => r.sig,
            TestResult::Anova(r) => r.sig,
            TestResult::Chi2(r) => r.sig,
            TestResult::Corr(r) => r.sig,
            TestResult::Regression(r) => r.sig,
        }
    }

    /// Every float field, in serialization order
    fn floats(&self) -> Vec<f64> {
        match self {
            TestResult::TTest(r) => vec![r.t, r.p, r.mean1, r.mean2],
            TestResult::MannWhitney(r) => vec![r.u, r.p, r.median1, r.median2],
            TestResult::Anova(r) => [r.f, r.p]
                .into_iter()
                .chain(r.means.iter().copied())
                .collect(),
            TestResult::Chi2(r) => [r.chi2, r.p]
                .into_iter()
                .chain(r.expected.iter().flatten().copied())
                .collect(),
            TestResult::Corr(r) => vec![r.r, r.p, r.regression.slope, r.regression.intercept],
            TestResult::Regression(r) => vec![
                r.slope,
                r.intercept,
                r.r,
                r.p,
                r.stderr,
                r.intercept_stderr,
            ],
        }
    }

    /// Whether every float field is finite (JSON has no NaN or infinity)
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.floats().iter().all(|v| v.is_finite())
    }

    /// Round every float field for display stability
    #[must_use]
    pub fn rounded(mut self) -> Self {
        match &mut self {
            TestResult::TTest(r) => round_each([&mut r.t, &mut r.p, &mut r.mean1, &mut r.mean2]),
            TestResult::MannWhitney(r) => {
                round_each([&mut r.u, &mut r.p, &mut r.median1, &mut r.median2]);
            },
            TestResult::Anova(r) => {
                round_each([&mut r.f, &mut r.p]);
                round_each(&mut r.means);
            },
            TestResult::Chi2(r) => {
                round_each([&mut r.chi2, &mut r.p]);
                round_each(r.expected.iter_mut().flatten());
            },
            TestResult::Corr(r) => round_each([
                &mut r.r,
                &mut r.p,
                &mut r.regression.slope,
                &mut r.regression.intercept,
            ]),
            TestResult::Regression(r) => round_each([
                &mut r.slope,
                &mut r.intercept,
                &mut r.r,
                &mut r.p,
                &mut r.stderr,
                &mut r.intercept_stderr,
            ]),
        }
        self
    }
}

macro_rules! impl_into_result {
    ($($response:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$response> for TestResult {
                fn from(response: $response) -> Self {
                    TestResult::$variant(response)
                }
            }
        )*
    };
}

impl_into_result! {
    TTestResponse => TTest,
    MannWhitneyResponse => MannWhitney,
    AnovaResponse => Anova,
    Chi2Response => Chi2,
    CorrelationResponse => Corr,
    RegressionResponse => Regression,
}

// ============================================================================
// Descriptors
// ============================================================================

/// Capability set of a statistical test
///
/// `validate` runs before `compute` and must reject every input `compute`
/// cannot handle for structural reasons; numerical failures surface from
/// `compute` as [`StatError::Degenerate`].
pub trait StatTest {
    /// Identifier
    const KIND: TestKind;
    /// Human-readable name reported in the `test` field
    const NAME: &'static str;
    /// Request body
    type Request: DeserializeOwned;
    /// Unrounded result envelope
    type Response: Serialize + Into<TestResult>;

    /// Shape and cardinality checks
    ///
    /// # Errors
    ///
    /// Returns a validation [`StatError`] describing the first problem found.
    fn validate(request: &Self::Request) -> StatResult<()>;

    /// Run the test on a validated request (floats unrounded)
    ///
    /// # Errors
    ///
    /// Returns [`StatError`] when the computation is undefined for the input.
    fn compute(request: &Self::Request) -> StatResult<Self::Response>;
}

fn significant(p: f64) -> bool {
    p < stats::ALPHA
}

/// Independent two-sample t-test (equal variances)
pub struct StudentT;

impl StatTest for StudentT {
    const KIND: TestKind = TestKind::TTest;
    const NAME: &'static str = "Independent t-test";
    type Request = TwoSampleRequest;
    type Response = TTestResponse;

    fn validate(request: &Self::Request) -> StatResult<()> {
        stats::validate_sample("group1", &request.group1)?;
        stats::validate_sample("group2", &request.group2)
    }

    fn compute(request: &Self::Request) -> StatResult<Self::Response> {
        let r = stats::ttest_ind(&request.group1, &request.group2)?;
        Ok(TTestResponse {
            test: Self::NAME.to_string(),
            t: r.t_statistic,
            p: r.p_value,
            mean1: r.mean1,
            mean2: r.mean2,
            sig: significant(r.p_value),
        })
    }
}

/// Mann-Whitney U rank-sum test
pub struct MannWhitney;

impl StatTest for MannWhitney {
    const KIND: TestKind = TestKind::MannWhitney;
    const NAME: &'static str = "Mann-Whitney U test";
    type Request = TwoSampleRequest;
    type Response = MannWhitneyResponse;

    fn validate(request: &Self::Request) -> StatResult<()> {
        StudentT::validate(request)
    }

    fn compute(request: &Self::Request) -> StatResult<Self::Response> {
        let r = stats::mann_whitney_u(&request.group1, &request.group2)?;
        Ok(MannWhitneyResponse {
            test: Self::NAME.to_string(),
            u: r.u_statistic,
            p: r.p_value,
            median1: r.median1,
            median2: r.median2,
            sig: significant(r.p_value),
        })
    }
}

/// One-way ANOVA
pub struct OneWayAnova;

impl StatTest for OneWayAnova {
    const KIND: TestKind = TestKind::Anova;
    const NAME: &'static str = "One-way ANOVA";
    type Request = GroupsRequest;
    type Response = AnovaResponse;

    fn validate(request: &Self::Request) -> StatResult<()> {
        stats::validate_groups(&request.groups)
    }

    fn compute(request: &Self::Request) -> StatResult<Self::Response> {
        let r = stats::f_oneway(&request.groups)?;
        Ok(AnovaResponse {
            test: Self::NAME.to_string(),
            f: r.f_statistic,
            p: r.p_value,
            means: r.means,
            sig: significant(r.p_value),
        })
    }
}

/// Chi-square test of independence
pub struct ChiSquare;

impl StatTest for ChiSquare {
    const KIND: TestKind = TestKind::Chi2;
    const NAME: &'static str = "Chi-square test of independence";
    type Request = TableRequest;
    type Response = Chi2Response;

    fn validate(request: &Self::Request) -> StatResult<()> {
        stats::validate_table(&request.observed)
    }

    fn compute(request: &Self::Request) -> StatResult<Self::Response> {
        let r = stats::chi2_contingency(&request.observed)?;
        Ok(Chi2Response {
            test: Self::NAME.to_string(),
            chi2: r.statistic,
            p: r.p_value,
            dof: r.dof,
            expected: r.expected,
            sig: significant(r.p_value),
        })
    }
}

/// Pearson correlation with a convenience regression line
pub struct Correlation;

impl StatTest for Correlation {
    const KIND: TestKind = TestKind::Corr;
    const NAME: &'static str = "Pearson correlation";
    type Request = XyRequest;
    type Response = CorrelationResponse;

    fn validate(request: &Self::Request) -> StatResult<()> {
        stats::validate_pair(&request.x, &request.y)
    }

    fn compute(request: &Self::Request) -> StatResult<Self::Response> {
        let r = stats::pearsonr(&request.x, &request.y)?;
        Ok(CorrelationResponse {
            test: Self::NAME.to_string(),
            r: r.r,
            p: r.p_value,
            regression: Line {
                slope: r.slope,
                intercept: r.intercept,
            },
            sig: significant(r.p_value),
        })
    }
}

/// Simple (single predictor) linear regression
pub struct Regression;

impl StatTest for Regression {
    const KIND: TestKind = TestKind::Regression;
    const NAME: &'static str = "Simple linear regression";
    type Request = XyRequest;
    type Response = RegressionResponse;

    fn validate(request: &Self::Request) -> StatResult<()> {
        stats::validate_pair(&request.x, &request.y)
    }

    fn compute(request: &Self::Request) -> StatResult<Self::Response> {
        let r = stats::linregress(&request.x, &request.y)?;
        Ok(RegressionResponse {
            test: Self::NAME.to_string(),
            slope: r.slope,
            intercept: r.intercept,
            r: r.r,
            p: r.p_value,
            stderr: r.stderr,
            intercept_stderr: r.intercept_stderr,
            sig: significant(r.p_value),
        })
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Parse, validate, compute, and round one test
///
/// A panic inside the computation is caught and reported as a computation
/// error; nothing escapes this function except a [`TestError`].
///
/// # Errors
///
/// [`TestError`] with [`ErrorKind::Validation`] for bad payloads and
/// [`ErrorKind::Computation`] for numerical failures.
pub fn dispatch<T: StatTest>(payload: Value) -> Result<TestResult, TestError> {
    let request: T::Request = serde_json::from_value(payload)?;
    T::validate(&request).map_err(|err| {
        debug!(test = %T::KIND, error = %err, "validation failed");
        TestError::from(err)
    })?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| T::compute(&request)));
    let result: TestResult = match outcome {
        Ok(Ok(response)) => response.into(),
        Ok(Err(err)) => {
            debug!(test = %T::KIND, error = %err, "computation failed");
            return Err(err.into());
        },
        Err(_) => {
            warn!(test = %T::KIND, "computation panicked");
            return Err(TestError::computation(format!(
                "{} failed on this input",
                T::NAME
            )));
        },
    };

    if !result.is_finite() {
        debug!(test = %T::KIND, "result has non-finite fields");
        return Err(StatError::degenerate(format!(
            "{} result is not finite for this input",
            T::NAME
        ))
        .into());
    }

    debug!(test = %T::KIND, p = result.p_value(), "computed");
    Ok(result.rounded())
}

/// Run the test identified by `kind`
///
/// # Errors
///
/// See [`dispatch`].
pub fn run(kind: TestKind, payload: Value) -> Result<TestResult, TestError> {
    match kind {
        TestKind::TTest => dispatch::<StudentT>(payload),
        TestKind::MannWhitney => dispatch::<MannWhitney>(payload),
        TestKind::Anova => dispatch::<OneWayAnova>(payload),
        TestKind::Chi2 => dispatch::<ChiSquare>(payload),
        TestKind::Corr => dispatch::<Correlation>(payload),
        TestKind::Regression => dispatch::<Regression>(payload),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.23456), 1.2346);
        assert_eq!(round4(-1.23454), -1.2345);
        assert_eq!(round4(2.0), 2.0);
        assert!(round4(-0.00001).is_sign_positive());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in TestKind::ALL {
            assert_eq!(kind.as_str().parse::<TestKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                json!(kind.as_str())
            );
        }
        assert!("regr".parse::<TestKind>().is_err());
    }

    #[test]
    fn test_list_tests_fixed_order() {
        assert_eq!(
            list_tests(),
            vec!["ttest", "mannwhitney", "anova", "chi2", "corr", "regression"]
        );
        assert_eq!(list_tests(), list_tests());
    }

    #[test]
    fn test_ttest_example_scenario() {
        let payload = json!({"group1": [12, 15, 9, 14, 18], "group2": [10, 11, 8, 13, 12]});
        let TestResult::TTest(r) = run(TestKind::TTest, payload).unwrap() else {
            panic!("expected t-test result");
        };
        assert_eq!(r.test, "Independent t-test");
        assert_eq!(r.mean1, 13.6);
        assert_eq!(r.mean2, 10.8);
        assert_eq!(r.t, 1.6166);
        assert!(r.p.is_finite());
        assert_eq!(r.sig, r.p < 0.05);
        assert!(!r.sig);
    }

    #[test]
    fn test_missing_field_is_validation_error() {
        let err = run(TestKind::TTest, json!({"group1": [1, 2, 3]})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("group2"), "{}", err.message);
    }

    #[test]
    fn test_wrong_types_are_validation_errors() {
        let err = run(TestKind::Corr, json!({"x": "1,2,3", "y": [1, 2, 3]})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = run(TestKind::Anova, json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = run(TestKind::Chi2, json!({"observed": [[1, "a"], [2, 3]]})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_empty_group_is_validation_error() {
        let err = run(TestKind::MannWhitney, json!({"group1": [], "group2": [1]})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "group1 must not be empty");
    }

    #[test]
    fn test_degenerate_input_is_computation_error() {
        let err = run(
            TestKind::Regression,
            json!({"x": [1, 1, 1], "y": [1, 2, 3]}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Computation);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_anova_two_groups_matches_ttest_p() {
        let g1 = json!([3.1, 4.7, 5.0, 2.2, 6.3, 4.4]);
        let g2 = json!([5.9, 7.2, 6.6, 8.1, 5.5]);
        let t = run(TestKind::TTest, json!({"group1": g1, "group2": g2})).unwrap();
        let f = run(TestKind::Anova, json!({"groups": [g1, g2]})).unwrap();
        assert!(close(t.p_value(), f.p_value(), 1e-4 + 1e-12));
        assert_eq!(t.significant(), f.significant());
    }

    #[test]
    fn test_chi2_example_scenario() {
        let TestResult::Chi2(r) =
            run(TestKind::Chi2, json!({"observed": [[10, 20], [30, 40]]})).unwrap()
        else {
            panic!("expected chi-square result");
        };
        assert_eq!(r.dof, 1);
        assert_eq!(r.expected, vec![vec![12.0, 18.0], vec![28.0, 42.0]]);
        assert_eq!(r.chi2, 0.4464);
        assert!(!r.sig);
    }

    #[test]
    fn test_regression_exact_line() {
        let TestResult::Regression(r) = run(
            TestKind::Regression,
            json!({"x": [1, 2, 3, 4], "y": [5, 7, 9, 11]}),
        )
        .unwrap() else {
            panic!("expected regression result");
        };
        assert_eq!(r.slope, 2.0);
        assert_eq!(r.intercept, 3.0);
        assert_eq!(r.r, 1.0);
        assert_eq!(r.p, 0.0);
        assert!(r.sig);
    }

    #[test]
    fn test_correlation_includes_line() {
        let TestResult::Corr(r) = run(
            TestKind::Corr,
            json!({"x": [1, 2, 3, 4, 5], "y": [2, 4, 5, 4, 5]}),
        )
        .unwrap() else {
            panic!("expected correlation result");
        };
        assert_eq!(r.r, 0.7746);
        assert_eq!(r.regression.slope, 0.6);
        assert_eq!(r.regression.intercept, 2.2);
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = run(
            TestKind::MannWhitney,
            json!({"group1": [1, 2, 3], "group2": [4, 5, 6]}),
        )
        .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["U", "median1", "median2", "p", "sig", "test"]);
    }

    #[test]
    fn test_error_serializes_message_only() {
        let err = TestError::computation("zero variance");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"message": "zero variance"})
        );
    }

    struct Exploding;

    impl StatTest for Exploding {
        const KIND: TestKind = TestKind::TTest;
        const NAME: &'static str = "Exploding test";
        type Request = TwoSampleRequest;
        type Response = TTestResponse;

        fn validate(_: &Self::Request) -> StatResult<()> {
            Ok(())
        }

        fn compute(_: &Self::Request) -> StatResult<TTestResponse> {
            panic!("boom")
        }
    }

    #[test]
    fn test_round4_keeps_huge_magnitudes() {
        assert_eq!(round4(1e308), 1e308);
        assert_eq!(round4(-1.5e308), -1.5e308);
        assert!(round4(f64::MAX).is_finite());
    }

    #[test]
    fn test_overflowing_inputs_are_computation_errors() {
        let cases = [
            (TestKind::TTest, json!({"group1": [1e308, 1e308, 1e308], "group2": [1, 2, 3]})),
            (TestKind::TTest, json!({"group1": [1e200, -1e200, 0], "group2": [1, 2, 3]})),
            (TestKind::Anova, json!({"groups": [[1e308, 1e308, 1e308], [1, 2, 3]]})),
            (TestKind::Anova, json!({"groups": [[1e200, -1e200, 0], [1, 2, 3]]})),
            (TestKind::Chi2, json!({"observed": [[1e308, 1e308], [1e308, 1e307]]})),
            (TestKind::Corr, json!({"x": [1e200, 2e200, 3e200], "y": [1, 2, 3.1]})),
            (TestKind::Regression, json!({"x": [1e200, 2e200, 3e200], "y": [1, 2, 3.1]})),
        ];
        for (kind, payload) in cases {
            let err = run(kind, payload.clone()).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Computation, "{kind} {payload}");
            assert!(err.message.contains("not finite"), "{kind}: {}", err.message);
        }
    }

    #[test]
    fn test_rank_test_handles_huge_magnitudes() {
        let result = run(
            TestKind::MannWhitney,
            json!({"group1": [1e308, 1.5e308, 1.7e308, 1.6e308], "group2": [1, 2, 3]}),
        )
        .unwrap();
        assert!(result.is_finite());
        let TestResult::MannWhitney(r) = result else {
            panic!("expected Mann-Whitney result");
        };
        assert_eq!(r.u, 12.0);
        assert!(close(r.median1 / 1.55e308, 1.0, 1e-12));
    }

    struct NotANumber;

    impl StatTest for NotANumber {
        const KIND: TestKind = TestKind::TTest;
        const NAME: &'static str = "NaN test";
        type Request = TwoSampleRequest;
        type Response = TTestResponse;

        fn validate(_: &Self::Request) -> StatResult<()> {
            Ok(())
        }

        fn compute(_: &Self::Request) -> StatResult<TTestResponse> {
            Ok(TTestResponse {
                test: Self::NAME.to_string(),
                t: f64::INFINITY,
                p: f64::NAN,
                mean1: 1.0,
                mean2: 2.0,
                sig: false,
            })
        }
    }

    #[test]
    fn test_non_finite_result_becomes_computation_error() {
        let err = dispatch::<NotANumber>(json!({"group1": [1], "group2": [2]})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Computation);
        assert_eq!(err.message, "NaN test result is not finite for this input");
    }

    #[test]
    fn test_panic_becomes_computation_error() {
        let err = dispatch::<Exploding>(json!({"group1": [1], "group2": [2]})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Computation);
        assert_eq!(err.message, "Exploding test failed on this input");
    }
}
