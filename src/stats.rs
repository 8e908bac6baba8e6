//! Classical hypothesis tests over plain `f64` slices
//!
//! Every routine validates its input, then computes the test statistic and a
//! two-sided p-value from the matching reference distribution in `statrs`.
//!
//! ## Tests
//!
//! - **Student's t-test**: independent samples, pooled (equal) variance
//! - **Mann-Whitney U**: rank-sum test, exact for small untied samples
//! - **One-way ANOVA**: F-test for equality of k group means
//! - **Chi-square test of independence**: r×c contingency table, Yates
//!   correction for 1 degree of freedom
//! - **Pearson correlation** and **simple linear regression** (OLS)
//!
//! ## Citations
//!
//! - Student (1908). "The Probable Error of a Mean." *Biometrika*, 6(1), 1-25.
//! - Mann, H. B., & Whitney, D. R. (1947). "On a Test of Whether one of Two
//!   Random Variables is Stochastically Larger than the Other."
//!   *Annals of Mathematical Statistics*, 18(1), 50-60.
//! - Yates, F. (1934). "Contingency Tables Involving Small Numbers and the χ²
//!   Test." *Supplement to the JRSS*, 1(2), 217-235.

#![allow(clippy::cast_precision_loss)] // Statistical functions need usize->f64

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};

use crate::error::{StatError, StatResult};

/// Significance level used for the `sig` flag
pub const ALPHA: f64 = 0.05;

/// Mann-Whitney uses the exact null distribution below this group size
const EXACT_MANN_WHITNEY_LIMIT: usize = 8;

/// Keeps the correlation t-statistic finite when |r| == 1
const TINY: f64 = 1.0e-20;

// ============================================================================
// Validation
// ============================================================================

/// Check that a sample is non-empty and finite
///
/// # Errors
///
/// [`StatError::EmptyData`] or [`StatError::NonFinite`]
pub fn validate_sample(field: &str, data: &[f64]) -> StatResult<()> {
    if data.is_empty() {
        return Err(StatError::EmptyData {
            field: field.to_string(),
        });
    }
    if let Some(index) = data.iter().position(|x| !x.is_finite()) {
        return Err(StatError::NonFinite {
            field: field.to_string(),
            index,
        });
    }
    Ok(())
}

/// Check an `x`/`y` pair: both finite, same length, at least two points
///
/// # Errors
///
/// Any validation variant of [`StatError`]
pub fn validate_pair(x: &[f64], y: &[f64]) -> StatResult<()> {
    validate_sample("x", x)?;
    validate_sample("y", y)?;
    if x.len() != y.len() {
        return Err(StatError::LengthMismatch {
            left: "x".to_string(),
            right: "y".to_string(),
            left_len: x.len(),
            right_len: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(StatError::InsufficientData {
            field: "x".to_string(),
            required: 2,
            got: x.len(),
        });
    }
    Ok(())
}

/// Check a list of groups for ANOVA: at least two, each a valid sample
///
/// # Errors
///
/// Any validation variant of [`StatError`]
pub fn validate_groups<G: AsRef<[f64]>>(groups: &[G]) -> StatResult<()> {
    if groups.len() < 2 {
        return Err(StatError::InsufficientData {
            field: "groups".to_string(),
            required: 2,
            got: groups.len(),
        });
    }
    for (i, group) in groups.iter().enumerate() {
        validate_sample(&format!("groups[{i}]"), group.as_ref())?;
    }
    Ok(())
}

/// Check a contingency table: at least 2×2, rectangular, finite, non-negative
///
/// # Errors
///
/// Any validation variant of [`StatError`]
pub fn validate_table<R: AsRef<[f64]>>(observed: &[R]) -> StatResult<()> {
    if observed.len() < 2 {
        return Err(StatError::InsufficientData {
            field: "observed".to_string(),
            required: 2,
            got: observed.len(),
        });
    }
    let cols = observed[0].as_ref().len();
    if cols < 2 {
        return Err(StatError::InsufficientData {
            field: "observed[0]".to_string(),
            required: 2,
            got: cols,
        });
    }
    for (row, values) in observed.iter().enumerate() {
        let values = values.as_ref();
        if values.len() != cols {
            return Err(StatError::RaggedTable {
                row,
                expected: cols,
                got: values.len(),
            });
        }
        for (col, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(StatError::NonFinite {
                    field: format!("observed[{row}]"),
                    index: col,
                });
            }
            if value < 0.0 {
                return Err(StatError::NegativeCount { row, col, value });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Descriptive statistics
// ============================================================================

/// Arithmetic mean (0.0 for an empty slice)
#[must_use]
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Median (0.0 for an empty slice)
#[must_use]
pub fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }

    if n % 2 == 0 {
        sorted[n / 2 - 1] / 2.0 + sorted[n / 2] / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Reject an intermediate quantity that overflowed `f64`
fn ensure_finite(what: &str, value: f64) -> StatResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StatError::degenerate(format!(
            "{what} is not finite; input magnitudes overflow f64"
        )))
    }
}

/// Sum of squared deviations from the mean
fn sum_sq_dev(data: &[f64], center: f64) -> f64 {
    data.iter().map(|x| (x - center).powi(2)).sum()
}

/// Unbiased sample variance (n - 1 denominator); 0.0 below two observations
#[must_use]
pub fn sample_variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    sum_sq_dev(data, mean(data)) / (data.len() - 1) as f64
}

// ============================================================================
// Student's t-test
// ============================================================================

/// Result of an independent two-sample t-test
#[derive(Debug, Clone, PartialEq)]
pub struct TTestResult {
    /// t statistic (positive when group1 has the larger mean)
    pub t_statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Degrees of freedom (n1 + n2 - 2)
    pub df: f64,
    /// Mean of group1
    pub mean1: f64,
    /// Mean of group2
    pub mean2: f64,
}

/// Independent two-sample Student's t-test with pooled variance
///
/// ## Algorithm
///
/// ```text
/// sp² = (SS₁ + SS₂) / (n₁ + n₂ - 2)
/// t   = (x̄₁ - x̄₂) / √(sp² (1/n₁ + 1/n₂))
/// ```
///
/// # Errors
///
/// Validation errors for empty or non-finite groups; [`StatError::Degenerate`]
/// when fewer than three observations exist or both groups are constant.
pub fn ttest_ind(group1: &[f64], group2: &[f64]) -> StatResult<TTestResult> {
    validate_sample("group1", group1)?;
    validate_sample("group2", group2)?;

    let n1 = group1.len() as f64;
    let n2 = group2.len() as f64;
    let df = n1 + n2 - 2.0;
    if df < 1.0 {
        return Err(StatError::degenerate(
            "t-test needs at least 3 observations across both groups",
        ));
    }

    let mean1 = ensure_finite("mean of group1", mean(group1))?;
    let mean2 = ensure_finite("mean of group2", mean(group2))?;
    let pooled_var = ensure_finite(
        "pooled variance",
        (sum_sq_dev(group1, mean1) + sum_sq_dev(group2, mean2)) / df,
    )?;
    if pooled_var <= 0.0 {
        return Err(StatError::degenerate(
            "both groups have zero variance; the t statistic is undefined",
        ));
    }

    let se = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
    let t_statistic = ensure_finite("t statistic", (mean1 - mean2) / se)?;
    let p_value = student_t_two_sided(t_statistic, df)?;

    Ok(TTestResult {
        t_statistic,
        p_value,
        df,
        mean1,
        mean2,
    })
}

fn student_t_two_sided(t: f64, df: f64) -> StatResult<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(StatError::distribution)?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

// ============================================================================
// Mann-Whitney U Test
// ============================================================================

/// How the Mann-Whitney p-value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MannWhitneyMethod {
    /// Exact permutation distribution (small samples without ties)
    Exact,
    /// Normal approximation with tie and continuity correction
    Asymptotic,
}

/// Result of Mann-Whitney U test
#[derive(Debug, Clone, PartialEq)]
pub struct MannWhitneyResult {
    /// U statistic of group1: R₁ - n₁(n₁+1)/2
    pub u_statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Median of group1
    pub median1: f64,
    /// Median of group2
    pub median2: f64,
    /// p-value method
    pub method: MannWhitneyMethod,
}

/// Mann-Whitney U test (Wilcoxon rank-sum) for two independent samples
///
/// ## Algorithm
///
/// 1. Pool and sort both samples
/// 2. Assign ranks, averaging over ties
/// 3. U₁ = R₁ - n₁(n₁+1)/2, U₂ = n₁n₂ - U₁
/// 4. p-value: exact when n₁, n₂ < 8 and no ties, otherwise normal
///    approximation on max(U₁, U₂) with tie correction and a 0.5 continuity
///    correction
///
/// Only ranks enter the computation, so any strictly increasing transform of
/// both samples leaves U and p unchanged.
///
/// # Errors
///
/// Validation errors for empty or non-finite groups; [`StatError::Degenerate`]
/// when every observation is identical.
pub fn mann_whitney_u(group1: &[f64], group2: &[f64]) -> StatResult<MannWhitneyResult> {
    validate_sample("group1", group1)?;
    validate_sample("group2", group2)?;

    let n1 = group1.len();
    let n2 = group2.len();

    let mut combined: Vec<(f64, usize)> = group1
        .iter()
        .map(|&x| (x, 0))
        .chain(group2.iter().map(|&x| (x, 1)))
        .collect();
    combined.sort_by(|a, b| a.0.total_cmp(&b.0));

    let ranks = assign_ranks_with_ties(&combined);
    let r1: f64 = ranks
        .iter()
        .filter(|(_, group)| *group == 0)
        .map(|(rank, _)| rank)
        .sum();

    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u_max = u1.max(u2);

    let tie_term = tie_term(&combined);
    let (p_value, method) =
        if n1 < EXACT_MANN_WHITNEY_LIMIT && n2 < EXACT_MANN_WHITNEY_LIMIT && tie_term == 0.0 {
            (exact_u_p_value(n1, n2, u_max), MannWhitneyMethod::Exact)
        } else {
            (
                asymptotic_u_p_value(n1, n2, u_max, tie_term)?,
                MannWhitneyMethod::Asymptotic,
            )
        };

    Ok(MannWhitneyResult {
        u_statistic: u1,
        p_value,
        median1: median(group1),
        median2: median(group2),
        method,
    })
}

/// Assign ranks to sorted values, handling ties by averaging
fn assign_ranks_with_ties(sorted: &[(f64, usize)]) -> Vec<(f64, usize)> {
    let mut ranks = Vec::with_capacity(sorted.len());
    let mut i = 0;

    while i < sorted.len() {
        let value = sorted[i].0;
        let mut j = i;

        while j < sorted.len() && sorted[j].0 == value {
            j += 1;
        }

        // Ranks are 1-indexed: positions i..j get ranks (i+1)..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;

        for item in sorted.iter().take(j).skip(i) {
            ranks.push((avg_rank, item.1));
        }

        i = j;
    }

    ranks
}

/// Σ(t³ - t) over tie groups of a sorted sample
fn tie_term(sorted: &[(f64, usize)]) -> f64 {
    let mut term = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j].0 == sorted[i].0 {
            j += 1;
        }
        let t = (j - i) as f64;
        term += t.powi(3) - t;
        i = j;
    }
    term
}

/// Null distribution of U as counts over all C(n1+n2, n1) arrangements
///
/// `freq(i, j)[u] = freq(i-1, j)[u-j] + freq(i, j-1)[u]`: the largest
/// observation either belongs to group1 (beating all j of group2) or to group2.
fn exact_u_counts(n1: usize, n2: usize) -> Vec<f64> {
    let mut table: Vec<Vec<Vec<f64>>> = vec![vec![Vec::new(); n2 + 1]; n1 + 1];
    for i in 0..=n1 {
        for j in 0..=n2 {
            if i == 0 || j == 0 {
                table[i][j] = vec![1.0];
                continue;
            }
            let mut freq = vec![0.0; i * j + 1];
            for (u, count) in table[i][j - 1].iter().enumerate() {
                freq[u] += count;
            }
            for (u, count) in table[i - 1][j].iter().enumerate() {
                freq[u + j] += count;
            }
            table[i][j] = freq;
        }
    }
    std::mem::take(&mut table[n1][n2])
}

fn exact_u_p_value(n1: usize, n2: usize, u_max: f64) -> f64 {
    let counts = exact_u_counts(n1, n2);
    let total: f64 = counts.iter().sum();
    // u_max is an integer when there are no ties
    let start = u_max.round() as usize;
    let upper: f64 = counts.iter().skip(start).sum();
    (2.0 * upper / total).min(1.0)
}

fn asymptotic_u_p_value(n1: usize, n2: usize, u_max: f64, tie_term: f64) -> StatResult<f64> {
    let n = (n1 + n2) as f64;
    let n1n2 = (n1 * n2) as f64;
    let mu = n1n2 / 2.0;
    let variance = n1n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance <= 0.0 {
        return Err(StatError::degenerate(
            "all observations are identical; the rank test is undefined",
        ));
    }

    let z = (u_max - mu - 0.5) / variance.sqrt();
    let normal = Normal::new(0.0, 1.0).map_err(StatError::distribution)?;
    Ok((2.0 * normal.sf(z)).min(1.0))
}

// ============================================================================
// One-way ANOVA
// ============================================================================

/// Result of a one-way ANOVA
#[derive(Debug, Clone, PartialEq)]
pub struct AnovaResult {
    /// F statistic (MS_between / MS_within)
    pub f_statistic: f64,
    /// p-value from F(k-1, N-k)
    pub p_value: f64,
    /// Between-groups degrees of freedom
    pub df_between: f64,
    /// Within-groups degrees of freedom
    pub df_within: f64,
    /// Mean of every group, in input order
    pub means: Vec<f64>,
}

/// One-way ANOVA F-test for equality of group means
///
/// # Errors
///
/// Validation errors for fewer than two groups or invalid samples;
/// [`StatError::Degenerate`] when there are no within-group degrees of freedom
/// or every group is constant.
pub fn f_oneway<G: AsRef<[f64]>>(groups: &[G]) -> StatResult<AnovaResult> {
    validate_groups(groups)?;

    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.as_ref().len()).sum();
    if total <= k {
        return Err(StatError::degenerate(
            "ANOVA needs more observations than groups",
        ));
    }

    let means = groups
        .iter()
        .enumerate()
        .map(|(i, g)| ensure_finite(&format!("mean of group {i}"), mean(g.as_ref())))
        .collect::<StatResult<Vec<f64>>>()?;
    let grand_mean = ensure_finite(
        "grand mean",
        groups
            .iter()
            .flat_map(|g| g.as_ref().iter())
            .sum::<f64>()
            / total as f64,
    )?;

    let ss_between = ensure_finite(
        "between-group sum of squares",
        groups
            .iter()
            .zip(&means)
            .map(|(g, m)| g.as_ref().len() as f64 * (m - grand_mean).powi(2))
            .sum(),
    )?;
    let ss_within = ensure_finite(
        "within-group sum of squares",
        groups
            .iter()
            .zip(&means)
            .map(|(g, &m)| sum_sq_dev(g.as_ref(), m))
            .sum(),
    )?;

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let ms_within = ss_within / df_within;
    if ms_within <= 0.0 {
        return Err(StatError::degenerate(
            "every group has zero within-group variance; the F statistic is undefined",
        ));
    }

    let f_statistic = ensure_finite("F statistic", (ss_between / df_between) / ms_within)?;
    let dist = FisherSnedecor::new(df_between, df_within).map_err(StatError::distribution)?;
    let p_value = dist.sf(f_statistic);

    Ok(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
        means,
    })
}

// ============================================================================
// Chi-square test of independence
// ============================================================================

/// Result of a chi-square test of independence
#[derive(Debug, Clone, PartialEq)]
pub struct Chi2Result {
    /// Chi-square statistic (Yates-corrected when dof == 1)
    pub statistic: f64,
    /// p-value from χ²(dof)
    pub p_value: f64,
    /// (rows - 1) × (cols - 1)
    pub dof: usize,
    /// Expected frequencies under independence
    pub expected: Vec<Vec<f64>>,
}

/// Chi-square test of independence on an r×c contingency table
///
/// Expected frequencies are `row_total × col_total / grand_total`. For a single
/// degree of freedom each |O - E| is shrunk by min(0.5, |O - E|) (Yates).
///
/// # Errors
///
/// Validation errors for malformed tables; [`StatError::Degenerate`] when a row
/// or column sums to zero.
pub fn chi2_contingency<R: AsRef<[f64]>>(observed: &[R]) -> StatResult<Chi2Result> {
    validate_table(observed)?;

    let rows = observed.len();
    let cols = observed[0].as_ref().len();

    let row_totals: Vec<f64> = observed.iter().map(|r| r.as_ref().iter().sum()).collect();
    let col_totals: Vec<f64> = (0..cols)
        .map(|c| observed.iter().map(|r| r.as_ref()[c]).sum())
        .collect();
    let grand_total = ensure_finite("grand total", row_totals.iter().sum())?;
    for (row, &total) in row_totals.iter().enumerate() {
        ensure_finite(&format!("total of row {row}"), total)?;
    }
    for (col, &total) in col_totals.iter().enumerate() {
        ensure_finite(&format!("total of column {col}"), total)?;
    }

    if let Some(row) = row_totals.iter().position(|&t| t == 0.0) {
        return Err(StatError::degenerate(format!(
            "row {row} sums to zero; expected frequencies are undefined"
        )));
    }
    if let Some(col) = col_totals.iter().position(|&t| t == 0.0) {
        return Err(StatError::degenerate(format!(
            "column {col} sums to zero; expected frequencies are undefined"
        )));
    }

    let expected: Vec<Vec<f64>> = row_totals
        .iter()
        .map(|rt| col_totals.iter().map(|ct| rt * ct / grand_total).collect())
        .collect();

    let dof = (rows - 1) * (cols - 1);
    let yates = dof == 1;

    if let Some(e) = expected.iter().flatten().find(|e| !e.is_finite()) {
        return Err(StatError::degenerate(format!(
            "expected frequency {e} is not finite; input magnitudes overflow f64"
        )));
    }

    let statistic: f64 = observed
        .iter()
        .zip(&expected)
        .flat_map(|(o_row, e_row)| o_row.as_ref().iter().zip(e_row))
        .map(|(&o, &e)| {
            let mut diff = (o - e).abs();
            if yates {
                diff -= diff.min(0.5);
            }
            diff * diff / e
        })
        .sum();
    let statistic = ensure_finite("chi-square statistic", statistic)?;

    let dist = ChiSquared::new(dof as f64).map_err(StatError::distribution)?;
    let p_value = dist.sf(statistic);

    Ok(Chi2Result {
        statistic,
        p_value,
        dof,
        expected,
    })
}

// ============================================================================
// Correlation and regression
// ============================================================================

/// Centered sums of squares and cross-products of an x/y pair
struct Moments {
    n: f64,
    mean_x: f64,
    mean_y: f64,
    ss_xx: f64,
    ss_yy: f64,
    ss_xy: f64,
}

impl Moments {
    fn new(x: &[f64], y: &[f64]) -> StatResult<Self> {
        let mean_x = ensure_finite("mean of x", mean(x))?;
        let mean_y = ensure_finite("mean of y", mean(y))?;
        let (ss_xx, ss_yy, ss_xy) =
            x.iter()
                .zip(y)
                .fold((0.0, 0.0, 0.0), |(xx, yy, xy), (&xi, &yi)| {
                    let dx = xi - mean_x;
                    let dy = yi - mean_y;
                    (xx + dx * dx, yy + dy * dy, xy + dx * dy)
                });
        Ok(Self {
            n: x.len() as f64,
            mean_x,
            mean_y,
            ss_xx: ensure_finite("sum of squares of x", ss_xx)?,
            ss_yy: ensure_finite("sum of squares of y", ss_yy)?,
            ss_xy: ensure_finite("cross-product of x and y", ss_xy)?,
        })
    }

    fn r(&self) -> f64 {
        let den = self.ss_xx.sqrt() * self.ss_yy.sqrt();
        if den == 0.0 {
            0.0
        } else {
            (self.ss_xy / den).clamp(-1.0, 1.0)
        }
    }

    fn slope(&self) -> StatResult<f64> {
        ensure_finite("slope", self.ss_xy / self.ss_xx)
    }

    fn intercept(&self) -> StatResult<f64> {
        ensure_finite("intercept", self.mean_y - self.slope()? * self.mean_x)
    }
}

/// Two-sided p-value for H₀: ρ = 0, with n - 2 degrees of freedom
fn correlation_p_value(r: f64, n: f64) -> StatResult<f64> {
    let df = n - 2.0;
    let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
    student_t_two_sided(t, df)
}

/// Result of a Pearson correlation test
#[derive(Debug, Clone, PartialEq)]
pub struct PearsonResult {
    /// Correlation coefficient in [-1, 1]
    pub r: f64,
    /// Two-sided p-value for H₀: ρ = 0
    pub p_value: f64,
    /// OLS slope of y on x
    pub slope: f64,
    /// OLS intercept of y on x
    pub intercept: f64,
}

/// Pearson product-moment correlation, plus the OLS line of y on x
///
/// With exactly two points the coefficient is ±1 and carries no evidence, so
/// the p-value is 1.
///
/// # Errors
///
/// Validation errors for mismatched or short inputs; [`StatError::Degenerate`]
/// when x or y is constant.
pub fn pearsonr(x: &[f64], y: &[f64]) -> StatResult<PearsonResult> {
    validate_pair(x, y)?;

    let m = Moments::new(x, y)?;
    if m.ss_xx == 0.0 {
        return Err(StatError::degenerate(
            "x is constant; the correlation coefficient is undefined",
        ));
    }
    if m.ss_yy == 0.0 {
        return Err(StatError::degenerate(
            "y is constant; the correlation coefficient is undefined",
        ));
    }

    let r = m.r();
    let p_value = if x.len() == 2 {
        1.0
    } else {
        correlation_p_value(r, m.n)?
    };

    Ok(PearsonResult {
        r,
        p_value,
        slope: m.slope()?,
        intercept: m.intercept()?,
    })
}

/// Result of a simple linear regression
#[derive(Debug, Clone, PartialEq)]
pub struct LinregressResult {
    /// Slope
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub r: f64,
    /// Two-sided p-value for H₀: slope = 0
    pub p_value: f64,
    /// Standard error of the slope
    pub stderr: f64,
    /// Standard error of the intercept
    pub intercept_stderr: f64,
}

/// Ordinary least squares fit of `y = slope·x + intercept`
///
/// ## Formulas
///
/// ```text
/// slope     = SS_xy / SS_xx
/// intercept = ȳ - slope·x̄
/// SE(slope) = √((1 - r²) · SS_yy / SS_xx / (n - 2))
/// SE(b₀)    = SE(slope) · √(SS_xx/n + x̄²)
/// ```
///
/// A constant y gives r = 0 and a flat line rather than an error.
///
/// # Errors
///
/// Validation errors for mismatched or short inputs; [`StatError::Degenerate`]
/// when x is constant (singular design).
pub fn linregress(x: &[f64], y: &[f64]) -> StatResult<LinregressResult> {
    validate_pair(x, y)?;

    let m = Moments::new(x, y)?;
    if m.ss_xx == 0.0 {
        return Err(StatError::degenerate(
            "all x values are identical; the regression slope is undefined",
        ));
    }

    let r = m.r();
    let slope = m.slope()?;
    let intercept = m.intercept()?;

    let (p_value, stderr, intercept_stderr) = if x.len() == 2 {
        let p = if y[0] == y[1] { 1.0 } else { 0.0 };
        (p, 0.0, 0.0)
    } else {
        let df = m.n - 2.0;
        let p = correlation_p_value(r, m.n)?;
        let stderr = ensure_finite(
            "slope standard error",
            ((1.0 - r * r).max(0.0) * m.ss_yy / m.ss_xx / df).sqrt(),
        )?;
        let intercept_stderr = ensure_finite(
            "intercept standard error",
            stderr * (m.ss_xx / m.n + m.mean_x * m.mean_x).sqrt(),
        )?;
        (p, stderr, intercept_stderr)
    };

    Ok(LinregressResult {
        slope,
        intercept,
        r,
        p_value,
        stderr,
        intercept_stderr,
    })
}
