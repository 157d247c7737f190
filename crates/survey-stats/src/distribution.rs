//! Reference distributions used by the inferential procedures
//!
//! Thin wrappers over [`statrs`] that turn parameter failures into
//! [`DistributionError`] and expose exactly the quantities the interval
//! estimators and hypothesis tests need: two-sided normal critical values,
//! chi-square and Student-t tail probabilities, and binomial probability
//! tables.

use statrs::distribution::{
    Binomial, ChiSquared, ContinuousCDF, Discrete, DiscreteCDF, Normal, StudentsT,
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DistributionError {
    #[display("Invalid confidence level {confidence}: must lie strictly between 0 and 1")]
    InvalidConfidence { confidence: f64 },
    #[display("Invalid {distribution} distribution parameters: {reason}")]
    InvalidParameters {
        distribution: &'static str,
        reason: String,
    },
}

impl DistributionError {
    fn invalid<E>(distribution: &'static str, err: &E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::InvalidParameters {
            distribution,
            reason: err.to_string(),
        }
    }
}

/// Two-sided standard-normal critical value for a confidence level.
///
/// Returns `z` such that `P(-z <= Z <= z) = confidence` for `Z ~ N(0, 1)`.
///
/// # Examples
///
/// ```
/// # use survey_stats::distribution::z_critical;
/// let z = z_critical(0.95).unwrap();
/// assert!((z - 1.959_964).abs() < 1e-6);
/// ```
pub fn z_critical(confidence: f64) -> Result<f64, DistributionError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(DistributionError::InvalidConfidence { confidence });
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| DistributionError::invalid("normal", &e))?;
    Ok(normal.inverse_cdf(0.5 + confidence / 2.0))
}

/// Upper-tail probability `P(X >= statistic)` for `X ~ χ²(df)`.
pub fn chi_squared_sf(statistic: f64, df: f64) -> Result<f64, DistributionError> {
    let dist = ChiSquared::new(df).map_err(|e| DistributionError::invalid("chi-squared", &e))?;
    Ok(dist.sf(statistic).clamp(0.0, 1.0))
}

/// Two-sided p-value `P(|T| >= |t|)` for `T ~ t(df)`.
pub fn students_t_two_sided(t: f64, df: f64) -> Result<f64, DistributionError> {
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| DistributionError::invalid("Student's t", &e))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

/// Probability mass and cumulative probabilities of `Binomial(n, p)` for
/// every outcome `k = 0..=n`.
///
/// # Examples
///
/// ```
/// # use survey_stats::distribution::BinomialTable;
/// let table = BinomialTable::new(10, 0.25).unwrap();
/// assert_eq!(table.rows.len(), 11);
/// assert!((table.rows[10].cdf - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct BinomialTable {
    pub trials: u64,
    pub probability: f64,
    pub rows: Vec<BinomialRow>,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BinomialRow {
    pub successes: u64,
    pub pmf: f64,
    pub cdf: f64,
}

impl BinomialTable {
    pub fn new(trials: u64, probability: f64) -> Result<Self, DistributionError> {
        let dist = Binomial::new(probability, trials)
            .map_err(|e| DistributionError::invalid("binomial", &e))?;
        let rows = (0..=trials)
            .map(|k| BinomialRow {
                successes: k,
                pmf: dist.pmf(k),
                cdf: dist.cdf(k),
            })
            .collect();
        Ok(Self {
            trials,
            probability,
            rows,
        })
    }
}
