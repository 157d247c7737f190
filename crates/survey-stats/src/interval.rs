//! Normal-approximation confidence intervals
//!
//! Both estimators assume a normal sampling distribution of the estimate
//! (large-sample approximation) and use the two-sided standard-normal
//! critical value for the requested confidence level. No Student-t
//! correction is applied to the mean interval.
//!
//! The intervals are not restricted to any domain: a proportion interval
//! close to 0 or 1 may extend below 0 or above 1. That is a property of the
//! normal approximation and is reported as computed.

use crate::{
    descriptive::{mean, sample_variance},
    distribution::{DistributionError, z_critical},
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum IntervalError {
    #[display("Insufficient sample: {len} observation(s), at least 2 required")]
    #[from(ignore)]
    InsufficientSample { len: usize },
    #[display("Empty sample: proportion interval requires n > 0")]
    EmptySample,
    #[display("Invalid proportion {proportion}: must lie within [0, 1]")]
    #[from(ignore)]
    InvalidProportion { proportion: f64 },
    #[display("{_0}")]
    Distribution(DistributionError),
}

/// A closed confidence interval `[lower, upper]` at a confidence level.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub confidence: f64,
}

impl ConfidenceInterval {
    fn around(estimate: f64, half_width: f64, confidence: f64) -> Self {
        Self {
            lower: estimate - half_width,
            upper: estimate + half_width,
            confidence,
        }
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        f64::midpoint(self.lower, self.upper)
    }

    #[must_use]
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Confidence interval for a population mean.
///
/// Uses the sample mean `m`, the Bessel-corrected sample standard deviation
/// `s` and the standard error `s / sqrt(n)`: the interval is `m ± z * se`.
///
/// # Errors
///
/// * [`IntervalError::InsufficientSample`] when fewer than two values are given
/// * [`IntervalError::Distribution`] when `confidence` is not in `(0, 1)`
///
/// # Examples
///
/// ```
/// # use survey_stats::interval::mean_interval;
/// let ci = mean_interval(&[10.0, 12.0, 14.0, 16.0], 0.95).unwrap();
/// assert!((ci.midpoint() - 13.0).abs() < 1e-12);
/// assert!(ci.lower < 13.0 && 13.0 < ci.upper);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn mean_interval(values: &[f64], confidence: f64) -> Result<ConfidenceInterval, IntervalError> {
    let (Some(mean), Some(variance)) = (mean(values), sample_variance(values)) else {
        return Err(IntervalError::InsufficientSample { len: values.len() });
    };
    let z = z_critical(confidence)?;
    let se = variance.sqrt() / (values.len() as f64).sqrt();
    Ok(ConfidenceInterval::around(mean, z * se, confidence))
}

/// Confidence interval for a population proportion.
///
/// `proportion` is the already-computed sample proportion and `n` the sample
/// size. The standard error is `sqrt(p * (1 - p) / n)` and the interval is
/// `p ± z * se`, without clamping to `[0, 1]`.
///
/// # Examples
///
/// ```
/// # use survey_stats::interval::proportion_interval;
/// let ci = proportion_interval(0.5, 1000, 0.98).unwrap();
/// assert!((ci.half_width() - 0.036_78).abs() < 1e-4);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn proportion_interval(
    proportion: f64,
    n: usize,
    confidence: f64,
) -> Result<ConfidenceInterval, IntervalError> {
    if n == 0 {
        return Err(IntervalError::EmptySample);
    }
    if !(0.0..=1.0).contains(&proportion) {
        return Err(IntervalError::InvalidProportion { proportion });
    }
    let z = z_critical(confidence)?;
    let se = (proportion * (1.0 - proportion) / n as f64).sqrt();
    Ok(ConfidenceInterval::around(proportion, z * se, confidence))
}
