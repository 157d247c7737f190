//! Two-sample comparisons
//!
//! Variance homogeneity (Bartlett's test) and equality of means under the
//! equal-variance assumption (pooled-variance Student t-test). Groups are
//! identified by position: `0` for the first sample, `1` for the second.

use crate::{
    descriptive::{mean, sample_variance},
    distribution::{DistributionError, chi_squared_sf, students_t_two_sided},
    hypothesis::TestResult,
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TwoSampleError {
    #[display("Sample {group} is empty")]
    #[from(ignore)]
    EmptyGroup { group: usize },
    #[display("Sample {group} has {len} observation(s), at least 2 required")]
    #[from(ignore)]
    InsufficientGroupSize { group: usize, len: usize },
    #[display("Sample {group} has zero variance")]
    #[from(ignore)]
    ZeroVariance { group: usize },
    #[display("{_0}")]
    Distribution(DistributionError),
}

/// Size, mean and sample variance of one group.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GroupSummary {
    pub len: usize,
    pub mean: f64,
    pub variance: f64,
}

impl GroupSummary {
    /// Summarizes one sample, rejecting empty samples and samples with a single
    /// observation.
    pub fn from_values(group: usize, values: &[f64]) -> Result<Self, TwoSampleError> {
        let Some(mean) = mean(values) else {
            return Err(TwoSampleError::EmptyGroup { group });
        };
        let Some(variance) = sample_variance(values) else {
            return Err(TwoSampleError::InsufficientGroupSize {
                group,
                len: values.len(),
            });
        };
        Ok(Self {
            len: values.len(),
            mean,
            variance,
        })
    }
}

fn summarize_pair(
    first: &[f64],
    second: &[f64],
) -> Result<(GroupSummary, GroupSummary), TwoSampleError> {
    // Empty groups are reported before undersized ones, whichever side they are on.
    for (group, values) in [first, second].into_iter().enumerate() {
        if values.is_empty() {
            return Err(TwoSampleError::EmptyGroup { group });
        }
    }
    Ok((
        GroupSummary::from_values(0, first)?,
        GroupSummary::from_values(1, second)?,
    ))
}

/// Bartlett's test for equal variances of two samples.
///
/// The statistic compares the log of the pooled variance with the weighted
/// sum of the log per-group variances, scaled by Bartlett's correction factor,
/// and is referred to a chi-square distribution with one degree of freedom.
///
/// # Examples
///
/// ```
/// # use survey_stats::two_sample::bartlett;
/// let result = bartlett(&[1.0, 2.0, 3.0, 4.0], &[11.0, 12.0, 13.0, 14.0]).unwrap();
/// assert!(result.statistic.abs() < 1e-9);
/// assert!(result.p_value > 0.99);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn bartlett(first: &[f64], second: &[f64]) -> Result<TestResult, TwoSampleError> {
    let (a, b) = summarize_pair(first, second)?;
    for (group, summary) in [a, b].iter().enumerate() {
        if summary.variance <= 0.0 {
            return Err(TwoSampleError::ZeroVariance { group });
        }
    }

    let k = 2.0;
    let groups = [a, b];
    let total = (a.len + b.len) as f64;
    let dof = |g: &GroupSummary| (g.len - 1) as f64;

    let pooled = groups.iter().map(|g| dof(g) * g.variance).sum::<f64>() / (total - k);
    let numerator = (total - k) * pooled.ln()
        - groups
            .iter()
            .map(|g| dof(g) * g.variance.ln())
            .sum::<f64>();
    let correction = 1.0
        + (groups.iter().map(|g| 1.0 / dof(g)).sum::<f64>() - 1.0 / (total - k))
            / (3.0 * (k - 1.0));

    let statistic = numerator / correction;
    let p_value = chi_squared_sf(statistic, k - 1.0)?;
    Ok(TestResult::new(statistic, p_value))
}

/// Two-sample t-test for equal means assuming equal variances.
///
/// The pooled variance `((n1-1)s1² + (n2-1)s2²) / (n1+n2-2)` gives the
/// standard error of the mean difference; the statistic is referred to a
/// Student t distribution with `n1 + n2 - 2` degrees of freedom and the
/// p-value is two-sided.
///
/// # Examples
///
/// ```
/// # use survey_stats::two_sample::pooled_t_test;
/// let same = [3.0, 4.0, 5.0, 6.0];
/// let result = pooled_t_test(&same, &same).unwrap();
/// assert_eq!(result.statistic, 0.0);
/// assert!((result.p_value - 1.0).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn pooled_t_test(first: &[f64], second: &[f64]) -> Result<TestResult, TwoSampleError> {
    let (a, b) = summarize_pair(first, second)?;
    let dof = (a.len + b.len - 2) as f64;
    let pooled = ((a.len - 1) as f64 * a.variance + (b.len - 1) as f64 * b.variance) / dof;
    if pooled <= 0.0 {
        return Err(TwoSampleError::ZeroVariance { group: 0 });
    }

    let se = (pooled * (1.0 / a.len as f64 + 1.0 / b.len as f64)).sqrt();
    let statistic = (a.mean - b.mean) / se;
    let p_value = students_t_two_sided(statistic, dof)?;
    Ok(TestResult::new(statistic, p_value))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_distr::{Distribution as _, Normal};
    use rand_pcg::Pcg64;

    use super::*;

    fn normal_sample(rng: &mut Pcg64, mean: f64, std_dev: f64, len: usize) -> Vec<f64> {
        let dist = Normal::new(mean, std_dev).unwrap();
        (0..len).map(|_| dist.sample(rng)).collect()
    }

    #[test]
    fn test_bartlett_identical_variances() {
        let low = [1.0, 2.0, 3.0, 4.0, 5.0];
        let high = [11.0, 12.0, 13.0, 14.0, 15.0];
        let result = bartlett(&low, &high).unwrap();

        assert!(result.statistic.abs() < 1e-9);
        assert!((result.p_value - 1.0).abs() < 1e-6);
        assert_eq!(result.degrees_of_freedom, None);
    }

    #[test]
    fn test_bartlett_reference_value() {
        let result = bartlett(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        let pooled: f64 = (4.0 * 2.5 + 4.0 * 10.0) / 8.0;
        let numerator = 8.0 * pooled.ln() - 4.0 * 2.5_f64.ln() - 4.0 * 10.0_f64.ln();
        let correction = 1.0 + (0.25 + 0.25 - 0.125) / 3.0;

        assert!((result.statistic - numerator / correction).abs() < 1e-12);
        assert!((result.statistic - 1.586_80).abs() < 1e-4);
        assert!((result.p_value - 0.207_78).abs() < 1e-4);
    }

    #[test]
    fn test_bartlett_detects_different_spread() {
        let mut rng = Pcg64::seed_from_u64(7);
        let narrow = normal_sample(&mut rng, 10.0, 1.0, 200);
        let wide = normal_sample(&mut rng, 10.0, 5.0, 200);

        let result = bartlett(&narrow, &wide).unwrap();
        assert!(result.statistic > 0.0);
        assert!(result.is_significant(0.001));
    }

    #[test]
    fn test_bartlett_rejects_constant_group() {
        assert_eq!(
            bartlett(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]),
            Err(TwoSampleError::ZeroVariance { group: 1 })
        );
    }

    #[test]
    fn test_pooled_t_test_reference_value() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let result = pooled_t_test(&a, &b).unwrap();

        // pooled variance 2.5, se = sqrt(2.5 * 0.4) = 1, difference -2
        assert!((result.statistic + 2.0).abs() < 1e-12);
        assert!((result.p_value - 0.080_516).abs() < 1e-4);
    }

    #[test]
    fn test_pooled_t_test_identical_groups() {
        let mut rng = Pcg64::seed_from_u64(11);
        let sample = normal_sample(&mut rng, 12.0, 3.0, 50);
        let result = pooled_t_test(&sample, &sample).unwrap();

        assert!(result.statistic.abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pooled_t_test_detects_shifted_mean() {
        let mut rng = Pcg64::seed_from_u64(13);
        let low = normal_sample(&mut rng, 10.0, 2.0, 100);
        let high = normal_sample(&mut rng, 12.0, 2.0, 100);

        let result = pooled_t_test(&low, &high).unwrap();
        assert!(result.statistic < 0.0);
        assert!(result.is_significant(0.001));
    }

    #[test]
    fn test_empty_group_takes_precedence() {
        assert_eq!(
            pooled_t_test(&[1.0], &[]),
            Err(TwoSampleError::EmptyGroup { group: 1 })
        );
        assert_eq!(
            bartlett(&[], &[1.0, 2.0]),
            Err(TwoSampleError::EmptyGroup { group: 0 })
        );
    }

    #[test]
    fn test_single_observation_group() {
        assert_eq!(
            pooled_t_test(&[1.0, 2.0], &[3.0]),
            Err(TwoSampleError::InsufficientGroupSize { group: 1, len: 1 })
        );
    }
}
