use crate::percentiles::compute_percentile;

/// Descriptive statistics summarizing a dataset.
///
/// This structure contains the usual summary of a numeric column: count,
/// location, dispersion, quartiles and shape. Measures that need more
/// observations than the dataset has are `None` instead of a degenerate value.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DescriptiveStats {
    /// The number of observations.
    pub count: usize,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The sample standard deviation (`n - 1` divisor). `None` when `count < 2`.
    pub std_dev: Option<f64>,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The 25th percentile.
    pub p25: f64,
    /// The median value of the dataset.
    pub median: f64,
    /// The 75th percentile.
    pub p75: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// Adjusted Fisher-Pearson sample skewness. `None` when `count < 3`.
    pub skewness: Option<f64>,
    /// Bias-corrected excess kurtosis. `None` when `count < 4`.
    pub kurtosis: Option<f64>,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty or holds a NaN or infinite value
    ///
    /// # Examples
    ///
    /// ```
    /// # use survey_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// Returns `None` if the slice is empty or holds a non-finite value.
    ///
    /// # Panics
    ///
    /// Panics if the finite `sorted_values` are not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        if !sorted_values.iter().all(|v| v.is_finite()) {
            return None;
        }
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let mean = mean(sorted_values)?;
        let std_dev = sample_variance(sorted_values).map(f64::sqrt);

        Some(Self {
            count: sorted_values.len(),
            mean,
            std_dev,
            min,
            p25: compute_percentile(sorted_values, 25.0),
            median: compute_percentile(sorted_values, 50.0),
            p75: compute_percentile(sorted_values, 75.0),
            max,
            skewness: skewness(sorted_values),
            kurtosis: kurtosis(sorted_values),
        })
    }
}

/// Arithmetic mean, or `None` for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with Bessel's correction (`n - 1` divisor).
///
/// Returns `None` when fewer than two values are given, since the variance
/// of a single observation is undefined rather than zero.
///
/// # Examples
///
/// ```
/// # use survey_stats::descriptive::sample_variance;
/// assert_eq!(sample_variance(&[1.0, 2.0, 3.0, 4.0]), Some(5.0 / 3.0));
/// assert_eq!(sample_variance(&[1.0]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Biased central moments `(m2, m3, m4)`.
#[expect(clippy::cast_precision_loss)]
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    let mean = mean(values)?;
    let n = values.len() as f64;
    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), v| {
        let d = v - mean;
        (m2 + d * d, m3 + d.powi(3), m4 + d.powi(4))
    });
    Some((m2 / n, m3 / n, m4 / n))
}

#[expect(clippy::cast_precision_loss)]
fn skewness(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let (m2, m3, _) = central_moments(values)?;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let n = values.len() as f64;
    Some((n * (n - 1.0)).sqrt() / (n - 2.0) * m3 / m2.powf(1.5))
}

#[expect(clippy::cast_precision_loss)]
fn kurtosis(values: &[f64]) -> Option<f64> {
    if values.len() < 4 {
        return None;
    }
    let (m2, _, m4) = central_moments(values)?;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let n = values.len() as f64;
    let g2 = m4 / (m2 * m2);
    Some((n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 - 3.0 * (n - 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_none() {
        assert!(DescriptiveStats::new([]).is_none());
    }

    #[test]
    fn test_non_finite_is_none() {
        assert!(DescriptiveStats::new([1.0, f64::NAN, 2.0]).is_none());
        assert!(DescriptiveStats::new([f64::INFINITY, 2.0]).is_none());
        assert!(DescriptiveStats::from_sorted(&[1.0, 2.0, f64::NAN]).is_none());
    }

    #[test]
    fn test_single_value_has_no_dispersion() {
        let stats = DescriptiveStats::new([7.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.skewness, None);
        assert_eq!(stats.kurtosis, None);
    }

    #[test]
    fn test_symmetric_data_has_zero_skew() {
        let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(stats.skewness.unwrap().abs() < 1e-12);
        assert!((stats.std_dev.unwrap() - 2.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.p25, 2.0);
        assert_eq!(stats.p75, 4.0);
    }

    #[test]
    fn test_right_tail_has_positive_skew() {
        let stats = DescriptiveStats::new([1.0, 1.0, 1.0, 2.0, 2.0, 10.0]).unwrap();
        assert!(stats.skewness.unwrap() > 0.0);
    }

    #[test]
    fn test_uniform_kurtosis_matches_reference() {
        // Excess kurtosis of 1..=5 with bias correction is -1.2
        let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((stats.kurtosis.unwrap() + 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_constant_data_has_zero_shape() {
        let stats = DescriptiveStats::new([3.0; 10]).unwrap();
        assert_eq!(stats.std_dev, Some(0.0));
        assert_eq!(stats.skewness, Some(0.0));
        assert_eq!(stats.kurtosis, Some(0.0));
    }
}
