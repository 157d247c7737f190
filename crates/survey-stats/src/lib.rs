//! Statistical routines for the survey inference toolkit.
//!
//! This crate works on plain `f64` slices and category labels and knows
//! nothing about datasets or schemas. It provides:
//!
//! - **Descriptive statistics**: count, mean, sample standard deviation, quartiles, skewness, kurtosis
//! - **Percentiles**: linearly interpolated quartiles used by the descriptive summary
//! - **Reference distributions**: normal critical values, chi-square and Student-t tail
//!   probabilities, binomial probability tables
//! - **Confidence intervals**: normal-approximation intervals for a mean and a proportion
//! - **Two-sample tests**: Bartlett's variance test and the pooled-variance t-test
//! - **Contingency tables**: observed/expected counts and the chi-square test of independence
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Linearly interpolated percentile of sorted data
//! - [`distribution`]: Critical values and tail probabilities
//! - [`interval`]: Confidence intervals
//! - [`hypothesis`]: Test results shared by the tests below
//! - [`two_sample`]: Two-sample variance and mean comparisons
//! - [`contingency`]: Cross-tabulation and independence testing
//!
//! # Examples
//!
//! ## Confidence interval for a mean
//!
//! ```
//! use survey_stats::interval::mean_interval;
//!
//! let grades = [10.0, 12.0, 11.0, 15.0, 9.0, 13.0];
//! let ci = mean_interval(&grades, 0.95).unwrap();
//! assert!(ci.lower < 11.666 && 11.667 < ci.upper);
//! ```
//!
//! ## Comparing two groups
//!
//! ```
//! use survey_stats::two_sample::{bartlett, pooled_t_test};
//!
//! let low = [12.0, 14.0, 11.0, 13.0, 15.0];
//! let high = [9.0, 10.0, 12.0, 8.0, 11.0];
//! let variances = bartlett(&low, &high).unwrap();
//! let means = pooled_t_test(&low, &high).unwrap();
//! assert!(variances.p_value > 0.05);
//! assert!(means.statistic > 0.0);
//! ```
//!
//! ## Testing independence
//!
//! ```
//! use survey_stats::contingency::ContingencyTable;
//!
//! let table = ContingencyTable::from_pairs([("Low", "F"), ("High", "M"), ("Low", "M"), ("High", "F")]);
//! let chi2 = table.chi_square().unwrap();
//! assert_eq!(chi2.test.degrees_of_freedom, Some(1));
//! ```

pub mod contingency;
pub mod descriptive;
pub mod distribution;
pub mod hypothesis;
pub mod interval;
pub mod percentiles;
pub mod two_sample;
