//! Dataset-level inference for survey data
//!
//! This crate takes an already-parsed table of survey responses, cleans it
//! and runs the inferential procedures from [`survey_stats`] on its columns.
//! It never reads files; loading is left to the caller.
//!
//! # Overview
//!
//! The pipeline runs leaves first:
//!
//! 1. **Schema and records** ([`dataset::Dataset`]): typed numeric and categorical columns
//! 2. **Rare-level filtering** ([`level_filter::LevelFilter`]): drop rows carrying infrequent
//!    category levels, one column at a time
//! 3. **Index derivation** ([`index::IndexDeriver`]): append the weighted composite index
//!    and its `Low`/`High` label
//! 4. **Inference**, each step reading the prepared dataset independently:
//!    - [`estimate`]: confidence intervals for a mean and for a level proportion
//!    - [`compare::GroupComparator`]: per-group variances, Bartlett's test, pooled t-test
//!    - [`contingency::ContingencyAnalyzer`]: chi-square test of independence
//!
//! [`report::AnalysisReport`] runs every step with one [`report::ReportConfig`].
//!
//! Every fallible operation returns [`AnalysisError`]; nothing is partially
//! computed.
//!
//! # Examples
//!
//! ```
//! use survey_analysis::{
//!     dataset::{Dataset, Schema, Value},
//!     index::IndexDeriver,
//!     level_filter::LevelFilter,
//! };
//!
//! let schema = Schema::new().numeric("Dalc").numeric("Walc").categorical("gender");
//! let rows = [(1.0, 1.0, "F"), (4.0, 5.0, "M"), (2.0, 2.0, "F")]
//!     .map(|(d, w, g)| vec![Value::Number(d), Value::Number(w), Value::text(g)])
//!     .to_vec();
//! let dataset = Dataset::from_rows(schema, rows).unwrap();
//!
//! let filtered = LevelFilter::new(2).apply(dataset, &["gender"]).unwrap();
//! let derived = IndexDeriver::default().derive(filtered.dataset).unwrap();
//!
//! assert_eq!(derived.categorical_values("acl").unwrap(), ["Low", "Low"]);
//! ```

pub use self::error::{AnalysisError, ErrorKind};

pub mod compare;
pub mod contingency;
pub mod dataset;
mod error;
pub mod estimate;
pub mod index;
pub mod level_filter;
pub mod report;
