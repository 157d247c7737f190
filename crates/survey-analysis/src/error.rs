use survey_stats::{contingency::ContingencyError, interval::IntervalError};

use crate::{compare::GroupError, dataset::SchemaError};

/// Errors raised by the dataset-level analysis steps.
///
/// Every variant is a deterministic input-validation failure; nothing is
/// computed past the point of failure.
#[derive(
    Debug,
    Clone,
    PartialEq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum AnalysisError {
    #[display("{_0}")]
    Schema(SchemaError),
    #[display("Row {row} has no value for required column '{column}'")]
    #[from(ignore)]
    MissingField { row: usize, column: String },
    #[display("Insufficient data: no rows left for {operation}")]
    #[from(ignore)]
    InsufficientData { operation: &'static str },
    #[display("{_0}")]
    Interval(IntervalError),
    #[display("{_0}")]
    Group(GroupError),
    #[display("{_0}")]
    Contingency(ContingencyError),
}

/// Coarse classification of an [`AnalysisError`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ErrorKind {
    #[display("invalid schema")]
    InvalidSchema,
    #[display("missing value")]
    MissingValue,
    #[display("insufficient data")]
    InsufficientData,
    #[display("invalid parameter")]
    InvalidParameter,
}

impl AnalysisError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) => ErrorKind::InvalidSchema,
            Self::MissingField { .. } => ErrorKind::MissingValue,
            Self::InsufficientData { .. }
            | Self::Contingency(
                ContingencyError::TooSmall { .. } | ContingencyError::ZeroMargin { .. },
            )
            | Self::Interval(IntervalError::InsufficientSample { .. } | IntervalError::EmptySample)
            | Self::Group(
                GroupError::EmptyGroup { .. }
                | GroupError::InsufficientGroupSize { .. }
                | GroupError::ZeroVariance { .. },
            ) => ErrorKind::InsufficientData,
            Self::Interval(_) | Self::Group(_) | Self::Contingency(_) => {
                ErrorKind::InvalidParameter
            }
        }
    }
}
