use std::fmt;

/// Errors reported by the optimizers before or while starting a run.
///
/// Running out of steps is not an error: an optimizer always returns its best
/// point, and [`StopReason`](crate::StopReason) says why it stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeError {
    /// The starting point has no coordinates, so there is nothing to record.
    EmptyStartingPoint,
    /// The starting point's dimension does not match the oracle's.
    DimensionMismatch { expected: usize, got: usize },
    /// A parameter value is outside its valid range.
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },
    /// The objective is `NaN` or infinite at the starting point.
    NonFiniteObjective { value: f64 },
}

impl OptimizeError {
    pub(crate) fn invalid_parameter(name: &str, value: f64, reason: &'static str) -> Self {
        OptimizeError::InvalidParameter {
            name: name.to_string(),
            value,
            reason,
        }
    }
}

impl fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizeError::EmptyStartingPoint => {
                write!(f, "Starting point must have at least one coordinate")
            }
            OptimizeError::DimensionMismatch { expected, got } => {
                write!(
                    f,
                    "Starting point has {} coordinates, but the function takes {}",
                    got, expected
                )
            }
            OptimizeError::InvalidParameter {
                name,
                value,
                reason,
            } => {
                write!(f, "Invalid value {} for parameter '{}': {}", value, name, reason)
            }
            OptimizeError::NonFiniteObjective { value } => {
                write!(
                    f,
                    "Objective function is not finite at the starting point (got {})",
                    value
                )
            }
        }
    }
}

impl std::error::Error for OptimizeError {}
