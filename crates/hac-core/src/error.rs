use std::fmt;

/// Validation failures raised synchronously by the core.
///
/// Empty inputs (empty space, short trajectory) are not errors; those
/// operations return `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    EmptyVector,
    NonFinite { index: usize, value: f64 },
    DimensionMismatch { expected: usize, actual: usize },
    IndexOutOfRange { index: usize, len: usize },
    InvalidWeight { name: &'static str, value: f64 },
    InvalidConfig(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::EmptyVector => write!(f, "vector has no coordinates"),
            CoreError::NonFinite { index, value } => {
                write!(f, "non-finite value {value} at coordinate {index}")
            }
            CoreError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            CoreError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for space of size {len}")
            }
            CoreError::InvalidWeight { name, value } => {
                write!(f, "weight {name} must be finite and non-negative, got {value}")
            }
            CoreError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

pub type Result<T> = std::result::Result<T, CoreError>;
