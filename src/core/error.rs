use thiserror::Error;

/// Why a projection could not be produced.
///
/// `MalformedInput` is a shape problem (missing field, not a number);
/// `InvalidInput` is a well-typed value outside the modelled domain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("malformed input for {field}: {reason}")]
    MalformedInput { field: &'static str, reason: String },

    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl ProjectionError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        ProjectionError::MalformedInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ProjectionError::MalformedInput { field, .. }
            | ProjectionError::InvalidInput { field, .. } => field,
        }
    }
}
