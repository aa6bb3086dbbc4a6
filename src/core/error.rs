use thiserror::Error;

/// Rejections raised at the CLI and HTTP boundaries before a calculation runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Missing required: {0}")]
    Missing(&'static str),

    #[error("Invalid data format: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl InputError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        InputError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            InputError::Missing(field) => field,
            InputError::Invalid { field, .. } => field,
        }
    }
}
