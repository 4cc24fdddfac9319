use thiserror::Error;

use crate::validation::ValidationError;

/// Core library errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Definition error: {message}")]
    Definition { message: String },

    #[error("Provider error: {message}")]
    Provider { message: String },
}

impl Error {
    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = Error::from(ValidationError::EmptyVariantName);
        assert_eq!(
            error.to_string(),
            "Validation error: Variant name cannot be empty"
        );
    }

    #[test]
    fn test_definition_error() {
        let error = Error::definition("expected a boolean toggle state");
        assert_eq!(
            error.to_string(),
            "Definition error: expected a boolean toggle state"
        );
    }

    #[test]
    fn test_provider_error() {
        let error = Error::provider("bucketing service unavailable");
        assert_eq!(
            error.to_string(),
            "Provider error: bucketing service unavailable"
        );
    }
}
