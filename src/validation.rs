//! Name validation shared by variant, experiment, and registry definitions

use thiserror::Error;

/// Validation errors for experiment and variant definitions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Experiment name cannot be empty")]
    EmptyExperimentName,

    #[error("Variant name cannot be empty")]
    EmptyVariantName,

    #[error("Feature toggle name cannot be empty")]
    EmptyToggleName,
}

/// Validate an experiment name
pub fn validate_experiment_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyExperimentName);
    }

    Ok(())
}

/// Validate a variant name
pub fn validate_variant_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyVariantName);
    }

    Ok(())
}

/// Validate a feature toggle name
pub fn validate_toggle_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyToggleName);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod experiment_name_validation {
        use super::*;

        #[test]
        fn test_valid_experiment_names() {
            assert!(validate_experiment_name("checkout").is_ok());
            assert!(validate_experiment_name("FeatureA").is_ok());
            assert!(validate_experiment_name("landing page 2024").is_ok());
        }

        #[test]
        fn test_empty_name() {
            assert_eq!(
                validate_experiment_name(""),
                Err(ValidationError::EmptyExperimentName)
            );
        }

        #[test]
        fn test_whitespace_only_name() {
            assert_eq!(
                validate_experiment_name("   "),
                Err(ValidationError::EmptyExperimentName)
            );
        }
    }

    mod variant_name_validation {
        use super::*;

        #[test]
        fn test_valid_variant_names() {
            assert!(validate_variant_name("control").is_ok());
            assert!(validate_variant_name("VariantB").is_ok());
        }

        #[test]
        fn test_empty_variant_name() {
            assert_eq!(
                validate_variant_name(""),
                Err(ValidationError::EmptyVariantName)
            );
        }

        #[test]
        fn test_whitespace_only_variant_name() {
            assert_eq!(
                validate_variant_name("\t"),
                Err(ValidationError::EmptyVariantName)
            );
        }
    }

    mod toggle_name_validation {
        use super::*;

        #[test]
        fn test_valid_toggle_names() {
            assert!(validate_toggle_name("header").is_ok());
            assert!(validate_toggle_name("newCheckoutFlow").is_ok());
        }

        #[test]
        fn test_empty_toggle_name() {
            assert_eq!(
                validate_toggle_name(""),
                Err(ValidationError::EmptyToggleName)
            );
        }
    }
}
