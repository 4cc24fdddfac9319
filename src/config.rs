//! Configuration shared by experiments and the registry

use serde::{Deserialize, Serialize};

/// Prefix applied to feature-map keys when no override is configured.
pub const DEFAULT_PREFIX: &str = "ab";

/// Configuration accepted by [`Experiment`](crate::Experiment) and the
/// [`Experiments`](crate::Experiments) registry.
///
/// Every field is optional so a shallow merge can tell "unset" apart from an
/// explicit value: when an experiment joins a registry, the registry's config
/// sits underneath the experiment's own and only fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Feature-map key prefix override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Kill switch. On an experiment it forces the condition to false; on
    /// the registry it additionally makes the live fan-out resolve nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_off: Option<bool>,

    /// Validation policy. `false` routes definition-time validation failures
    /// to the logger and lets the call carry on instead of failing it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_is_off(mut self, is_off: bool) -> Self {
        self.is_off = Some(is_off);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Shallow merge with `base` underneath: fields set here win, unset
    /// fields fall through to `base`.
    pub fn merged_over(&self, base: &Config) -> Config {
        Config {
            prefix: self.prefix.clone().or_else(|| base.prefix.clone()),
            is_off: self.is_off.or(base.is_off),
            strict: self.strict.or(base.strict),
        }
    }

    /// Kill-switch state with the unset default applied.
    pub fn is_disabled(&self) -> bool {
        self.is_off.unwrap_or(false)
    }

    /// Validation policy with the unset default applied (strict).
    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(true)
    }

    /// Feature-map key prefix with the default applied. An empty override
    /// counts as unset.
    pub fn prefix_or_default(&self) -> &str {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => DEFAULT_PREFIX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_default_config() {
            let config = Config::default();

            assert_eq!(config.prefix_or_default(), DEFAULT_PREFIX);
            assert!(!config.is_disabled());
            assert!(config.is_strict());
        }

        #[test]
        fn test_empty_prefix_falls_back_to_default() {
            let config = Config::new().with_prefix("");
            assert_eq!(config.prefix_or_default(), "ab");
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn test_own_fields_win() {
            let base = Config::new().with_prefix("registry").with_is_off(true);
            let own = Config::new().with_prefix("experiment").with_is_off(false);

            let merged = own.merged_over(&base);

            assert_eq!(merged.prefix.as_deref(), Some("experiment"));
            assert_eq!(merged.is_off, Some(false));
        }

        #[test]
        fn test_unset_fields_fall_through() {
            let base = Config::new().with_prefix("registry").with_strict(false);
            let own = Config::new().with_is_off(true);

            let merged = own.merged_over(&base);

            assert_eq!(merged.prefix.as_deref(), Some("registry"));
            assert_eq!(merged.is_off, Some(true));
            assert!(!merged.is_strict());
        }
    }

    mod serde_format_tests {
        use super::*;
        use serde_json::json;

        #[test]
        fn test_deserializes_camel_case_keys() {
            let config: Config =
                serde_json::from_value(json!({ "prefix": "FeatureA", "isOff": true }))
                    .expect("config should deserialize");

            assert_eq!(config.prefix.as_deref(), Some("FeatureA"));
            assert!(config.is_disabled());
        }

        #[test]
        fn test_ignores_unknown_keys() {
            let config: Config =
                serde_json::from_value(json!({ "prefix": "x", "rolloutNote": "ignored" }))
                    .expect("unknown keys are ignored");

            assert_eq!(config.prefix.as_deref(), Some("x"));
        }

        #[test]
        fn test_unset_fields_are_not_serialized() {
            let value = serde_json::to_value(Config::new().with_prefix("x"))
                .expect("config should serialize");

            assert_eq!(value, json!({ "prefix": "x" }));
        }
    }
}
