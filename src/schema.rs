//! Declarative definition documents consumed by
//! [`Experiments::define_by_object`](crate::Experiments::define_by_object)

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::config::Config;

/// Top-level document: registry config plus experiment definitions.
///
/// Conditions and providers cannot be expressed as data; they are attached
/// through the typed API after the registry is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperimentsDef {
    #[serde(default)]
    pub config: Config,

    #[serde(default)]
    pub experiments: Vec<ExperimentDef>,
}

/// One experiment: a required name, optional config, and variants.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentDef {
    pub name: String,

    #[serde(default)]
    pub config: Config,

    #[serde(default)]
    pub variants: Vec<VariantDef>,
}

/// One variant: a required name plus its toggle states.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantDef {
    pub name: String,

    /// Toggle name to state. Values must be booleans; anything else fails
    /// the whole definition.
    #[serde(default)]
    pub state: BTreeMap<String, bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_a_full_document() {
        let definition: ExperimentsDef = serde_json::from_value(json!({
            "config": { "prefix": "global", "isOff": false },
            "experiments": [
                {
                    "name": "FeatureA",
                    "config": { "prefix": "FeatureA" },
                    "variants": [
                        { "name": "VariantA", "state": { "prop1": true, "prop2": false } },
                        // Variant-level config keys are tolerated and ignored.
                        { "name": "VariantB", "config": {} }
                    ]
                }
            ]
        }))
        .expect("document should deserialize");

        assert_eq!(definition.config.prefix.as_deref(), Some("global"));
        assert_eq!(definition.experiments.len(), 1);

        let experiment = &definition.experiments[0];
        assert_eq!(experiment.name, "FeatureA");
        assert_eq!(experiment.variants.len(), 2);
        assert_eq!(experiment.variants[0].state.get("prop1"), Some(&true));
        assert!(experiment.variants[1].state.is_empty());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let definition: ExperimentsDef =
            serde_json::from_value(json!({})).expect("empty document is valid");

        assert_eq!(definition.config, Config::default());
        assert!(definition.experiments.is_empty());
    }

    #[test]
    fn test_non_boolean_toggle_state_is_rejected() {
        let result: Result<ExperimentsDef, _> = serde_json::from_value(json!({
            "experiments": [
                { "name": "FeatureA", "variants": [{ "name": "VariantA", "state": { "prop1": 1 } }] }
            ]
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_experiment_name_is_rejected() {
        let result: Result<ExperimentsDef, _> = serde_json::from_value(json!({
            "experiments": [{ "variants": [] }]
        }));

        assert!(result.is_err());
    }
}
