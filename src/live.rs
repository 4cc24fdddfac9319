//! Resolved live-experiment state and descriptor field selection

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::provider::{VARIANT_NAME_FIELD, VariantDescriptor};

/// Selects which descriptor fields a live-experiment result carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    /// Copy the field under its own name.
    Named(String),

    /// Copy the `source` field under the `target` name.
    Renamed { source: String, target: String },
}

impl FieldSelector {
    /// Selector copying `name` as-is.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Selector copying the provider's `source` field under `target`,
    /// bridging provider-defined field names to the output convention.
    pub fn renamed(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Renamed {
            source: source.into(),
            target: target.into(),
        }
    }

    fn source(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Renamed { source, .. } => source,
        }
    }

    fn target(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Renamed { target, .. } => target,
        }
    }
}

impl From<&str> for FieldSelector {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// Live state of one experiment: its name plus the descriptor fields the
/// caller selected. Serializes flat (`{"experimentName": .., ..fields}`) so
/// it can round-trip through cookies or client storage and come back into
/// [`Experiments::get_experiments_state`](crate::Experiments::get_experiments_state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveExperiment {
    /// Name of the experiment that resolved live.
    pub experiment_name: String,

    /// Fields extracted from the provider's descriptor.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LiveExperiment {
    /// State carrying no descriptor fields yet.
    pub fn new(experiment_name: impl Into<String>) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            fields: Map::new(),
        }
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The variant-name field, when present and a string.
    pub fn variant_name(&self) -> Option<&str> {
        self.fields.get(VARIANT_NAME_FIELD).and_then(Value::as_str)
    }

    /// Extracts `selectors` out of a resolved descriptor. Selectors naming
    /// fields the descriptor lacks are skipped.
    pub(crate) fn from_descriptor(
        experiment_name: &str,
        descriptor: &VariantDescriptor,
        selectors: &[FieldSelector],
    ) -> Self {
        let mut live = Self::new(experiment_name);

        for selector in selectors {
            if let Some(value) = descriptor.get(selector.source()) {
                live.fields
                    .insert(selector.target().to_string(), value.clone());
            }
        }

        live
    }
}
