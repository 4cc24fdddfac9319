//! Variant definitions and feature-map computation

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::Context;
use crate::condition::Condition;
use crate::config::DEFAULT_PREFIX;
use crate::error::Error;
use crate::experiment::Experiment;
use crate::logger::{Logger, default_logger};
use crate::validation::{validate_toggle_name, validate_variant_name};

/// Feature state handed to callers: normalized key to toggle value.
pub type FeatureMap = BTreeMap<String, bool>;

/// Data a variant copies from the experiment that registers it. Plain data
/// rather than a back-pointer, so ownership stays one-way.
#[derive(Debug, Clone)]
struct ExperimentRef {
    name: String,
    prefix: Option<String>,
    strict: bool,
}

/// A named bundle of boolean feature toggles inside an experiment.
///
/// A variant is live unless a condition says otherwise; its feature map is
/// the toggles under normalized keys, or empty when it is not live.
#[derive(Debug, Clone)]
pub struct Variant {
    name: String,
    toggles: BTreeMap<String, bool>,
    condition: Option<Condition>,
    condition_context: Option<Context>,
    experiment: Option<ExperimentRef>,
    logger: Arc<dyn Logger>,
}

impl Variant {
    /// Defines a variant. The name must be non-empty.
    pub fn define(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        validate_variant_name(&name)?;

        Ok(Self {
            name,
            toggles: BTreeMap::new(),
            condition: None,
            condition_context: None,
            experiment: None,
            logger: default_logger(),
        })
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Adds a feature toggle, consuming form for definition chains.
    pub fn with_feature_toggle(
        mut self,
        name: impl Into<String>,
        state: bool,
    ) -> Result<Self, Error> {
        self.add_feature_toggle(name, state)?;
        Ok(self)
    }

    /// Sets the condition, consuming form.
    pub fn with_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Replaces the logger contained failures are reported to.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    /// Adds or overwrites a feature toggle.
    ///
    /// An empty toggle name fails the call under the strict policy and is
    /// reported to the logger and dropped otherwise.
    pub fn add_feature_toggle(
        &mut self,
        name: impl Into<String>,
        state: bool,
    ) -> Result<&mut Self, Error> {
        let name = name.into();

        match validate_toggle_name(&name) {
            Ok(()) => {
                self.toggles.insert(name, state);
                Ok(self)
            }
            Err(err) if self.strict() => Err(err.into()),
            Err(err) => {
                self.logger
                    .error("Ignoring invalid feature toggle", &err.into());
                Ok(self)
            }
        }
    }

    /// Replaces the condition. Both a plain `bool` and
    /// [`Condition::when`] predicates convert.
    pub fn set_condition(&mut self, condition: impl Into<Condition>) -> &mut Self {
        self.condition = Some(condition.into());
        self
    }

    /// Replaces the context handed to condition predicates.
    pub fn set_condition_context(&mut self, context: Context) -> &mut Self {
        self.condition_context = Some(context);
        self
    }

    /// Records the experiment that owns this variant, used for prefix and
    /// policy resolution. Called automatically when the variant is added to
    /// an experiment; idempotent, last write wins.
    pub fn register_experiment(&mut self, experiment: &Experiment) -> &mut Self {
        let config = experiment.config();
        self.register_owner(experiment.name(), config.prefix.as_deref(), config.is_strict());
        self
    }

    pub(crate) fn register_owner(&mut self, name: &str, prefix: Option<&str>, strict: bool) {
        self.experiment = Some(ExperimentRef {
            name: name.to_string(),
            prefix: prefix.map(str::to_string),
            strict,
        });
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Variant name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning experiment, once registered.
    pub fn experiment_name(&self) -> Option<&str> {
        self.experiment.as_ref().map(|owner| owner.name.as_str())
    }

    /// Toggles as defined, without prefix normalization. Returns an owned
    /// copy; mutating it does not touch the variant.
    pub fn feature_toggles(&self) -> BTreeMap<String, bool> {
        self.toggles.clone()
    }

    /// Whether this variant is live: an unset condition means live, a
    /// literal is taken as-is, and a predicate runs against the stored
    /// condition context.
    pub fn condition(&self) -> bool {
        match &self.condition {
            None => true,
            Some(condition) => condition.evaluate(self.condition_context.as_ref()),
        }
    }

    /// Feature state under normalized keys, or an empty map when the
    /// variant is not live.
    ///
    /// Keys are renamed `<prefix><Key>`: toggle `"header"` with the default
    /// prefix becomes `"abHeader"`. The prefix comes from the owning
    /// experiment's effective config, falling back to [`DEFAULT_PREFIX`].
    pub fn features_map(&self) -> FeatureMap {
        if !self.condition() {
            return FeatureMap::new();
        }

        let prefix = self.prefix();

        self.toggles
            .iter()
            .map(|(name, state)| (normalize_key(prefix, name), *state))
            .collect()
    }

    fn prefix(&self) -> &str {
        match self
            .experiment
            .as_ref()
            .and_then(|owner| owner.prefix.as_deref())
        {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => DEFAULT_PREFIX,
        }
    }

    fn strict(&self) -> bool {
        self.experiment.as_ref().is_none_or(|owner| owner.strict)
    }
}

/// `header` with prefix `ab` becomes `abHeader`.
fn normalize_key(prefix: &str, name: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + name.len());
    key.push_str(prefix);

    let mut chars = name.chars();
    if let Some(first) = chars.next() {
        key.extend(first.to_uppercase());
        key.push_str(chars.as_str());
    }

    key
}
