//! Experiment definitions and live-variant resolution

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::Context;
use crate::condition::Condition;
use crate::config::Config;
use crate::error::Error;
use crate::live::{FieldSelector, LiveExperiment};
use crate::logger::{Logger, default_logger};
use crate::provider::{VariantDescriptor, VariantProvider};
use crate::registry::Experiments;
use crate::validation::validate_experiment_name;
use crate::variant::{FeatureMap, Variant};

/// A named experiment: variants carrying feature toggles, an activation
/// condition, and an async provider resolving which variant is live.
///
/// Resolution fails open: a false condition, a missing provider, or a
/// provider failure all make the experiment "not live", and failures are
/// reported to the injected [`Logger`] rather than surfaced.
#[derive(Clone)]
pub struct Experiment {
    name: String,
    config: Config,
    registry_config: Option<Config>,
    variants: Vec<Variant>,
    condition: Option<Condition>,
    variant_provider: Option<Arc<dyn VariantProvider>>,
    condition_context: Option<Context>,
    variant_provider_context: Option<Context>,
    logger: Arc<dyn Logger>,
}

impl Experiment {
    /// Defines an experiment with the default config.
    pub fn define(name: impl Into<String>) -> Result<Self, Error> {
        Self::define_with(name, Config::default(), default_logger())
    }

    /// Defines an experiment with `config`.
    pub fn define_with_config(name: impl Into<String>, config: Config) -> Result<Self, Error> {
        Self::define_with(name, config, default_logger())
    }

    /// Defines an experiment with `config` and a caller-supplied logger.
    ///
    /// Under a lenient config (`strict` set to `false`) an invalid name is
    /// reported to `logger` and kept as-is instead of failing the call.
    pub fn define_with(
        name: impl Into<String>,
        config: Config,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, Error> {
        let name = name.into();

        if let Err(err) = validate_experiment_name(&name) {
            if config.is_strict() {
                return Err(err.into());
            }
            logger.error("Keeping experiment with invalid name", &err.into());
        }

        Ok(Self {
            name,
            config,
            registry_config: None,
            variants: Vec::new(),
            condition: None,
            variant_provider: None,
            condition_context: None,
            variant_provider_context: None,
            logger,
        })
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Adds a variant, consuming form for definition chains.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.add_variant(variant);
        self
    }

    /// Sets the condition, consuming form.
    pub fn with_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Attaches the variant provider, consuming form.
    pub fn with_variant_provider(mut self, provider: Arc<dyn VariantProvider>) -> Self {
        self.variant_provider = Some(provider);
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

    /// Adds a variant, overwriting a same-named variant in place. The
    /// variant inherits this experiment's effective prefix and policy.
    pub fn add_variant(&mut self, mut variant: Variant) -> &mut Self {
        self.push_owner_data(&mut variant);

        match self
            .variants
            .iter_mut()
            .find(|existing| existing.name() == variant.name())
        {
            Some(existing) => *existing = variant,
            None => self.variants.push(variant),
        }

        self
    }

    /// Replaces the condition. Both a plain `bool` and [`Condition::when`]
    /// predicates convert.
    pub fn set_condition(&mut self, condition: impl Into<Condition>) -> &mut Self {
        self.condition = Some(condition.into());
        self
    }

    /// Attaches the provider consulted by
    /// [`get_live_variant`](Self::get_live_variant).
    pub fn set_variant_provider(&mut self, provider: Arc<dyn VariantProvider>) -> &mut Self {
        self.variant_provider = Some(provider);
        self
    }

    /// Sets the context handed to condition predicates, replacing any
    /// existing one.
    pub fn set_condition_context(&mut self, context: Context) -> &mut Self {
        self.condition_context = Some(context);
        self
    }

    /// Sets the condition context only when none is stored yet. The
    /// registry uses this to seed newly added experiments without
    /// clobbering a locally configured context.
    pub fn set_condition_context_if_unset(&mut self, context: Context) -> &mut Self {
        if self.condition_context.is_none() {
            self.condition_context = Some(context);
        }
        self
    }

    /// Sets the context handed to the variant provider, replacing any
    /// existing one.
    pub fn set_variant_provider_context(&mut self, context: Context) -> &mut Self {
        self.variant_provider_context = Some(context);
        self
    }

    /// Sets the provider context only when none is stored yet.
    pub fn set_variant_provider_context_if_unset(&mut self, context: Context) -> &mut Self {
        if self.variant_provider_context.is_none() {
            self.variant_provider_context = Some(context);
        }
        self
    }

    /// Records the owning registry's config for merging and re-propagates
    /// the now-effective prefix and policy to registered variants. Called
    /// automatically by
    /// [`Experiments::add_experiment`](crate::Experiments::add_experiment).
    pub fn register_experiments(&mut self, experiments: &Experiments) -> &mut Self {
        self.registry_config = Some(experiments.config().clone());

        let name = self.name.clone();
        let config = self.config();
        let strict = config.is_strict();

        for variant in &mut self.variants {
            variant.register_owner(&name, config.prefix.as_deref(), strict);
        }

        self
    }

    fn push_owner_data(&self, variant: &mut Variant) {
        let config = self.config();
        variant.register_owner(&self.name, config.prefix.as_deref(), config.is_strict());
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Experiment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective config: the owning registry's config (when registered)
    /// shallow-merged underneath this experiment's own; own fields win.
    pub fn config(&self) -> Config {
        match &self.registry_config {
            Some(base) => self.config.merged_over(base),
            None => self.config.clone(),
        }
    }

    /// Registered variants, in insertion order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Looks up a variant by name.
    pub fn get_variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.name() == name)
    }

    /// Mutable variant lookup, for adjusting toggles or conditions after
    /// definition.
    pub fn get_variant_mut(&mut self, name: &str) -> Option<&mut Variant> {
        self.variants
            .iter_mut()
            .find(|variant| variant.name() == name)
    }

    /// Whether the experiment is live. The kill switch in the effective
    /// config short-circuits to false; otherwise an unset condition means
    /// live, a literal is taken as-is, and a predicate runs against the
    /// stored condition context.
    pub fn condition(&self) -> bool {
        if self.config().is_disabled() {
            return false;
        }

        match &self.condition {
            None => true,
            Some(condition) => condition.evaluate(self.condition_context.as_ref()),
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Feature map of the named variant, or an empty map for unknown names.
    pub fn get_variant_state(&self, variant_name: &str) -> FeatureMap {
        self.get_variant(variant_name)
            .map(Variant::features_map)
            .unwrap_or_default()
    }

    /// Resolves the live variant descriptor.
    ///
    /// `None` when the experiment is not live or no provider is attached;
    /// the provider is not invoked in either case. A provider failure is
    /// reported to the logger and resolves to `None` as well.
    pub async fn get_live_variant(&self) -> Option<VariantDescriptor> {
        if !self.condition() {
            return None;
        }

        let provider = self.variant_provider.as_ref()?;

        debug!(experiment = %self.name, "Resolving live variant");

        match provider.resolve(self.variant_provider_context.as_ref()).await {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                self.logger.error("Error while getting live variant", &err);
                None
            }
        }
    }

    /// Resolves the live state: the experiment name plus descriptor fields
    /// selected by `fields`. `None` when no variant is live.
    pub async fn get_live_experiment(&self, fields: &[FieldSelector]) -> Option<LiveExperiment> {
        let descriptor = self.get_live_variant().await?;
        Some(LiveExperiment::from_descriptor(&self.name, &descriptor, fields))
    }
}

impl fmt::Debug for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experiment")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("registry_config", &self.registry_config)
            .field("variants", &self.variants)
            .field("condition", &self.condition)
            .field(
                "variant_provider",
                &self.variant_provider.as_ref().map(|_| ".."),
            )
            .field("condition_context", &self.condition_context)
            .field("variant_provider_context", &self.variant_provider_context)
            .finish()
    }
}
