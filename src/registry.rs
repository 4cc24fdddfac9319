//! Registry tying experiments together: shared config, context broadcast,
//! concurrent live resolution, and declarative definition

use std::sync::Arc;

use futures::future;
use serde_json::Value;
use tracing::debug;

use crate::Context;
use crate::config::Config;
use crate::error::Error;
use crate::experiment::Experiment;
use crate::live::{FieldSelector, LiveExperiment};
use crate::logger::{Logger, default_logger};
use crate::schema::ExperimentsDef;
use crate::validation::validate_experiment_name;
use crate::variant::{FeatureMap, Variant};

/// Ordered collection of [`Experiment`]s sharing a config and broadcast
/// contexts.
///
/// Experiments keep their registration order, which is also the order of
/// [`get_live_experiments`](Self::get_live_experiments) results.
#[derive(Debug, Clone)]
pub struct Experiments {
    config: Config,
    experiments: Vec<Experiment>,
    condition_context: Option<Context>,
    variant_provider_context: Option<Context>,
    logger: Arc<dyn Logger>,
}

impl Experiments {
    /// Creates an empty registry with the default config.
    pub fn define() -> Self {
        Self::define_with_config(Config::default())
    }

    /// Creates an empty registry with `config`, which later merges
    /// underneath every added experiment's own config.
    pub fn define_with_config(config: Config) -> Self {
        Self {
            config,
            experiments: Vec::new(),
            condition_context: None,
            variant_provider_context: None,
            logger: default_logger(),
        }
    }

    // ========================================================================
    // Declarative definition
    // ========================================================================

    /// Builds a whole registry from a declarative document.
    ///
    /// Any failure (unexpected shape, a non-boolean toggle state, an empty
    /// name) is reported to the default logger and yields a fresh empty
    /// registry; a partially built registry is never returned.
    pub fn define_by_object(definition: Value) -> Self {
        Self::define_by_object_with(definition, default_logger())
    }

    /// [`define_by_object`](Self::define_by_object) with failures reported
    /// to `logger` instead of the default sink. Experiments built from the
    /// document adopt `logger` for their own reporting as well.
    pub fn define_by_object_with(definition: Value, logger: Arc<dyn Logger>) -> Self {
        match Self::try_define_by_object(definition, &logger) {
            Ok(registry) => registry.with_logger(logger),
            Err(err) => {
                logger.error("Error while defining experiments", &err);
                Self::define().with_logger(logger)
            }
        }
    }

    /// [`define_by_object`](Self::define_by_object) over a JSON document,
    /// with the same all-or-nothing behavior.
    pub fn define_by_json(definition: &str) -> Self {
        match serde_json::from_str::<Value>(definition) {
            Ok(value) => Self::define_by_object(value),
            Err(err) => {
                let registry = Self::define();
                registry.logger.error(
                    "Error while defining experiments",
                    &Error::definition(err.to_string()),
                );
                registry
            }
        }
    }

    fn try_define_by_object(definition: Value, logger: &Arc<dyn Logger>) -> Result<Self, Error> {
        let definition: ExperimentsDef = serde_json::from_value(definition)
            .map_err(|err| Error::definition(err.to_string()))?;

        let mut registry = Self::define_with_config(definition.config);

        for experiment_def in definition.experiments {
            // Bulk definitions are validated strictly even under a lenient
            // document config; a bad document never half-applies.
            validate_experiment_name(&experiment_def.name)?;

            let mut experiment = Experiment::define_with(
                experiment_def.name,
                experiment_def.config,
                logger.clone(),
            )?;

            for variant_def in experiment_def.variants {
                let mut variant = Variant::define(variant_def.name)?.with_logger(logger.clone());

                for (toggle, state) in variant_def.state {
                    variant.add_feature_toggle(toggle, state)?;
                }

                experiment.add_variant(variant);
            }

            registry.add_experiment(experiment);
        }

        Ok(registry)
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Adds an experiment, consuming form for definition chains.
    pub fn with_experiment(mut self, experiment: Experiment) -> Self {
        self.add_experiment(experiment);
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

    /// Adds an experiment, overwriting a same-named experiment in place.
    ///
    /// The experiment learns this registry's config and is seeded with any
    /// broadcast contexts it does not already carry.
    pub fn add_experiment(&mut self, mut experiment: Experiment) -> &mut Self {
        experiment.register_experiments(self);

        if let Some(context) = &self.condition_context {
            experiment.set_condition_context_if_unset(context.clone());
        }
        if let Some(context) = &self.variant_provider_context {
            experiment.set_variant_provider_context_if_unset(context.clone());
        }

        match self
            .experiments
            .iter_mut()
            .find(|existing| existing.name() == experiment.name())
        {
            Some(existing) => *existing = experiment,
            None => self.experiments.push(experiment),
        }

        self
    }

    /// Stores the condition context and pushes it to every registered
    /// experiment, replacing their current ones.
    pub fn set_condition_context(&mut self, context: Context) -> &mut Self {
        self.condition_context = Some(context.clone());

        for experiment in &mut self.experiments {
            experiment.set_condition_context(context.clone());
        }

        self
    }

    /// Stores the variant-provider context and pushes it to every
    /// registered experiment, replacing their current ones.
    pub fn set_variant_provider_context(&mut self, context: Context) -> &mut Self {
        self.variant_provider_context = Some(context.clone());

        for experiment in &mut self.experiments {
            experiment.set_variant_provider_context(context.clone());
        }

        self
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Registry config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registered experiments, in registration order.
    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    /// Looks up an experiment by name.
    pub fn get_experiment(&self, name: &str) -> Option<&Experiment> {
        self.experiments
            .iter()
            .find(|experiment| experiment.name() == name)
    }

    /// Mutable experiment lookup, for attaching providers or conditions
    /// after a declarative build.
    pub fn get_experiment_mut(&mut self, name: &str) -> Option<&mut Experiment> {
        self.experiments
            .iter_mut()
            .find(|experiment| experiment.name() == name)
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Feature map for one variant of one experiment; empty when either
    /// name is unknown.
    pub fn get_variant_state(&self, experiment_name: &str, variant_name: &str) -> FeatureMap {
        self.get_experiment(experiment_name)
            .map(|experiment| experiment.get_variant_state(variant_name))
            .unwrap_or_default()
    }

    /// Merges the feature maps of previously resolved live experiments.
    ///
    /// Entries without a non-empty experiment name and variant name are
    /// skipped. The remaining maps are shallow-merged left to right, so a
    /// later experiment wins on identical keys.
    pub fn get_experiments_state(&self, live_experiments: &[LiveExperiment]) -> FeatureMap {
        let mut state = FeatureMap::new();

        for live in live_experiments {
            if live.experiment_name.is_empty() {
                continue;
            }
            let Some(variant_name) = live.variant_name().filter(|name| !name.is_empty()) else {
                continue;
            };

            state.extend(self.get_variant_state(&live.experiment_name, variant_name));
        }

        state
    }

    /// Resolves every experiment's live state concurrently.
    ///
    /// The registry kill switch resolves to an empty list without touching
    /// any experiment. Results keep registration order; experiments that are
    /// not live, or whose provider failed, are filtered out.
    pub async fn get_live_experiments(&self, fields: &[FieldSelector]) -> Vec<LiveExperiment> {
        if self.config.is_disabled() {
            return Vec::new();
        }

        debug!(experiments = self.experiments.len(), "Resolving live experiments");

        let live = future::join_all(
            self.experiments
                .iter()
                .map(|experiment| experiment.get_live_experiment(fields)),
        )
        .await;

        live.into_iter().flatten().collect()
    }
}

impl Default for Experiments {
    fn default() -> Self {
        Self::define()
    }
}
