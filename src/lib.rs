//! Client-side A/B experiments
//!
//! Defines experiments whose variants carry boolean feature toggles, with:
//! - Conditions gating whether an experiment or variant is live
//! - Async variant providers resolving assignments per request context
//! - Feature maps merged across experiments under prefixed keys
//! - Declarative registry definition from JSON documents
//!
//! Assignment itself stays outside this crate: a [`VariantProvider`] brings
//! the decision in, and resolution fails open, so a failing provider makes
//! its experiment inactive instead of failing the request.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//!
//! use absee::{Context, Error, Experiment, Experiments, Variant, VariantDescriptor};
//!
//! # tokio_test::block_on(async {
//! let checkout = Experiment::define("checkout")?
//!     .with_variant(Variant::define("control")?.with_feature_toggle("oneClick", false)?)
//!     .with_variant(Variant::define("treatment")?.with_feature_toggle("oneClick", true)?)
//!     .with_variant_provider(Arc::new(|_context: Option<Context>| async move {
//!         Ok::<_, Error>(VariantDescriptor::named("treatment"))
//!     }));
//!
//! let mut experiments = Experiments::define();
//! experiments.add_experiment(checkout);
//!
//! let live = experiments.get_live_experiments(&["variantName".into()]).await;
//! let state = experiments.get_experiments_state(&live);
//!
//! assert_eq!(state.get("abOneClick"), Some(&true));
//! # Ok::<_, Error>(())
//! # }).unwrap();
//! ```
//!
//! # Contexts and concurrency
//!
//! Condition and provider contexts are registry/experiment state, set before
//! resolving. A registry is built per request scope (or shared only when its
//! contexts are); it is not a place to multiplex concurrent requests with
//! different contexts. Resolution itself is runtime-agnostic async and fans
//! out concurrently while keeping registration order.

pub mod condition;
pub mod config;
pub mod error;
pub mod experiment;
pub mod live;
pub mod logger;
pub mod provider;
pub mod registry;
pub mod schema;
pub mod validation;
pub mod variant;

pub use condition::{Condition, ConditionFn};
pub use config::{Config, DEFAULT_PREFIX};
pub use error::Error;
pub use experiment::Experiment;
pub use live::{FieldSelector, LiveExperiment};
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use provider::{FixedVariantProvider, VARIANT_NAME_FIELD, VariantDescriptor, VariantProvider};
pub use registry::Experiments;
pub use schema::{ExperimentDef, ExperimentsDef, VariantDef};
pub use validation::ValidationError;
pub use variant::{FeatureMap, Variant};

/// Caller-supplied request data handed to condition predicates and variant
/// providers. An open JSON value, so embedders can pass whatever their
/// assignment backend expects.
pub type Context = serde_json::Value;
