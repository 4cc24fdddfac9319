use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;

use crate::Context;
use crate::error::Error;

/// Canonical descriptor field carrying the live variant's name.
pub const VARIANT_NAME_FIELD: &str = "variantName";

/// Open map returned by a [`VariantProvider`], expected to carry at least
/// the live variant's name.
///
/// Providers are free to attach whatever else their assignment backend
/// returns; [`FieldSelector`](crate::FieldSelector) entries pick fields out
/// of it during live resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantDescriptor {
    fields: Map<String, Value>,
}

impl VariantDescriptor {
    /// Empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor carrying `name` under [`VARIANT_NAME_FIELD`].
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_field(VARIANT_NAME_FIELD, name.into())
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Field value, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The live variant's name, when the canonical field holds a string.
    pub fn variant_name(&self) -> Option<&str> {
        self.fields.get(VARIANT_NAME_FIELD).and_then(Value::as_str)
    }
}

/// Resolves which variant of an experiment is live for a request context.
///
/// Implementations typically call out to a bucketing or assignment service;
/// the library never decides assignments itself. Failures are contained by
/// the owning [`Experiment`](crate::Experiment): they are reported to its
/// logger and resolved as "no live variant", never surfaced to the caller.
///
/// Plain async closures over an owned context implement this trait, so the
/// simplest provider is a closure:
///
/// ```
/// use absee::{Context, Error, VariantDescriptor};
///
/// let provider = |_context: Option<Context>| async move {
///     Ok::<_, Error>(VariantDescriptor::named("treatment"))
/// };
/// # let _ = provider;
/// ```
#[async_trait]
pub trait VariantProvider: Send + Sync {
    /// Resolve the live variant descriptor for `context`.
    async fn resolve(&self, context: Option<&Context>) -> Result<VariantDescriptor, Error>;
}

#[async_trait]
impl<F, Fut> VariantProvider for F
where
    F: Fn(Option<Context>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<VariantDescriptor, Error>> + Send + 'static,
{
    async fn resolve(&self, context: Option<&Context>) -> Result<VariantDescriptor, Error> {
        self(context.cloned()).await
    }
}

/// Provider that always resolves the same descriptor. Useful for rollouts
/// driven by configuration rather than a live assignment service.
#[derive(Debug, Clone)]
pub struct FixedVariantProvider {
    descriptor: VariantDescriptor,
}

impl FixedVariantProvider {
    pub fn new(descriptor: VariantDescriptor) -> Self {
        Self { descriptor }
    }
}

#[async_trait]
impl VariantProvider for FixedVariantProvider {
    async fn resolve(&self, _context: Option<&Context>) -> Result<VariantDescriptor, Error> {
        Ok(self.descriptor.clone())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted [`VariantProvider`] that records every invocation.
    #[derive(Debug, Default)]
    pub struct MockVariantProvider {
        descriptor: Option<VariantDescriptor>,
        error: Option<String>,
        calls: AtomicUsize,
        contexts: Mutex<Vec<Option<Context>>>,
    }

    impl MockVariantProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_descriptor(mut self, descriptor: VariantDescriptor) -> Self {
            self.descriptor = Some(descriptor);
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        /// Number of times `resolve` ran.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Contexts `resolve` was invoked with, in call order.
        pub fn contexts(&self) -> Vec<Option<Context>> {
            self.contexts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VariantProvider for MockVariantProvider {
        async fn resolve(&self, context: Option<&Context>) -> Result<VariantDescriptor, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.contexts.lock().unwrap().push(context.cloned());

            if let Some(ref error) = self.error {
                return Err(Error::provider(error));
            }

            self.descriptor
                .clone()
                .ok_or_else(|| Error::provider("No mock descriptor configured"))
        }
    }
}
