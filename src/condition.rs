//! Activation gates for experiments and variants

use std::fmt;
use std::sync::Arc;

use crate::Context;

/// Predicate evaluated against the caller-supplied condition context.
pub type ConditionFn = Arc<dyn Fn(Option<&Context>) -> bool + Send + Sync>;

/// Gate deciding whether a variant or experiment is live.
///
/// An unset condition means "live"; that default lives with the entity
/// holding the gate, not here.
#[derive(Clone)]
pub enum Condition {
    /// Fixed outcome.
    Literal(bool),

    /// Evaluated on demand against the stored condition context.
    Predicate(ConditionFn),
}

impl Condition {
    /// Gate from a predicate over the optional condition context.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(Option<&Context>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Evaluate the gate.
    pub fn evaluate(&self, context: Option<&Context>) -> bool {
        match self {
            Self::Literal(value) => *value,
            Self::Predicate(predicate) => predicate(context),
        }
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Predicate(_) => f.debug_tuple("Predicate").field(&"..").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_condition() {
        assert!(Condition::from(true).evaluate(None));
        assert!(!Condition::from(false).evaluate(None));
    }

    #[test]
    fn test_predicate_receives_context() {
        let condition = Condition::when(|context| {
            context
                .and_then(|ctx| ctx.get("customerId"))
                .and_then(|id| id.as_u64())
                .is_some_and(|id| id % 2 == 0)
        });

        let context = json!({ "customerId": 42 });
        assert!(condition.evaluate(Some(&context)));

        let context = json!({ "customerId": 7 });
        assert!(!condition.evaluate(Some(&context)));
    }

    #[test]
    fn test_predicate_without_context() {
        let condition = Condition::when(|context| context.is_none());
        assert!(condition.evaluate(None));
    }

    #[test]
    fn test_debug_formats_predicate_opaquely() {
        let condition = Condition::when(|_| true);
        assert_eq!(format!("{condition:?}"), "Predicate(\"..\")");
    }
}
