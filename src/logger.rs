//! Error sink injected into variants, experiments, and the registry

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Error;

/// Sink for contained failures.
///
/// Resolution never lets a provider or validation failure escape to the
/// caller; it reports the failure here and degrades to the inactive outcome
/// instead. Implementations decide where the report goes.
pub trait Logger: Send + Sync + Debug {
    /// Report a contained failure together with its source error.
    fn error(&self, message: &str, error: &Error);
}

/// Default [`Logger`] forwarding to the `tracing` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, message: &str, error: &Error) {
        tracing::error!(error = %error, "{}", message);
    }
}

/// [`Logger`] that discards every report, for embedders that handle
/// failures at the call site.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn error(&self, _message: &str, _error: &Error) {}
}

/// Sink used when no logger is injected.
pub(crate) fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Captures every reported failure for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingLogger {
        entries: Mutex<Vec<(String, String)>>,
    }

    impl RecordingLogger {
        pub fn new() -> Self {
            Self::default()
        }

        /// Recorded `(message, error)` pairs, in report order.
        pub fn entries(&self) -> Vec<(String, String)> {
            self.entries.lock().unwrap().clone()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.lock().unwrap().is_empty()
        }
    }

    impl Logger for RecordingLogger {
        fn error(&self, message: &str, error: &Error) {
            self.entries
                .lock()
                .unwrap()
                .push((message.to_string(), error.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::RecordingLogger;
    use super::*;

    #[test]
    fn test_recording_logger_captures_reports() {
        let logger = RecordingLogger::new();
        assert!(logger.is_empty());

        logger.error("context", &Error::provider("boom"));

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "context");
        assert_eq!(entries[0].1, "Provider error: boom");
    }

    #[test]
    fn test_noop_logger_discards_reports() {
        NoopLogger.error("ignored", &Error::provider("boom"));
    }
}
