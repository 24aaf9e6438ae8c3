use super::{CollaboratorError, Geoprocessor, Invocation};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Records every invocation; fails the operations it was told to fail.
///
/// Clones share their history, so a test can keep one handle and give
/// another to the router.
#[derive(Clone, Default)]
pub struct RecordingGeoprocessor {
    call_history: Arc<Mutex<Vec<Invocation>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingGeoprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` (`family.function` or bare function) fail
    pub fn fail_on(self, operation: &str) -> Self {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(operation.to_string());
        }
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.call_history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Operation names in call order
    pub fn operations(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|invocation| invocation.operation)
            .collect()
    }

    pub fn verify_called(&self, operation: &str, times: usize) -> bool {
        let count = self
            .invocations()
            .iter()
            .filter(|invocation| Self::names(invocation).contains(&operation))
            .count();
        count == times
    }

    fn names(invocation: &Invocation) -> [&str; 2] {
        [invocation.operation.as_str(), invocation.arguments.function()]
    }
}

impl Geoprocessor for RecordingGeoprocessor {
    fn execute(&self, invocation: &Invocation) -> Result<(), CollaboratorError> {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(invocation.clone());
        }

        let failing = self
            .failing
            .lock()
            .map(|failing| {
                Self::names(invocation)
                    .iter()
                    .any(|name| failing.contains(*name))
            })
            .unwrap_or(false);
        if failing {
            return Err(CollaboratorError::Injected(format!(
                "{} failed on request",
                invocation.operation
            )));
        }
        Ok(())
    }
}
