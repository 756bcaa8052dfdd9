//! Cross-collaborator call recording.

use std::sync::{Arc, Mutex};

/// An ordered record of calls shared between test doubles, used to assert
/// the sequence in which collaborators were reached.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call name.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn record(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    /// Returns a snapshot of the recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}
