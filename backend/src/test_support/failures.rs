//! Switchable failures shared by the in-memory adapters.
//!
//! Operations are named `<port>.<method>`, for example `assignments.update` or
//! `storage.delete_object`. A tripped operation keeps failing until healed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// How an injected failure presents itself to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The backing system could not be reached.
    Unavailable,
    /// The backing system answered with an error.
    Rejected,
}

#[derive(Debug, Default)]
pub struct FailureSwitch(Mutex<HashMap<&'static str, Fault>>);

impl FailureSwitch {
    pub fn fail(&self, operation: &'static str, fault: Fault) {
        self.lock().insert(operation, fault);
    }

    pub fn heal(&self, operation: &str) {
        self.lock().remove(operation);
    }

    pub fn heal_all(&self) {
        self.lock().clear();
    }

    pub(crate) fn tripped(&self, operation: &str) -> Option<Fault> {
        self.lock().get(operation).copied()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, Fault>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
