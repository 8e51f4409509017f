//! Test doubles for the coaching backend.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration tests under `tests/`. Everything here is in-process: an entity
//! store, a storage gateway that records calls, and a clock that only moves
//! when told to. Each double can be told to fail through a shared
//! [`FailureSwitch`].

mod clock;
mod failures;
mod in_memory;
mod storage;

use std::sync::Arc;

pub use clock::MutableClock;
pub use failures::{FailureSwitch, Fault};
pub use in_memory::{InMemoryStore, StoreCounts};
pub use storage::RecordingObjectStorage;

use mockable::Clock;

use crate::domain::UploadSettings;
use crate::domain::ports::ObjectStorage;
use crate::wiring::Services;

/// A full service graph over in-memory doubles that share one failure switch.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub storage: Arc<RecordingObjectStorage>,
    pub clock: Arc<MutableClock>,
    pub failures: Arc<FailureSwitch>,
    pub services: Services,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(UploadSettings::default())
    }

    pub fn with_settings(settings: UploadSettings) -> Self {
        let failures = Arc::new(FailureSwitch::default());
        let store = Arc::new(InMemoryStore::new(Arc::clone(&failures)));
        let storage = Arc::new(RecordingObjectStorage::new(Arc::clone(&failures)));
        let clock = Arc::new(MutableClock::fixed());
        let ports = store.ports(
            Arc::clone(&storage) as Arc<dyn ObjectStorage>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Self {
            services: Services::new(&ports, settings),
            store,
            storage,
            clock,
            failures,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
