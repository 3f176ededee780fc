//! Collaborator interfaces for the relapse log and journey settings.
//!
//! The engines never write. Everything that persists goes through these
//! traits, and every error they raise is handed back to the caller as is.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::events::{JourneyStart, NewRelapse, RelapseEvent, RelapsePatch};

/// The relapse event log.
pub trait EventStore {
    /// All events, in any order.
    fn list(&self) -> Result<Vec<RelapseEvent>, StoreError>;

    /// Append an event and return its new id.
    fn add(&self, event: NewRelapse) -> Result<String, StoreError>;

    /// Edit note/tags. Never changes the timestamp.
    fn update(&self, id: &str, patch: &RelapsePatch) -> Result<(), StoreError>;
}

/// Journey-level settings.
pub trait SettingsStore {
    fn journey_start(&self) -> Result<Option<JourneyStart>, StoreError>;

    /// Called at most once under normal operation, on first run.
    fn set_journey_start(&self, at: DateTime<Utc>) -> Result<(), StoreError>;
}

impl<T: EventStore + ?Sized> EventStore for &T {
    fn list(&self) -> Result<Vec<RelapseEvent>, StoreError> {
        (**self).list()
    }

    fn add(&self, event: NewRelapse) -> Result<String, StoreError> {
        (**self).add(event)
    }

    fn update(&self, id: &str, patch: &RelapsePatch) -> Result<(), StoreError> {
        (**self).update(id, patch)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn journey_start(&self) -> Result<Option<JourneyStart>, StoreError> {
        (**self).journey_start()
    }

    fn set_journey_start(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        (**self).set_journey_start(at)
    }
}
