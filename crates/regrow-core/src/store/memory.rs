//! In-memory event and settings store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{EventStore, SettingsStore};
use crate::error::StoreError;
use crate::events::{JourneyStart, NewRelapse, RelapseEvent, RelapsePatch};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<RelapseEvent>,
    journey_start: Option<JourneyStart>,
}

/// Process-local store, for tests and embedding.
///
/// `set_unavailable(true)` makes every call fail with
/// [`StoreError::Unavailable`], which is how the write-failure path is
/// exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records, stored verbatim.
    pub fn with_records(events: Vec<RelapseEvent>, journey_start: Option<JourneyStart>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                events,
                journey_start,
            }),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl EventStore for MemoryStore {
    fn list(&self) -> Result<Vec<RelapseEvent>, StoreError> {
        Ok(self.lock()?.events.clone())
    }

    fn add(&self, event: NewRelapse) -> Result<String, StoreError> {
        let mut inner = self.lock()?;
        let id = Uuid::new_v4().to_string();
        inner.events.push(event.into_event(id.clone()));
        Ok(id)
    }

    fn update(&self, id: &str, patch: &RelapsePatch) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let event = inner
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        event.apply(patch);
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    fn journey_start(&self) -> Result<Option<JourneyStart>, StoreError> {
        Ok(self.lock()?.journey_start.clone())
    }

    fn set_journey_start(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.lock()?.journey_start = Some(JourneyStart::new(at));
        Ok(())
    }
}
