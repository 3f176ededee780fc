//! SQLite-based relapse log and settings storage.
//!
//! Provides persistent storage for:
//! - Relapse events (timestamp, note, tags)
//! - Key-value store for journey settings

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{data_dir, migrations};
use crate::error::StoreError;
use crate::events::{format_timestamp, JourneyStart, NewRelapse, RelapseEvent, RelapsePatch};
use crate::store::{EventStore, SettingsStore};

const JOURNEY_START_KEY: &str = "journey_start";

/// SQLite database backing the event and settings stores.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/regrow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::open_at(&dir.join("regrow.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        migrations::migrate(&self.conn)?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Fetch one relapse by id.
    pub fn get(&self, id: &str) -> Result<Option<RelapseEvent>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, timestamp, note, tags FROM relapses WHERE id = ?1",
                params![id],
                read_row,
            )
            .optional()?;
        row.map(decode_row).transpose()
    }
}

type RawRow = (String, String, Option<String>, String);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_row((id, timestamp, note, tags): RawRow) -> Result<RelapseEvent, StoreError> {
    let tags: IndexSet<String> =
        serde_json::from_str(&tags).map_err(|e| StoreError::CorruptTags {
            id: id.clone(),
            message: e.to_string(),
        })?;
    Ok(RelapseEvent {
        id,
        timestamp,
        note,
        tags,
    })
}

fn encode_tags(tags: &IndexSet<String>) -> Result<String, StoreError> {
    serde_json::to_string(tags).map_err(|e| StoreError::Query(e.to_string()))
}

impl EventStore for Database {
    fn list(&self) -> Result<Vec<RelapseEvent>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, timestamp, note, tags FROM relapses ORDER BY timestamp, id")?;
        let rows = stmt.query_map([], read_row)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(decode_row(row?)?);
        }
        Ok(events)
    }

    fn add(&self, event: NewRelapse) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO relapses (id, timestamp, note, tags) VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                format_timestamp(event.timestamp),
                event.note,
                encode_tags(&event.tags)?,
            ],
        )?;
        Ok(id)
    }

    fn update(&self, id: &str, patch: &RelapsePatch) -> Result<(), StoreError> {
        let mut event = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        event.apply(patch);

        // Timestamp is immutable: only note and tags are written.
        self.conn.execute(
            "UPDATE relapses SET note = ?2, tags = ?3 WHERE id = ?1",
            params![id, event.note, encode_tags(&event.tags)?],
        )?;
        Ok(())
    }
}

impl SettingsStore for Database {
    fn journey_start(&self) -> Result<Option<JourneyStart>, StoreError> {
        Ok(self
            .kv_get(JOURNEY_START_KEY)?
            .map(|timestamp| JourneyStart { timestamp }))
    }

    fn set_journey_start(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.kv_set(JOURNEY_START_KEY, &format_timestamp(at))
    }
}
