//! Relapse event log records.
//!
//! Timestamps are kept in their persisted ISO-8601 form and parsed on read,
//! so a corrupt row reaches the streak resolver as a warning instead of a
//! crash or a silent "now".

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Format an instant the way every store writes it: UTC, millisecond
/// precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a persisted ISO-8601 / RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A single self-reported relapse.
///
/// The timestamp never changes after creation; `note` and `tags` can be
/// edited through [`RelapsePatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelapseEvent {
    pub id: String,
    /// ISO-8601 UTC instant as persisted.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub tags: IndexSet<String>,
}

impl RelapseEvent {
    pub fn new(id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp: format_timestamp(at),
            note: None,
            tags: IndexSet::new(),
        }
    }

    /// Parsed timestamp, or `None` when the stored value is malformed.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Apply an edit. The timestamp is not part of a patch and stays as is.
    pub fn apply(&mut self, patch: &RelapsePatch) {
        if let Some(note) = &patch.note {
            self.note = note.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
    }
}

/// Input for recording a new relapse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelapse {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: IndexSet<String>,
}

impl NewRelapse {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            note: None,
            tags: IndexSet::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Materialize into a stored event under the given id.
    pub fn into_event(self, id: impl Into<String>) -> RelapseEvent {
        RelapseEvent {
            id: id.into(),
            timestamp: format_timestamp(self.timestamp),
            note: self.note,
            tags: self.tags,
        }
    }
}

/// Edit for an existing relapse.
///
/// Outer `None` leaves a field untouched; `note: Some(None)` clears the note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelapsePatch {
    #[serde(default)]
    pub note: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<IndexSet<String>>,
}

impl RelapsePatch {
    pub fn is_empty(&self) -> bool {
        self.note.is_none() && self.tags.is_none()
    }
}

/// When the user started their journey. Set once on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyStart {
    /// ISO-8601 UTC instant as persisted.
    pub timestamp: String,
}

impl JourneyStart {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            timestamp: format_timestamp(at),
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Data-integrity problem found while resolving a streak.
///
/// The offending value is excluded from every computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrityWarning {
    MalformedEventTimestamp { event_id: String, raw: String },
    MalformedJourneyStart { raw: String },
}

impl std::fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityWarning::MalformedEventTimestamp { event_id, raw } => {
                write!(f, "relapse '{event_id}' has unreadable timestamp '{raw}'")
            }
            IntegrityWarning::MalformedJourneyStart { raw } => {
                write!(f, "journey start '{raw}' is unreadable")
            }
        }
    }
}
