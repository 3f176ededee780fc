//! Streak resolution from the relapse log.
//!
//! The resolver is recomputed from the full log on every call. Logs are
//! small, so there is no incremental state to keep in sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::events::{IntegrityWarning, JourneyStart, RelapseEvent};

/// Streak statistics at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSnapshot {
    /// Start of the open streak; `None` before the journey has started.
    pub streak_start_timestamp: Option<DateTime<Utc>>,
    /// Id of the relapse that opened the current streak, if any.
    pub latest_event_id: Option<String>,
    /// Milliseconds since `streak_start_timestamp`, never negative.
    pub elapsed_ms: i64,
    pub total_attempts: usize,
    pub best_streak_ms: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<IntegrityWarning>,
}

impl StreakSnapshot {
    /// True when the current open streak is also the best one.
    pub fn is_personal_best(&self) -> bool {
        self.streak_start_timestamp.is_some()
            && self.elapsed_ms > 0
            && self.elapsed_ms >= self.best_streak_ms
    }
}

/// Resolve the open streak and aggregate stats.
///
/// Events with an unreadable timestamp are dropped from every figure and
/// reported in [`StreakSnapshot::warnings`]. An unreadable journey start is
/// treated as absent.
pub fn resolve_streak(
    events: &[RelapseEvent],
    journey_start: Option<&JourneyStart>,
    now: DateTime<Utc>,
) -> StreakSnapshot {
    let mut warnings = Vec::new();

    let journey = journey_start.and_then(|js| match js.started_at() {
        Some(at) => Some(at),
        None => {
            warn!(raw = %js.timestamp, "ignoring unreadable journey start");
            warnings.push(IntegrityWarning::MalformedJourneyStart {
                raw: js.timestamp.clone(),
            });
            None
        }
    });

    let mut dated: Vec<(DateTime<Utc>, &str)> = Vec::with_capacity(events.len());
    for event in events {
        match event.occurred_at() {
            Some(at) => dated.push((at, event.id.as_str())),
            None => {
                warn!(
                    event_id = %event.id,
                    raw = %event.timestamp,
                    "excluding relapse with unreadable timestamp"
                );
                warnings.push(IntegrityWarning::MalformedEventTimestamp {
                    event_id: event.id.clone(),
                    raw: event.timestamp.clone(),
                });
            }
        }
    }
    // Ascending by time, ties by id, so the last entry is the streak opener.
    dated.sort_unstable();

    let latest = dated.last().copied();
    let streak_start = latest.map(|(at, _)| at).or(journey);
    let elapsed_ms = streak_start
        .map(|start| span_ms(start, now))
        .unwrap_or(0);

    let mut best_streak_ms = 0;
    if let (Some(journey), Some(&(first, _))) = (journey, dated.first()) {
        best_streak_ms = best_streak_ms.max(span_ms(journey, first));
    }
    for pair in dated.windows(2) {
        best_streak_ms = best_streak_ms.max(span_ms(pair[0].0, pair[1].0));
    }
    if streak_start.is_some() {
        best_streak_ms = best_streak_ms.max(elapsed_ms);
    }

    StreakSnapshot {
        streak_start_timestamp: streak_start,
        latest_event_id: latest.map(|(_, id)| id.to_string()),
        elapsed_ms,
        total_attempts: dated.len(),
        best_streak_ms,
        warnings,
    }
}

/// Milliseconds from `from` to `to`, clamped at zero.
pub fn span_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().max(0)
}
