//! Achievement unlock status and crossing detection.
//!
//! Unlocked status is never stored. It is re-derived from elapsed time on
//! every call and always agrees with history.

use serde::{Deserialize, Serialize};

use super::tables::{last_reached, Achievement};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
}

/// Unlock status for every achievement, in table order.
pub fn achievements(table: &[Achievement], elapsed_ms: i64) -> Vec<AchievementStatus> {
    table
        .iter()
        .map(|achievement| AchievementStatus {
            unlocked: achievement.threshold_ms <= elapsed_ms,
            achievement: achievement.clone(),
        })
        .collect()
}

/// Achievements crossed in the half-open interval `(previous, current]`,
/// ascending by threshold.
///
/// Empty when `previous >= current`. Suppressing an already-earned backlog
/// on first sample is the caller's job.
pub fn newly_unlocked(
    table: &[Achievement],
    current_elapsed_ms: i64,
    previous_elapsed_ms: i64,
) -> Vec<Achievement> {
    if previous_elapsed_ms >= current_elapsed_ms {
        return Vec::new();
    }
    let from = last_reached(table, previous_elapsed_ms).map_or(0, |i| i + 1);
    let to = last_reached(table, current_elapsed_ms).map_or(0, |i| i + 1);
    table[from..to].to_vec()
}

pub fn unlocked_count(table: &[Achievement], elapsed_ms: i64) -> usize {
    last_reached(table, elapsed_ms).map_or(0, |i| i + 1)
}

/// The next achievement still to unlock.
pub fn next_locked(table: &[Achievement], elapsed_ms: i64) -> Option<&Achievement> {
    table.get(unlocked_count(table, elapsed_ms))
}
