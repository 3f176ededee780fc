//! Achievement notification guard.
//!
//! Decides when a freshly crossed achievement is celebrated. One guard
//! belongs to exactly one consumer; two consumers sharing a log would each
//! celebrate on their own, so each must own a separate guard.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --(crossing, head != last notified)--> Celebrating
//! Celebrating --(dismissed)--> Idle
//! any --(event log changed)--> Idle, memory cleared
//! ```
//!
//! A new guard is unprimed: its first sample only records the elapsed value,
//! so opening the app in the middle of a long streak does not replay every
//! achievement already earned.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::achievement::newly_unlocked;
use super::tables::Achievement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardPhase {
    Idle,
    Celebrating,
}

/// Session-scoped guard memory. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationGuardState {
    pub last_notified_achievement_id: Option<String>,
    pub previous_elapsed_ms: i64,
    pub celebration_in_flight: bool,
    /// Whether a first sample has been taken since construction.
    pub primed: bool,
}

impl Default for NotificationGuardState {
    fn default() -> Self {
        Self {
            last_notified_achievement_id: None,
            previous_elapsed_ms: 0,
            celebration_in_flight: false,
            primed: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationGuard {
    state: NotificationGuardState,
}

impl NotificationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NotificationGuardState {
        &self.state
    }

    pub fn phase(&self) -> GuardPhase {
        if self.state.celebration_in_flight {
            GuardPhase::Celebrating
        } else {
            GuardPhase::Idle
        }
    }

    /// Feed one elapsed sample. Returns the achievement to celebrate, if any.
    ///
    /// Only the earliest crossing of a batch is surfaced; later ones in the
    /// same batch are dropped.
    pub fn on_tick(&mut self, table: &[Achievement], elapsed_ms: i64) -> Option<Achievement> {
        if self.state.celebration_in_flight {
            return None;
        }

        if !self.state.primed {
            debug!(elapsed_ms, "first sample, suppressing earned backlog");
            self.state.primed = true;
            self.state.previous_elapsed_ms = elapsed_ms;
            return None;
        }

        let crossed = newly_unlocked(table, elapsed_ms, self.state.previous_elapsed_ms);
        self.state.previous_elapsed_ms = self.state.previous_elapsed_ms.max(elapsed_ms);

        let head = crossed.into_iter().next()?;
        if self.state.last_notified_achievement_id.as_deref() == Some(head.id.as_str()) {
            return None;
        }

        info!(achievement = %head.id, elapsed_ms, "achievement unlocked");
        self.state.last_notified_achievement_id = Some(head.id.clone());
        self.state.celebration_in_flight = true;
        Some(head)
    }

    /// The user closed the celebration.
    pub fn on_celebration_dismissed(&mut self) {
        self.state.celebration_in_flight = false;
    }

    /// The event log changed and the streak restarted.
    ///
    /// Clears the high-water mark so achievements from the previous streak
    /// neither block nor duplicate celebrations in the new one.
    pub fn reset_for_new_streak(&mut self) {
        debug!("resetting notification guard for new streak");
        self.state.last_notified_achievement_id = None;
        self.state.previous_elapsed_ms = 0;
        self.state.celebration_in_flight = false;
        self.state.primed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::tables::{HOUR_MS, MINUTE_MS};

    fn table() -> Vec<Achievement> {
        vec![
            Achievement::new("A", "Five", "", 5 * MINUTE_MS),
            Achievement::new("B", "Hour", "", HOUR_MS),
        ]
    }

    fn primed_at(elapsed_ms: i64) -> NotificationGuard {
        let mut guard = NotificationGuard::new();
        assert!(guard.on_tick(&table(), elapsed_ms).is_none());
        guard
    }

    #[test]
    fn first_sample_suppresses_backlog() {
        let mut guard = NotificationGuard::new();
        assert!(guard.on_tick(&table(), 10 * HOUR_MS).is_none());
        assert!(guard.state().primed);
        assert_eq!(guard.state().previous_elapsed_ms, 10 * HOUR_MS);
        assert!(guard.on_tick(&table(), 10 * HOUR_MS + 1_000).is_none());
    }

    #[test]
    fn crossing_starts_a_celebration() {
        let mut guard = primed_at(4 * MINUTE_MS);
        let hit = guard.on_tick(&table(), 6 * MINUTE_MS).unwrap();
        assert_eq!(hit.id, "A");
        assert_eq!(guard.phase(), GuardPhase::Celebrating);
        assert_eq!(guard.state().last_notified_achievement_id.as_deref(), Some("A"));
    }

    #[test]
    fn ticks_are_ignored_while_celebrating() {
        let mut guard = primed_at(4 * MINUTE_MS);
        guard.on_tick(&table(), 6 * MINUTE_MS).unwrap();
        assert!(guard.on_tick(&table(), 2 * HOUR_MS).is_none());
        assert_eq!(guard.state().previous_elapsed_ms, 6 * MINUTE_MS);

        // The crossing made during the celebration surfaces after dismissal.
        guard.on_celebration_dismissed();
        assert_eq!(guard.on_tick(&table(), 2 * HOUR_MS).map(|a| a.id), Some("B".into()));
    }

    #[test]
    fn dismissed_achievement_is_not_celebrated_again() {
        let mut guard = primed_at(4 * MINUTE_MS);
        guard.on_tick(&table(), 6 * MINUTE_MS).unwrap();
        guard.on_celebration_dismissed();
        assert_eq!(guard.phase(), GuardPhase::Idle);

        // Re-render at the same elapsed time.
        assert!(guard.on_tick(&table(), 6 * MINUTE_MS).is_none());
        assert_eq!(guard.phase(), GuardPhase::Idle);
    }

    #[test]
    fn head_matching_last_notified_is_skipped() {
        let mut guard = primed_at(4 * MINUTE_MS);
        guard.on_tick(&table(), 6 * MINUTE_MS).unwrap();
        guard.on_celebration_dismissed();

        // Force the same interval to be replayed.
        guard.state.previous_elapsed_ms = 4 * MINUTE_MS;
        assert!(guard.on_tick(&table(), 6 * MINUTE_MS).is_none());
    }

    #[test]
    fn batch_surfaces_only_earliest() {
        let mut guard = primed_at(MINUTE_MS);
        let hit = guard.on_tick(&table(), 2 * HOUR_MS).unwrap();
        assert_eq!(hit.id, "A");
        guard.on_celebration_dismissed();
        // B was in the same batch and is not queued.
        assert!(guard.on_tick(&table(), 2 * HOUR_MS + 1_000).is_none());
    }

    #[test]
    fn reset_clears_memory_in_any_phase() {
        let mut guard = primed_at(4 * MINUTE_MS);
        guard.on_tick(&table(), 6 * MINUTE_MS).unwrap();
        assert_eq!(guard.phase(), GuardPhase::Celebrating);

        guard.reset_for_new_streak();
        assert_eq!(guard.phase(), GuardPhase::Idle);
        assert_eq!(guard.state().last_notified_achievement_id, None);
        assert_eq!(guard.state().previous_elapsed_ms, 0);

        // A is celebrated again in the new streak.
        assert!(guard.on_tick(&table(), MINUTE_MS).is_none());
        assert_eq!(guard.on_tick(&table(), 5 * MINUTE_MS).map(|a| a.id), Some("A".into()));
    }

    #[test]
    fn backwards_sample_does_not_lower_high_water_mark() {
        let mut guard = primed_at(10 * MINUTE_MS);
        assert!(guard.on_tick(&table(), 2 * MINUTE_MS).is_none());
        assert_eq!(guard.state().previous_elapsed_ms, 10 * MINUTE_MS);
    }
}
