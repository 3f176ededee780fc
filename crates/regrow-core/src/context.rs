//! Engine context and per-consumer progress session.
//!
//! [`EngineContext`] bundles the read-only tables with the store and clock
//! collaborators. The engines behind it stay pure; the only mutable state is
//! the [`NotificationGuard`] owned by a [`ProgressSession`].
//!
//! ## Usage
//!
//! ```ignore
//! let ctx = EngineContext::new(Arc::new(ProgressTables::builtin()), store, SystemClock);
//! ctx.ensure_journey_started()?;
//! let mut session = ProgressSession::new(ctx);
//! // Once per tick:
//! let outcome = session.tick()?;
//! if let Some(achievement) = outcome.celebration {
//!     // show it, then:
//!     session.dismiss_celebration();
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::events::{JourneyStart, NewRelapse, RelapsePatch};
use crate::progress::{
    self, Achievement, AchievementStatus, CheckpointProgress, GrowthStage, NotificationGuard,
    ProgressTables, StreakSnapshot,
};
use crate::store::{EventStore, SettingsStore};

/// Everything a consumer renders for one instant.
///
/// All fields derive from a single clock sample, so they never disagree
/// about "now".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub now: DateTime<Utc>,
    pub streak: StreakSnapshot,
    pub checkpoint: CheckpointProgress,
    pub growth_stage: GrowthStage,
    pub achievements: Vec<AchievementStatus>,
    pub unlocked_count: usize,
}

/// Tables plus collaborators, injected rather than global.
#[derive(Debug)]
pub struct EngineContext<S, C = SystemClock> {
    tables: Arc<ProgressTables>,
    store: S,
    clock: C,
}

impl<S, C> EngineContext<S, C>
where
    S: EventStore + SettingsStore,
    C: Clock,
{
    pub fn new(tables: Arc<ProgressTables>, store: S, clock: C) -> Self {
        Self {
            tables,
            store,
            clock,
        }
    }

    pub fn tables(&self) -> &ProgressTables {
        &self.tables
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Return the journey start, setting it to now on first use.
    pub fn ensure_journey_started(&self) -> Result<JourneyStart> {
        if let Some(existing) = self.store.journey_start()? {
            return Ok(existing);
        }
        let now = self.clock.now();
        self.store.set_journey_start(now)?;
        info!(at = %now, "journey started");
        Ok(JourneyStart::new(now))
    }

    /// Resolve the streak at the current clock reading.
    pub fn resolve_streak(&self) -> Result<StreakSnapshot> {
        self.resolve_streak_at(self.clock.now())
    }

    pub fn resolve_streak_at(&self, now: DateTime<Utc>) -> Result<StreakSnapshot> {
        let events = self.store.list()?;
        let journey = self.store.journey_start()?;
        Ok(progress::resolve_streak(&events, journey.as_ref(), now))
    }

    pub fn checkpoint_progress(&self, elapsed_ms: i64) -> CheckpointProgress {
        progress::checkpoint_progress(self.tables.checkpoints(), elapsed_ms)
    }

    pub fn growth_stage(&self, elapsed_ms: i64) -> &GrowthStage {
        progress::growth_stage(self.tables.growth_stages(), elapsed_ms)
    }

    pub fn achievements(&self, elapsed_ms: i64) -> Vec<AchievementStatus> {
        progress::achievements(self.tables.achievements(), elapsed_ms)
    }

    pub fn newly_unlocked(&self, current_elapsed_ms: i64, previous_elapsed_ms: i64) -> Vec<Achievement> {
        progress::newly_unlocked(
            self.tables.achievements(),
            current_elapsed_ms,
            previous_elapsed_ms,
        )
    }

    /// One consistent report at the current clock reading.
    pub fn report(&self) -> Result<ProgressReport> {
        self.report_at(self.clock.now())
    }

    pub fn report_at(&self, now: DateTime<Utc>) -> Result<ProgressReport> {
        let streak = self.resolve_streak_at(now)?;
        Ok(self.report_for(streak, now))
    }

    /// Run the three engines over an already resolved streak.
    pub fn report_for(&self, streak: StreakSnapshot, now: DateTime<Utc>) -> ProgressReport {
        let elapsed_ms = streak.elapsed_ms;
        ProgressReport {
            now,
            checkpoint: self.checkpoint_progress(elapsed_ms),
            growth_stage: self.growth_stage(elapsed_ms).clone(),
            achievements: self.achievements(elapsed_ms),
            unlocked_count: progress::unlocked_count(self.tables.achievements(), elapsed_ms),
            streak,
        }
    }

    /// Record a relapse.
    ///
    /// `guard` is reset only once the store confirms and only if the streak
    /// restarted. A backdated relapse leaves the guard as it was.
    pub fn record_relapse(&self, guard: &mut NotificationGuard, event: NewRelapse) -> Result<String> {
        let now = self.clock.now();
        let mut events = self.store.list()?;
        let journey = self.store.journey_start()?;
        let before = progress::resolve_streak(&events, journey.as_ref(), now);

        let id = self.store.add(event.clone())?;
        events.push(event.into_event(id.clone()));
        let after = progress::resolve_streak(&events, journey.as_ref(), now);

        if streak_restarted(before.streak_start_timestamp, after.streak_start_timestamp) {
            info!(event_id = %id, "relapse recorded, streak restarted");
            guard.reset_for_new_streak();
        } else {
            info!(event_id = %id, "backdated relapse recorded, streak continues");
        }
        Ok(id)
    }

    /// Edit note or tags. Progress is unaffected, so no guard reset.
    pub fn edit_relapse(&self, id: &str, patch: &RelapsePatch) -> Result<()> {
        self.store.update(id, patch)?;
        debug!(event_id = %id, "relapse edited");
        Ok(())
    }
}

/// A streak restarts only when its start moves later. An earlier start
/// (a relapse backdated before the journey start) extends the same streak.
fn streak_restarted(before: Option<DateTime<Utc>>, after: Option<DateTime<Utc>>) -> bool {
    match (before, after) {
        (Some(before), Some(after)) => after > before,
        (None, Some(_)) => true,
        _ => false,
    }
}

/// Result of one session tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickOutcome {
    pub report: ProgressReport,
    pub celebration: Option<Achievement>,
}

/// One consumer's view: a context and the guard it exclusively owns.
#[derive(Debug)]
pub struct ProgressSession<S, C = SystemClock> {
    context: EngineContext<S, C>,
    guard: NotificationGuard,
    /// Streak start seen on the previous tick; `None` before the first tick.
    last_streak_start: Option<Option<DateTime<Utc>>>,
    celebrations_enabled: bool,
}

impl<S, C> ProgressSession<S, C>
where
    S: EventStore + SettingsStore,
    C: Clock,
{
    pub fn new(context: EngineContext<S, C>) -> Self {
        Self {
            context,
            guard: NotificationGuard::new(),
            last_streak_start: None,
            celebrations_enabled: true,
        }
    }

    pub fn with_celebrations(mut self, enabled: bool) -> Self {
        self.celebrations_enabled = enabled;
        self
    }

    pub fn context(&self) -> &EngineContext<S, C> {
        &self.context
    }

    pub fn guard(&self) -> &NotificationGuard {
        &self.guard
    }

    /// Sample the clock once and run every engine against that sample.
    ///
    /// If the streak restarted since the last tick (a relapse landed
    /// through another writer), the guard is reset before crossings are
    /// compared.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let report = self.context.report()?;
        let start = report.streak.streak_start_timestamp;

        if let Some(previous) = self.last_streak_start {
            if streak_restarted(previous, start) {
                info!(?previous, current = ?start, "streak restarted");
                self.guard.reset_for_new_streak();
            }
        }
        self.last_streak_start = Some(start);

        let celebration = if self.celebrations_enabled {
            self.guard
                .on_tick(self.context.tables.achievements(), report.streak.elapsed_ms)
        } else {
            None
        };

        debug!(
            elapsed_ms = report.streak.elapsed_ms,
            stage = %report.growth_stage.id,
            progress = report.checkpoint.progress,
            "tick"
        );
        Ok(TickOutcome {
            report,
            celebration,
        })
    }

    pub fn dismiss_celebration(&mut self) {
        self.guard.on_celebration_dismissed();
    }

    pub fn record_relapse(&mut self, event: NewRelapse) -> Result<String> {
        self.context.record_relapse(&mut self.guard, event)
    }

    pub fn edit_relapse(&self, id: &str, patch: &RelapsePatch) -> Result<()> {
        self.context.edit_relapse(id, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{CoreError, StoreError};
    use crate::progress::tables::{Checkpoint, GrowthStage, DAY_MS, HOUR_MS, MINUTE_MS};
    use crate::progress::GuardPhase;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()
    }

    fn small_tables() -> Arc<ProgressTables> {
        Arc::new(ProgressTables::new(
            vec![
                Checkpoint::new("1d", "1 day", DAY_MS),
                Checkpoint::new("7d", "1 week", 7 * DAY_MS),
            ],
            vec![
                Achievement::new("A", "Five", "", 5 * MINUTE_MS),
                Achievement::new("B", "Hour", "", HOUR_MS),
            ],
            vec![
                GrowthStage::new("seed", "Seed", 0),
                GrowthStage::new("sprout", "Sprout", DAY_MS),
            ],
        ))
    }

    fn context(clock: &ManualClock) -> EngineContext<MemoryStore, &ManualClock> {
        EngineContext::new(small_tables(), MemoryStore::new(), clock)
    }

    #[test]
    fn journey_start_is_set_once() {
        let clock = ManualClock::new(start());
        let ctx = context(&clock);
        let first = ctx.ensure_journey_started().unwrap();
        clock.advance(Duration::days(1));
        let second = ctx.ensure_journey_started().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.started_at(), Some(start()));
    }

    #[test]
    fn report_is_consistent_for_one_sample() {
        let clock = ManualClock::new(start());
        let ctx = context(&clock);
        ctx.ensure_journey_started().unwrap();
        clock.advance(Duration::hours(12));

        let report = ctx.report().unwrap();
        assert_eq!(report.streak.elapsed_ms, 12 * HOUR_MS);
        assert_eq!(report.checkpoint.progress, 0.5);
        assert_eq!(report.growth_stage.id, "seed");
        assert_eq!(report.unlocked_count, 2);
        assert!(report.achievements.iter().all(|a| a.unlocked));
    }

    #[test]
    fn failed_write_leaves_guard_untouched() {
        let clock = ManualClock::new(start());
        let ctx = context(&clock);
        let mut guard = NotificationGuard::new();
        guard.on_tick(ctx.tables().achievements(), 4 * MINUTE_MS);
        guard.on_tick(ctx.tables().achievements(), 6 * MINUTE_MS).unwrap();
        let before = guard.state().clone();

        ctx.store().set_unavailable(true);
        let err = ctx
            .record_relapse(&mut guard, NewRelapse::at(clock.now()))
            .unwrap_err();
        assert!(matches!(err, CoreError::Store(StoreError::Unavailable(_))));
        assert_eq!(guard.state(), &before);
    }

    #[test]
    fn session_celebrates_once_and_resets_on_relapse() {
        let clock = ManualClock::new(start());
        let ctx = context(&clock);
        ctx.ensure_journey_started().unwrap();
        let mut session = ProgressSession::new(ctx);

        clock.advance(Duration::minutes(4));
        assert!(session.tick().unwrap().celebration.is_none());

        clock.advance(Duration::minutes(2));
        let outcome = session.tick().unwrap();
        assert_eq!(outcome.celebration.map(|a| a.id), Some("A".into()));
        assert_eq!(session.guard().phase(), GuardPhase::Celebrating);

        session.dismiss_celebration();
        assert!(session.tick().unwrap().celebration.is_none());

        session.record_relapse(NewRelapse::at(clock.now())).unwrap();
        assert_eq!(session.guard().state().previous_elapsed_ms, 0);

        clock.advance(Duration::minutes(5));
        let outcome = session.tick().unwrap();
        assert_eq!(outcome.report.streak.elapsed_ms, 5 * MINUTE_MS);
        assert_eq!(outcome.celebration.map(|a| a.id), Some("A".into()));
    }

    #[test]
    fn backdated_relapse_does_not_repeat_celebration() {
        let clock = ManualClock::new(start());
        let ctx = context(&clock);
        ctx.ensure_journey_started().unwrap();
        let mut session = ProgressSession::new(ctx);
        session.tick().unwrap();

        clock.advance(Duration::minutes(6));
        let outcome = session.tick().unwrap();
        assert_eq!(outcome.celebration.map(|a| a.id), Some("A".into()));
        session.dismiss_celebration();

        clock.advance(Duration::days(2));
        let outcome = session.tick().unwrap();
        assert_eq!(outcome.celebration.map(|a| a.id), Some("B".into()));
        session.dismiss_celebration();
        let guard_before = session.guard().state().clone();

        // Older than the journey start: the streak only gets longer.
        session
            .record_relapse(NewRelapse::at(start() - Duration::days(7)))
            .unwrap();
        assert_eq!(session.guard().state(), &guard_before);

        clock.advance(Duration::minutes(1));
        let outcome = session.tick().unwrap();
        assert_eq!(
            outcome.report.streak.streak_start_timestamp,
            Some(start() - Duration::days(7))
        );
        assert_eq!(outcome.report.streak.total_attempts, 1);
        assert!(outcome.celebration.is_none());
    }

    #[test]
    fn restart_rule_only_fires_on_later_start() {
        let t = start();
        assert!(streak_restarted(None, Some(t)));
        assert!(streak_restarted(Some(t), Some(t + Duration::hours(1))));
        assert!(!streak_restarted(Some(t), Some(t)));
        assert!(!streak_restarted(Some(t), Some(t - Duration::days(1))));
        assert!(!streak_restarted(None, None));
    }

    #[test]
    fn session_notices_relapse_from_another_writer() {
        let clock = ManualClock::new(start());
        let ctx = context(&clock);
        ctx.ensure_journey_started().unwrap();
        let mut session = ProgressSession::new(ctx);

        clock.advance(Duration::hours(2));
        session.tick().unwrap();

        // Written directly to the store, bypassing the session.
        session
            .context()
            .store()
            .add(NewRelapse::at(clock.now()))
            .unwrap();

        clock.advance(Duration::minutes(6));
        let outcome = session.tick().unwrap();
        assert_eq!(outcome.celebration.map(|a| a.id), Some("A".into()));
    }

    #[test]
    fn disabled_celebrations_never_fire() {
        let clock = ManualClock::new(start());
        let ctx = context(&clock);
        ctx.ensure_journey_started().unwrap();
        let mut session = ProgressSession::new(ctx).with_celebrations(false);

        session.tick().unwrap();
        clock.advance(Duration::hours(2));
        assert!(session.tick().unwrap().celebration.is_none());
    }
}
