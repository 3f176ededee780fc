mod achievement;
mod checkpoint;
mod format;
mod growth;
mod guard;
mod streak;
pub mod tables;

pub use achievement::{achievements, newly_unlocked, next_locked, unlocked_count, AchievementStatus};
pub use checkpoint::{checkpoint_progress, CheckpointProgress};
pub use format::{format_duration_ms, format_percent};
pub use growth::growth_stage;
pub use guard::{GuardPhase, NotificationGuard, NotificationGuardState};
pub use streak::{resolve_streak, span_ms, StreakSnapshot};
pub use tables::{Achievement, Checkpoint, GrowthStage, ProgressTables, Threshold};
