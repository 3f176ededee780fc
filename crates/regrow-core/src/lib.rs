//! # Regrow Core Library
//!
//! This library provides the progress and achievement engine behind Regrow.
//! Like the CLI built on top of it, every consumer gets the same pure
//! computations; only storage and the clock are injected.
//!
//! ## Architecture
//!
//! - **Streak Resolver**: turns the relapse log, the journey start and "now"
//!   into elapsed time, best streak and attempt count
//! - **Engines**: checkpoint ladder, growth stage and achievement unlocks,
//!   each a pure function of elapsed time
//! - **Notification Guard**: two-state machine that celebrates each crossed
//!   achievement once per streak
//! - **Storage**: SQLite relapse log and TOML configuration
//!
//! ## Key Components
//!
//! - [`EngineContext`]: tables plus store and clock collaborators
//! - [`ProgressSession`]: a context paired with the guard it owns
//! - [`Ticker`]: cancelable periodic driver
//! - [`Database`]: relapse and settings persistence
//! - [`Config`]: application configuration management

pub mod clock;
pub mod context;
pub mod error;
pub mod events;
pub mod progress;
pub mod storage;
pub mod store;
pub mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{EngineContext, ProgressReport, ProgressSession, TickOutcome};
pub use error::{ConfigError, CoreError, StoreError, TableError};
pub use events::{IntegrityWarning, JourneyStart, NewRelapse, RelapseEvent, RelapsePatch};
pub use progress::{
    Achievement, AchievementStatus, Checkpoint, CheckpointProgress, GrowthStage, GuardPhase,
    NotificationGuard, ProgressTables, StreakSnapshot,
};
pub use storage::{Config, Database};
pub use store::{EventStore, MemoryStore, SettingsStore};
pub use ticker::Ticker;
