//! Checkpoint ladder progress.

use serde::{Deserialize, Serialize};

use super::tables::{last_reached, Checkpoint};

/// Where an elapsed duration sits on the checkpoint ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointProgress {
    pub current_checkpoint: Option<Checkpoint>,
    pub next_checkpoint: Option<Checkpoint>,
    /// Index of `current_checkpoint` in the table.
    pub current_index: Option<usize>,
    /// 0.0 ..= 1.0 between the current and next checkpoint.
    pub progress: f64,
    pub is_completed: bool,
    /// Milliseconds left until `next_checkpoint`; 0 once completed.
    pub remaining_ms: i64,
}

/// Map elapsed time onto the ladder.
///
/// `table` must be non-empty and strictly ascending, which
/// [`super::tables::ProgressTables`] guarantees.
pub fn checkpoint_progress(table: &[Checkpoint], elapsed_ms: i64) -> CheckpointProgress {
    let Some(first) = table.first() else {
        return CheckpointProgress {
            current_checkpoint: None,
            next_checkpoint: None,
            current_index: None,
            progress: 0.0,
            is_completed: false,
            remaining_ms: 0,
        };
    };

    if elapsed_ms <= 0 {
        return CheckpointProgress {
            current_checkpoint: None,
            next_checkpoint: Some(first.clone()),
            current_index: None,
            progress: 0.0,
            is_completed: false,
            remaining_ms: first.duration_ms,
        };
    }

    let reached = last_reached(table, elapsed_ms);
    if reached == Some(table.len() - 1) {
        return CheckpointProgress {
            current_checkpoint: table.last().cloned(),
            next_checkpoint: None,
            current_index: reached,
            progress: 1.0,
            is_completed: true,
            remaining_ms: 0,
        };
    }

    let current = reached.map(|i| &table[i]);
    let next = &table[reached.map_or(0, |i| i + 1)];
    let start = current.map_or(0, |c| c.duration_ms);
    let end = next.duration_ms;
    let span = end - start;
    let progress = if span > 0 {
        ((elapsed_ms - start) as f64 / span as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    CheckpointProgress {
        current_checkpoint: current.cloned(),
        next_checkpoint: Some(next.clone()),
        current_index: reached,
        progress,
        is_completed: false,
        remaining_ms: (end - elapsed_ms).max(0),
    }
}
