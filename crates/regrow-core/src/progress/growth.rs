//! Growth stage selection.

use super::tables::{last_reached, GrowthStage};

/// The highest stage whose threshold has been reached.
///
/// Falls back to the first stage for zero or negative elapsed time, so the
/// table must be non-empty.
pub fn growth_stage(table: &[GrowthStage], elapsed_ms: i64) -> &GrowthStage {
    let index = last_reached(table, elapsed_ms).unwrap_or(0);
    &table[index]
}
