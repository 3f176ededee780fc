//! Static milestone tables: checkpoints, achievements and growth stages.
//!
//! Each table is sorted strictly ascending by threshold with unique ids.
//! A table that breaks this is a build defect, so [`ProgressTables::new`]
//! panics on it; [`ProgressTables::try_new`] hands back the [`TableError`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::TableError;

pub const MINUTE_MS: i64 = 60 * 1000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// A row keyed by a duration threshold.
pub trait Threshold {
    fn id(&self) -> &str;
    fn threshold_ms(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: String,
    pub label: String,
    pub duration_ms: i64,
}

impl Checkpoint {
    pub fn new(id: impl Into<String>, label: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            duration_ms,
        }
    }
}

impl Threshold for Checkpoint {
    fn id(&self) -> &str {
        &self.id
    }

    fn threshold_ms(&self) -> i64 {
        self.duration_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub threshold_ms: i64,
}

impl Achievement {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        threshold_ms: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            threshold_ms,
        }
    }
}

impl Threshold for Achievement {
    fn id(&self) -> &str {
        &self.id
    }

    fn threshold_ms(&self) -> i64 {
        self.threshold_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStage {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub threshold_ms: i64,
}

impl GrowthStage {
    pub fn new(id: impl Into<String>, label: impl Into<String>, threshold_ms: i64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            threshold_ms,
        }
    }
}

impl Threshold for GrowthStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn threshold_ms(&self) -> i64 {
        self.threshold_ms
    }
}

/// Check the ascending/unique invariant for one table.
pub fn validate<T: Threshold>(
    table: &'static str,
    rows: &[T],
    allow_empty: bool,
) -> Result<(), TableError> {
    if rows.is_empty() && !allow_empty {
        return Err(TableError::Empty { table });
    }

    let mut seen = HashSet::with_capacity(rows.len());
    let mut previous: Option<&T> = None;
    for row in rows {
        if row.threshold_ms() < 0 {
            return Err(TableError::NegativeThreshold {
                table,
                id: row.id().to_string(),
                threshold_ms: row.threshold_ms(),
            });
        }
        if !seen.insert(row.id()) {
            return Err(TableError::DuplicateId {
                table,
                id: row.id().to_string(),
            });
        }
        if let Some(prev) = previous {
            if row.threshold_ms() <= prev.threshold_ms() {
                return Err(TableError::NotAscending {
                    table,
                    id: row.id().to_string(),
                    threshold_ms: row.threshold_ms(),
                    previous_id: prev.id().to_string(),
                    previous_ms: prev.threshold_ms(),
                });
            }
        }
        previous = Some(row);
    }
    Ok(())
}

/// Index of the last row whose threshold is `<= elapsed_ms`.
///
/// Relies on the table being sorted ascending.
pub(crate) fn last_reached<T: Threshold>(rows: &[T], elapsed_ms: i64) -> Option<usize> {
    rows.partition_point(|row| row.threshold_ms() <= elapsed_ms)
        .checked_sub(1)
}

/// The three validated tables the engines read from.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressTables {
    checkpoints: Vec<Checkpoint>,
    achievements: Vec<Achievement>,
    growth_stages: Vec<GrowthStage>,
}

impl ProgressTables {
    /// Validate and build the tables.
    ///
    /// # Panics
    ///
    /// Panics if any table is empty (achievements excepted), unsorted,
    /// has a negative threshold or a duplicate id.
    pub fn new(
        checkpoints: Vec<Checkpoint>,
        achievements: Vec<Achievement>,
        growth_stages: Vec<GrowthStage>,
    ) -> Self {
        match Self::try_new(checkpoints, achievements, growth_stages) {
            Ok(tables) => tables,
            Err(err) => panic!("misconfigured progress table: {err}"),
        }
    }

    pub fn try_new(
        checkpoints: Vec<Checkpoint>,
        achievements: Vec<Achievement>,
        growth_stages: Vec<GrowthStage>,
    ) -> Result<Self, TableError> {
        validate("checkpoint", &checkpoints, false)?;
        validate("achievement", &achievements, true)?;
        validate("growth stage", &growth_stages, false)?;
        Ok(Self {
            checkpoints,
            achievements,
            growth_stages,
        })
    }

    /// The ladder shipped with the app.
    pub fn builtin() -> Self {
        Self::new(
            builtin_checkpoints(),
            builtin_achievements(),
            builtin_growth_stages(),
        )
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn growth_stages(&self) -> &[GrowthStage] {
        &self.growth_stages
    }
}

impl Default for ProgressTables {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn builtin_checkpoints() -> Vec<Checkpoint> {
    vec![
        Checkpoint::new("6h", "6 hours", 6 * HOUR_MS),
        Checkpoint::new("1d", "1 day", DAY_MS),
        Checkpoint::new("3d", "3 days", 3 * DAY_MS),
        Checkpoint::new("7d", "1 week", 7 * DAY_MS),
        Checkpoint::new("14d", "2 weeks", 14 * DAY_MS),
        Checkpoint::new("30d", "1 month", 30 * DAY_MS),
        Checkpoint::new("60d", "2 months", 60 * DAY_MS),
        Checkpoint::new("90d", "3 months", 90 * DAY_MS),
        Checkpoint::new("180d", "6 months", 180 * DAY_MS),
        Checkpoint::new("1y", "1 year", 365 * DAY_MS),
    ]
}

pub fn builtin_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "first-steps",
            "First Steps",
            "Five minutes in. Every streak starts here.",
            5 * MINUTE_MS,
        ),
        Achievement::new("one-hour", "One Hour Strong", "A full hour behind you.", HOUR_MS),
        Achievement::new(
            "half-day",
            "Half a Day",
            "Twelve hours of steady ground.",
            12 * HOUR_MS,
        ),
        Achievement::new("day-one", "Day One", "Your first full day.", DAY_MS),
        Achievement::new(
            "three-days",
            "Three Days",
            "The hardest stretch is often the first few days.",
            3 * DAY_MS,
        ),
        Achievement::new("one-week", "One Week", "Seven days in a row.", 7 * DAY_MS),
        Achievement::new("two-weeks", "Two Weeks", "Fourteen days of momentum.", 14 * DAY_MS),
        Achievement::new("one-month", "One Month", "Thirty days. A real habit.", 30 * DAY_MS),
        Achievement::new("two-months", "Two Months", "Sixty days and counting.", 60 * DAY_MS),
        Achievement::new(
            "ninety-days",
            "Ninety Days",
            "Three months of new patterns.",
            90 * DAY_MS,
        ),
        Achievement::new(
            "half-year",
            "Half a Year",
            "Six months of growth.",
            180 * DAY_MS,
        ),
        Achievement::new("one-year", "One Year", "A full trip around the sun.", 365 * DAY_MS),
    ]
}

pub fn builtin_growth_stages() -> Vec<GrowthStage> {
    vec![
        GrowthStage::new("seed", "Seed", 0),
        GrowthStage::new("sprout", "Sprout", DAY_MS),
        GrowthStage::new("seedling", "Seedling", 3 * DAY_MS),
        GrowthStage::new("sapling", "Sapling", 7 * DAY_MS),
        GrowthStage::new("young-tree", "Young Tree", 30 * DAY_MS),
        GrowthStage::new("tree", "Tree", 90 * DAY_MS),
        GrowthStage::new("ancient-tree", "Ancient Tree", 365 * DAY_MS),
    ]
}
