//! Workout history and weekly adherence streaks.
//!
//! History records are append-only: saved once when a session finishes and
//! never mutated. Streaks are computed over the set of distinct week keys in
//! the log, where a week key is derived from a Sunday-based
//! weeks-since-January-1st count.

use crate::store::{collections, decode_document, DocumentStore, Query};
use crate::types::WorkoutHistory;
use crate::Result;
use chrono::{DateTime, Datelike, Duration, Utc};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Week keys
// ============================================================================

/// A calendar week, identified by year and 1-based week number
///
/// Week numbering is `ceil((days_since_jan1 + weekday_of_jan1 + 1) / 7)`
/// with a Sunday-based weekday, so week 1 starts on January 1st and weeks
/// roll over on Sundays. Late-December days can land in week 53.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    /// The immediately preceding week
    ///
    /// Week 1 wraps to the prior year's week 52. Years ending in a week 53
    /// are not special-cased, so a streak spanning such a boundary breaks;
    /// the cost is a conservatively shorter streak once every few years.
    pub fn prev(self) -> WeekKey {
        if self.week > 1 {
            WeekKey {
                year: self.year,
                week: self.week - 1,
            }
        } else {
            WeekKey {
                year: self.year - 1,
                week: 52,
            }
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{}", self.year, self.week)
    }
}

/// The week key a timestamp falls into
pub fn week_key(at: DateTime<Utc>) -> WeekKey {
    let date = at.date_naive();
    let jan1 = date - Duration::days(i64::from(date.ordinal0()));
    let offset = jan1.weekday().num_days_from_sunday();
    let week = (date.ordinal0() + offset + 1 + 6) / 7;

    WeekKey {
        year: date.year(),
        week,
    }
}

// ============================================================================
// Streaks
// ============================================================================

/// Consecutive workout weeks ending at the current week
///
/// 0 when the current week has no workout; otherwise counts backwards while
/// each preceding week is present.
pub fn weekly_streak(weeks: &HashSet<WeekKey>, now: DateTime<Utc>) -> u32 {
    let mut key = week_key(now);
    if !weeks.contains(&key) {
        return 0;
    }

    let mut streak = 1;
    loop {
        key = key.prev();
        if weeks.contains(&key) {
            streak += 1;
        } else {
            return streak;
        }
    }
}

/// Longest run of consecutive workout weeks anywhere in the log
pub fn longest_weekly_streak(weeks: &HashSet<WeekKey>) -> u32 {
    let mut sorted: Vec<WeekKey> = weeks.iter().copied().collect();
    sorted.sort();
    sorted.reverse();

    let mut longest = 0;
    let mut run = 0;
    for i in 0..sorted.len() {
        if i == 0 || sorted[i] != sorted[i - 1].prev() {
            run = 1;
        } else {
            run += 1;
        }
        longest = longest.max(run);
    }
    longest
}

// ============================================================================
// History store
// ============================================================================

/// Aggregate workout statistics for a user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    /// Exercise slots across all sessions, not completed sets
    pub total_exercises: usize,
    pub weekly_streak: u32,
    pub longest_weekly_streak: u32,
}

/// Typed history operations over the document store
pub struct HistoryStore {
    store: Arc<dyn DocumentStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append a finished session to the log
    pub async fn append(&self, record: &WorkoutHistory) -> Result<()> {
        let doc = serde_json::to_value(record)?;
        self.store
            .set(
                collections::WORKOUT_HISTORY,
                &record.id.to_string(),
                doc,
                false,
            )
            .await?;

        tracing::info!("Logged workout {} for {}", record.id, record.user_id);
        Ok(())
    }

    /// All of a user's sessions, newest first
    pub async fn all_for_user(&self, user_id: &str) -> Result<Vec<WorkoutHistory>> {
        let query = Query::new()
            .filter("userId", user_id)
            .order_by_desc("completedAt");
        let docs = self
            .store
            .get_all(collections::WORKOUT_HISTORY, &query)
            .await?;
        Ok(docs
            .into_iter()
            .filter_map(|d| decode_document(collections::WORKOUT_HISTORY, d))
            .collect())
    }

    /// Totals and streaks computed over the user's full log
    pub async fn stats(&self, user_id: &str, now: DateTime<Utc>) -> Result<WorkoutStats> {
        let records = self.all_for_user(user_id).await?;

        let total_workouts = records.len();
        let total_exercises = records.iter().map(|r| r.exercises.len()).sum();
        let weeks: HashSet<WeekKey> = records.iter().map(|r| week_key(r.completed_at)).collect();

        Ok(WorkoutStats {
            total_workouts,
            total_exercises,
            weekly_streak: weekly_streak(&weeks, now),
            longest_weekly_streak: longest_weekly_streak(&weeks),
        })
    }
}
