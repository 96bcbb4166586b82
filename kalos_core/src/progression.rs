//! Automatic progression through exercise chains.
//!
//! Two halves: a pure decision function that says whether a logged best
//! value graduates an exercise to its successor, and a plan sweep that
//! substitutes the successor into every plan referencing the completed
//! exercise. The sweep is sequential and idempotent: re-running it against
//! already-advanced plans finds nothing to replace.

use crate::plans::{PlanPatch, PlanStore};
use crate::types::*;
use crate::Result;
use uuid::Uuid;

/// Decide whether a best value graduates an exercise to its successor
///
/// Returns the next exercise iff the best value meets or exceeds the
/// exercise's own target and a `next_progression_id` resolves in the
/// catalog. Pure: no state is read or written. An unknown exercise id or a
/// dangling successor id yields `None`.
pub fn check_auto_progression<'a>(
    catalog: &'a Catalog,
    exercise_id: &str,
    best_value: u32,
) -> Option<&'a Exercise> {
    let exercise = catalog.exercise(exercise_id)?;

    if best_value < exercise.target.value {
        return None;
    }

    let next_id = exercise.next_progression_id.as_deref()?;
    let next = catalog.exercise(next_id);
    if next.is_none() {
        tracing::warn!(
            "Exercise '{}' progresses to unknown '{}', not advancing",
            exercise_id,
            next_id
        );
    }
    next
}

/// One plan rewritten by an advancement sweep
#[derive(Clone, Debug)]
pub struct PlanAdvance {
    pub plan_id: Uuid,
    pub day: String,
}

/// Outcome of an advancement sweep across a user's plans
///
/// Plans written before a failure stay advanced; failures are collected
/// per plan rather than aborting the sweep.
#[derive(Clone, Debug, Default)]
pub struct AdvanceReport {
    pub advanced: Vec<PlanAdvance>,
    pub failed: Vec<(Uuid, String)>,
}

impl AdvanceReport {
    pub fn is_empty(&self) -> bool {
        self.advanced.is_empty() && self.failed.is_empty()
    }
}

/// Substitute a completed exercise's successor into every plan referencing it
///
/// Every matching entry in every owned plan is replaced with one pointing at
/// `next_id`, keeping the old entry's sets and target copy untouched so the
/// user's customization survives the swap. Only changed plans are persisted.
pub async fn auto_progress_plans(
    plans: &PlanStore,
    user_id: &str,
    completed_id: &str,
    next_id: &str,
) -> Result<AdvanceReport> {
    let owned = plans.get_all_for_user(user_id).await?;
    let mut report = AdvanceReport::default();

    for plan in owned {
        let mut changed = false;
        let exercises: Vec<PlanExercise> = plan
            .exercises
            .into_iter()
            .map(|entry| {
                if entry.exercise_id == completed_id {
                    changed = true;
                    PlanExercise {
                        exercise_id: next_id.to_string(),
                        sets: entry.sets,
                        target: entry.target,
                    }
                } else {
                    entry
                }
            })
            .collect();

        if !changed {
            continue;
        }

        let patch = PlanPatch {
            exercises: Some(exercises),
            ..Default::default()
        };
        match plans.update(&plan.id, patch).await {
            Ok(()) => {
                let day = format!("Day {} ({})", plan.day_index, weekday_name(plan.day_index));
                tracing::info!("Advanced plan {} ({}) to {}", plan.id, day, next_id);
                report.advanced.push(PlanAdvance {
                    plan_id: plan.id,
                    day,
                });
            }
            Err(e) => {
                tracing::warn!("Failed to advance plan {}: {}", plan.id, e);
                report.failed.push((plan.id, e.to_string()));
            }
        }
    }

    Ok(report)
}
