//! Plan storage and lifecycle.
//!
//! A plan is a user's customized exercise list for one day of the week.
//! Plans are created explicitly (by hand or from a curriculum's progression),
//! mutated through partial patches, and deleted explicitly. Multi-plan
//! operations are sequential and report per-document outcomes instead of
//! pretending at atomicity.

use crate::store::{collections, decode_document, DocumentStore, Query};
use crate::types::*;
use crate::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Fields for a plan about to be created; the store assigns the id
#[derive(Clone, Debug)]
pub struct NewPlan {
    pub user_id: String,
    pub goal_id: String,
    pub day_index: u8,
    pub exercises: Vec<PlanExercise>,
}

/// Partial update to a plan; only present fields are written
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<PlanExercise>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Outcome of a sequential multi-plan delete
///
/// Deletions that succeeded stay committed even when later ones fail; the
/// caller decides whether to retry the remainder.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Typed plan operations over the document store
pub struct PlanStore {
    store: Arc<dyn DocumentStore>,
}

impl PlanStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a plan, assigning a fresh id
    pub async fn create(&self, new_plan: NewPlan) -> Result<Plan> {
        let plan = Plan {
            id: Uuid::new_v4(),
            user_id: new_plan.user_id,
            goal_id: new_plan.goal_id,
            day_index: new_plan.day_index,
            exercises: new_plan.exercises,
            completed: false,
            created_at: Utc::now(),
        };

        let doc = serde_json::to_value(&plan)?;
        self.store
            .set(collections::PLANS, &plan.id.to_string(), doc, false)
            .await?;

        tracing::info!(
            "Created plan {} for {} on {}",
            plan.id,
            plan.user_id,
            weekday_name(plan.day_index)
        );
        Ok(plan)
    }

    /// Create a plan holding a curriculum's full progression in order
    ///
    /// Targets are copied from the catalog at creation time; entries whose
    /// exercise is missing from the catalog are skipped with a warning.
    pub async fn create_from_curriculum(
        &self,
        user_id: &str,
        curriculum: &Skill,
        catalog: &Catalog,
        day_index: u8,
        sets: u32,
    ) -> Result<Plan> {
        let mut entries: Vec<&CurriculumEntry> = curriculum.progression.iter().collect();
        entries.sort_by_key(|entry| entry.order);

        let mut exercises = Vec::with_capacity(entries.len());
        for entry in entries {
            match catalog.exercise(&entry.exercise_id) {
                Some(exercise) => exercises.push(PlanExercise {
                    exercise_id: exercise.id.clone(),
                    sets,
                    target: exercise.target.clone(),
                }),
                None => {
                    tracing::warn!(
                        "Curriculum '{}' references unknown exercise '{}', skipping",
                        curriculum.id,
                        entry.exercise_id
                    );
                }
            }
        }

        self.create(NewPlan {
            user_id: user_id.to_string(),
            goal_id: curriculum.id.clone(),
            day_index,
            exercises,
        })
        .await
    }

    /// Fetch a plan by id; `None` when absent
    pub async fn get(&self, id: &Uuid) -> Result<Option<Plan>> {
        let doc = self.store.get(collections::PLANS, &id.to_string()).await?;
        Ok(doc.and_then(|d| decode_document(collections::PLANS, d)))
    }

    /// All plans owned by a user, ordered by day index ascending
    pub async fn get_all_for_user(&self, user_id: &str) -> Result<Vec<Plan>> {
        let query = Query::new().filter("userId", user_id).order_by("dayIndex");
        let docs = self.store.get_all(collections::PLANS, &query).await?;
        Ok(docs
            .into_iter()
            .filter_map(|d| decode_document(collections::PLANS, d))
            .collect())
    }

    /// The user's plan for a day of the week; `None` when no plan exists
    pub async fn get_for_day(&self, user_id: &str, day_index: u8) -> Result<Option<Plan>> {
        let query = Query::new()
            .filter("userId", user_id)
            .filter("dayIndex", day_index)
            .limit(1);
        let docs = self.store.get_all(collections::PLANS, &query).await?;
        Ok(docs
            .into_iter()
            .next()
            .and_then(|d| decode_document(collections::PLANS, d)))
    }

    /// Apply a partial update, leaving absent fields untouched
    pub async fn update(&self, id: &Uuid, patch: PlanPatch) -> Result<()> {
        let doc = serde_json::to_value(&patch)?;
        if doc.as_object().map(|o| o.is_empty()) == Some(true) {
            return Ok(());
        }

        self.store
            .set(collections::PLANS, &id.to_string(), doc, true)
            .await
    }

    /// Mark a plan completed; idempotent
    pub async fn mark_completed(&self, id: &Uuid) -> Result<()> {
        self.update(
            id,
            PlanPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a plan by id
    pub async fn delete(&self, id: &Uuid) -> Result<()> {
        self.store.delete(collections::PLANS, &id.to_string()).await
    }

    /// Delete every plan a user owns, one document at a time
    ///
    /// Not transactional: per-plan failures are collected and reported while
    /// the sweep continues.
    pub async fn delete_all_for_user(&self, user_id: &str) -> Result<BatchReport> {
        let query = Query::new().filter("userId", user_id);
        let docs = self.store.get_all(collections::PLANS, &query).await?;

        let mut report = BatchReport::default();
        for doc in docs {
            let Some(id) = doc.get("id").and_then(Value::as_str).map(String::from) else {
                tracing::warn!("Plan document without id field, skipping delete");
                continue;
            };

            match self.store.delete(collections::PLANS, &id).await {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    tracing::warn!("Failed to delete plan {}: {}", id, e);
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        tracing::info!(
            "Deleted {} plans for {} ({} failures)",
            report.deleted.len(),
            user_id,
            report.failed.len()
        );
        Ok(report)
    }

    /// Seed one single-exercise plan per training day (legacy behavior)
    ///
    /// Retired from the product surface but kept as the reference seeding
    /// algorithm: resolve the profile's goal curriculum, pick the **first**
    /// exercise not yet completed (the first entry when everything is
    /// complete — a starting point, unlike the display-time rule which falls
    /// back to the last entry), and create a 3-set plan for each day
    /// 1..=training_days. Regeneration is delete-all then re-seed.
    pub async fn seed_weekly_plans(
        &self,
        profile: &UserProfile,
        catalog: &Catalog,
        completed: &HashSet<String>,
    ) -> Result<Vec<Plan>> {
        const SEED_SETS: u32 = 3;

        let curriculum = match (profile.goal_type, profile.primary_goal_id.as_deref()) {
            (GoalType::Custom, _) | (_, None) => {
                tracing::info!("Profile {} has no curriculum goal, nothing to seed", profile.id);
                return Ok(Vec::new());
            }
            (GoalType::Skill, Some(goal_id)) => catalog.skill(goal_id),
            (GoalType::StrengthPath, Some(goal_id)) => catalog.strength_path(goal_id),
        };

        let Some(curriculum) = curriculum else {
            tracing::warn!(
                "Profile {} references unknown curriculum {:?}",
                profile.id,
                profile.primary_goal_id
            );
            return Ok(Vec::new());
        };

        let mut entries: Vec<&CurriculumEntry> = curriculum.progression.iter().collect();
        entries.sort_by_key(|entry| entry.order);

        let target_entry = entries
            .iter()
            .find(|entry| !completed.contains(&entry.exercise_id))
            .or_else(|| entries.first());

        let Some(exercise) = target_entry.and_then(|e| catalog.exercise(&e.exercise_id)) else {
            tracing::warn!("Curriculum '{}' has no seedable exercise", curriculum.id);
            return Ok(Vec::new());
        };

        let days = profile.training_days_per_week.min(7);
        let mut plans = Vec::with_capacity(days as usize);
        for day_index in 1..=days {
            let plan = self
                .create(NewPlan {
                    user_id: profile.id.clone(),
                    goal_id: curriculum.id.clone(),
                    day_index,
                    exercises: vec![PlanExercise {
                        exercise_id: exercise.id.clone(),
                        sets: SEED_SETS,
                        target: exercise.target.clone(),
                    }],
                })
                .await?;
            plans.push(plan);
        }

        Ok(plans)
    }
}
