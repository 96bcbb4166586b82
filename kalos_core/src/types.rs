//! Core domain types for the Kalos progression engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their targets
//! - Skills and strength paths (curricula)
//! - Plans and plan entries
//! - Progress records and workout history
//! - User profiles
//!
//! Persisted types serialize with camelCase field names so documents match
//! the wire shape of the external store collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Movement category of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Push,
    Pull,
    Legs,
    Core,
    Skill,
    Mobility,
}

/// Difficulty level, ordered beginner < intermediate < advanced
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

/// Equipment required to perform an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    None,
    PullupBar,
    Rings,
    Parallettes,
    Band,
    Bench,
}

/// What a target value counts
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Reps,
    Time,
}

/// Performance target for an exercise: a rep count or a hold in seconds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub value: u32,
}

impl Target {
    pub fn reps(value: u32) -> Self {
        Self {
            kind: TargetKind::Reps,
            value,
        }
    }

    pub fn seconds(value: u32) -> Self {
        Self {
            kind: TargetKind::Time,
            value,
        }
    }
}

/// An exercise definition (e.g., "Diamond Push-up")
///
/// Exercises form two kinds of edges: `prerequisites` gate access, and
/// `next_progression_id` links exercises into a linear progression chain.
/// Both are id references, never in-memory pointers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub level: Level,
    pub equipment: Equipment,
    pub target: Target,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub next_progression_id: Option<String>,
}

// ============================================================================
// Curriculum Types (Skills and Strength Paths)
// ============================================================================

/// One step of a curriculum's progression, positioned by `order`
///
/// Order values are unique and monotonic within a curriculum; consumers sort
/// by `order`, never by array position.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumEntry {
    pub exercise_id: String,
    pub order: u32,
}

/// Requirements a user must meet before a curriculum unlocks
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnlockCriteria {
    pub min_level: Level,
    #[serde(default)]
    pub completed_exercise_ids: Vec<String>,
}

/// A named, ordered curriculum of exercises
///
/// Skills and strength paths share this shape; they live in separate
/// store collections (`skills` and `strengthPaths`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub progression: Vec<CurriculumEntry>,
    #[serde(default)]
    pub unlock_criteria: Option<UnlockCriteria>,
}

// ============================================================================
// Plan Types
// ============================================================================

/// Sentinel goal id for plans the user assembled by hand
pub const CUSTOM_GOAL: &str = "custom";

/// One exercise slot in a plan
///
/// The target is a copy taken at creation time and mutable independently of
/// the catalog entry, so user customization survives catalog changes and
/// automatic progression.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanExercise {
    pub exercise_id: String,
    pub sets: u32,
    pub target: Target,
}

/// A user's workout plan for one day of the week
///
/// A user owns at most one plan per `day_index` (1 = Monday .. 7 = Sunday);
/// the constraint is enforced by query pattern, not by the store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub user_id: String,
    pub goal_id: String,
    pub day_index: u8,
    pub exercises: Vec<PlanExercise>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Weekday name for a 1-based plan day index
pub fn weekday_name(day_index: u8) -> &'static str {
    match day_index {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "Unknown",
    }
}

// ============================================================================
// Progress and History Types
// ============================================================================

/// Best recorded performance for one (user, exercise) pair
///
/// `best_value` only ever increases. The set of exercise ids with a progress
/// record is the user's "completed" set, used throughout access evaluation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub user_id: String,
    pub exercise_id: String,
    pub best_value: u32,
    pub last_completed_at: DateTime<Utc>,
}

impl Progress {
    /// Store document id for a progress record
    pub fn doc_id(user_id: &str, exercise_id: &str) -> String {
        format!("{}_{}", user_id, exercise_id)
    }
}

/// Logged outcome of one exercise slot within a finished session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExercise {
    pub exercise_id: String,
    pub sets: u32,
    pub completed_sets: u32,
    pub target: Target,
    pub actual_values: Vec<u32>,
}

/// Append-only record of a finished workout session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutHistory {
    pub id: Uuid,
    pub user_id: String,
    pub plan_id: Uuid,
    pub day_index: u8,
    pub exercises: Vec<HistoryExercise>,
    pub completed_at: DateTime<Utc>,
    #[serde(default, rename = "duration")]
    pub duration_seconds: Option<u32>,
}

// ============================================================================
// User Profile
// ============================================================================

/// Kind of goal a user is training towards
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Skill,
    StrengthPath,
    Custom,
}

/// User profile fields the engine consumes (collection `users`)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub goal_type: GoalType,
    #[serde(default)]
    pub primary_goal_id: Option<String>,
    pub level: Level,
    pub training_days_per_week: u8,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete catalog of exercises, skills, and strength paths
///
/// Id-keyed maps with edges expressed as id fields; traversal is explicit,
/// there is no cyclic object graph.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: HashMap<String, Exercise>,
    pub skills: HashMap<String, Skill>,
    pub strength_paths: HashMap<String, Skill>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Beginner < Level::Intermediate);
        assert!(Level::Intermediate < Level::Advanced);
    }

    #[test]
    fn test_target_serializes_with_type_tag() {
        let target = Target::reps(10);
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["type"], "reps");
        assert_eq!(json["value"], 10);
    }

    #[test]
    fn test_plan_uses_camel_case_fields() {
        let plan = Plan {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            goal_id: CUSTOM_GOAL.into(),
            day_index: 3,
            exercises: vec![],
            completed: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("dayIndex").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_progress_doc_id() {
        assert_eq!(Progress::doc_id("u1", "pushup"), "u1_pushup");
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_name(1), "Monday");
        assert_eq!(weekday_name(7), "Sunday");
        assert_eq!(weekday_name(9), "Unknown");
    }
}
