#![forbid(unsafe_code)]

//! Core domain model and business logic for the Kalos bodyweight progression
//! system.
//!
//! This crate provides:
//! - Domain types (exercises, curricula, plans, progress, history)
//! - Catalog lookups and chain traversal
//! - Access evaluation
//! - Plan lifecycle and automatic progression
//! - Workout history and weekly streaks
//! - Document-store abstraction with memory and file backends

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod fs_store;
pub mod access;
pub mod plans;
pub mod profile;
pub mod progress;
pub mod progression;
pub mod history;
pub mod seed;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, default_catalog};
pub use config::Config;
pub use store::{collections, BatchWrite, DocumentStore, MemoryStore, Query};
pub use fs_store::FsStore;
pub use access::{can_access_exercise, can_access_skill, current_skill_exercise, skill_progress};
pub use plans::{BatchReport, NewPlan, PlanPatch, PlanStore};
pub use profile::ProfileStore;
pub use progress::ProgressStore;
pub use progression::{auto_progress_plans, check_auto_progression, AdvanceReport, PlanAdvance};
pub use history::{
    longest_weekly_streak, week_key, weekly_streak, HistoryStore, WeekKey, WorkoutStats,
};
pub use seed::{load_catalog, seed_catalog};
pub use export::export_history_csv;
