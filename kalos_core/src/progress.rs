//! Per-exercise progress records.
//!
//! One record per (user, exercise) pair, created on first completion and
//! updated with a monotonically non-decreasing best value. The ids with a
//! record form the user's completed set, resolved once as a hash set and
//! passed into access evaluation.

use crate::store::{collections, decode_document, DocumentStore, Query};
use crate::types::Progress;
use crate::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Typed progress operations over the document store
pub struct ProgressStore {
    store: Arc<dyn DocumentStore>,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Record a completed exercise, keeping the best value monotonic
    ///
    /// Read-modify-write without a transaction: two concurrent sessions for
    /// the same user can lose one update. Accepted for single-device usage.
    pub async fn record_completion(
        &self,
        user_id: &str,
        exercise_id: &str,
        value: u32,
        now: DateTime<Utc>,
    ) -> Result<Progress> {
        let existing = self.get(user_id, exercise_id).await?;
        let best_value = existing
            .as_ref()
            .map(|p| p.best_value.max(value))
            .unwrap_or(value);

        let progress = Progress {
            user_id: user_id.to_string(),
            exercise_id: exercise_id.to_string(),
            best_value,
            last_completed_at: now,
        };

        let doc = serde_json::to_value(&progress)?;
        self.store
            .set(
                collections::PROGRESS,
                &Progress::doc_id(user_id, exercise_id),
                doc,
                false,
            )
            .await?;

        tracing::debug!(
            "Recorded {} for {} (best {})",
            exercise_id,
            user_id,
            best_value
        );
        Ok(progress)
    }

    /// Fetch the progress record for one exercise; `None` when never completed
    pub async fn get(&self, user_id: &str, exercise_id: &str) -> Result<Option<Progress>> {
        let doc = self
            .store
            .get(collections::PROGRESS, &Progress::doc_id(user_id, exercise_id))
            .await?;
        Ok(doc.and_then(|d| decode_document(collections::PROGRESS, d)))
    }

    /// The set of exercise ids the user has ever completed
    pub async fn completed_ids(&self, user_id: &str) -> Result<HashSet<String>> {
        let query = Query::new().filter("userId", user_id);
        let docs = self.store.get_all(collections::PROGRESS, &query).await?;
        Ok(docs
            .into_iter()
            .filter_map(|d| decode_document::<Progress>(collections::PROGRESS, d))
            .map(|p| p.exercise_id)
            .collect())
    }
}
