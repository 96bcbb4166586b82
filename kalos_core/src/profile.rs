//! User profile records (collection `users`).
//!
//! The engine only reads the profile fields that drive plan seeding and
//! access evaluation; identity and entitlement live outside this crate.

use crate::store::{collections, decode_document, DocumentStore};
use crate::types::UserProfile;
use crate::Result;
use std::sync::Arc;

/// Typed profile operations over the document store
pub struct ProfileStore {
    store: Arc<dyn DocumentStore>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch a profile by user id; `None` when absent
    pub async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let doc = self.store.get(collections::USERS, user_id).await?;
        Ok(doc.and_then(|d| decode_document(collections::USERS, d)))
    }

    /// Create or replace a profile
    pub async fn save(&self, profile: &UserProfile) -> Result<()> {
        let doc = serde_json::to_value(profile)?;
        self.store
            .set(collections::USERS, &profile.id, doc, false)
            .await?;
        tracing::debug!("Saved profile for {}", profile.id);
        Ok(())
    }
}
