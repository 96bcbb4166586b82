//! Generic document-store abstraction.
//!
//! Every persistence operation in the engine goes through [`DocumentStore`]:
//! an asynchronous request/response interface over collections of JSON
//! documents keyed by id. The remote store the product runs against, the
//! file-backed store the CLI uses, and the in-memory store the tests use all
//! implement the same trait.
//!
//! Multi-document writes (`batch_set`) are sequential, not atomic: a failure
//! partway through leaves prior writes committed.

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Names of the persisted collections
pub mod collections {
    pub const EXERCISES: &str = "exercises";
    pub const SKILLS: &str = "skills";
    pub const STRENGTH_PATHS: &str = "strengthPaths";
    pub const PLANS: &str = "plans";
    pub const PROGRESS: &str = "progress";
    pub const WORKOUT_HISTORY: &str = "workoutHistory";
    pub const USERS: &str = "users";
}

/// Filter/order/limit options for [`DocumentStore::get_all`]
///
/// Filters are equality checks on top-level document fields, combined with
/// AND semantics. Ordering is by a single top-level field.
#[derive(Clone, Debug, Default)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order_by: Option<(String, bool)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    /// Order results ascending by a top-level field
    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), false));
        self
    }

    /// Order results descending by a top-level field
    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), true));
        self
    }

    /// Cap the number of results (applied after ordering)
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Whether a document satisfies every filter
    pub fn matches(&self, doc: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// Sort and truncate a filtered result set in place
    pub fn apply_order_and_limit(&self, docs: &mut Vec<Value>) {
        if let Some((field, descending)) = &self.order_by {
            docs.sort_by(|a, b| {
                let ord = compare_values(a.get(field), b.get(field));
                if *descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
    }
}

/// Total order over optional JSON values, for query ordering
///
/// Numbers compare numerically, strings lexicographically; mixed or missing
/// values compare by a fixed type rank so sorting is stable.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// One write in a batched seeding operation
#[derive(Clone, Debug)]
pub struct BatchWrite {
    pub collection: String,
    pub id: String,
    pub document: Value,
}

/// Asynchronous document store keyed by collection + id
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id; `None` when absent
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Fetch all documents in a collection matching the query
    async fn get_all(&self, collection: &str, query: &Query) -> Result<Vec<Value>>;

    /// Create or replace a document; with `merge`, shallow-merge top-level
    /// fields into the existing document instead
    async fn set(&self, collection: &str, id: &str, document: Value, merge: bool) -> Result<()>;

    /// Delete a document; deleting an absent document is not an error
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Sequentially apply a batch of writes, returning the count applied
    async fn batch_set(&self, writes: Vec<BatchWrite>) -> Result<usize>;
}

/// Shallow-merge `patch`'s top-level fields into `existing`
///
/// Non-object inputs fall back to replacement.
pub(crate) fn merge_document(existing: &mut Value, patch: Value) {
    match (existing, patch) {
        (Value::Object(base), Value::Object(fields)) => {
            for (key, value) in fields {
                base.insert(key, value);
            }
        }
        (slot, patch) => *slot = patch,
    }
}

/// In-memory document store
///
/// Per-collection BTreeMaps behind an async lock; iteration order is
/// deterministic. Used by unit tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn get_all(&self, collection: &str, query: &Query) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Value> = collections
            .get(collection)
            .map(|docs| docs.values().filter(|d| query.matches(d)).cloned().collect())
            .unwrap_or_default();
        query.apply_order_and_limit(&mut docs);
        Ok(docs)
    }

    async fn set(&self, collection: &str, id: &str, document: Value, merge: bool) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.get_mut(id) {
            Some(existing) if merge => merge_document(existing, document),
            _ => {
                docs.insert(id.to_string(), document);
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn batch_set(&self, writes: Vec<BatchWrite>) -> Result<usize> {
        let count = writes.len();
        for write in writes {
            self.set(&write.collection, &write.id, write.document, false)
                .await?;
        }
        tracing::debug!("Applied {} batched writes", count);
        Ok(count)
    }
}

/// Decode a stored document, skipping undecodable ones with a warning
///
/// Shared by the typed stores: a document that no longer matches the
/// expected shape degrades to absence instead of failing the whole read.
pub(crate) fn decode_document<T: serde::de::DeserializeOwned>(
    collection: &str,
    doc: Value,
) -> Option<T> {
    match serde_json::from_value(doc) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!("Skipping undecodable {} document: {}", collection, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .set("plans", "p1", json!({"id": "p1", "dayIndex": 3}), false)
            .await
            .unwrap();

        let doc = store.get("plans", "p1").await.unwrap();
        assert_eq!(doc, Some(json!({"id": "p1", "dayIndex": 3})));
    }

    #[tokio::test]
    async fn test_get_absent_returns_none() {
        let store = MemoryStore::new();
        let doc = store.get("plans", "missing").await.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn test_merge_updates_only_given_fields() {
        let store = MemoryStore::new();
        store
            .set(
                "plans",
                "p1",
                json!({"id": "p1", "completed": false, "dayIndex": 2}),
                false,
            )
            .await
            .unwrap();

        store
            .set("plans", "p1", json!({"completed": true}), true)
            .await
            .unwrap();

        let doc = store.get("plans", "p1").await.unwrap().unwrap();
        assert_eq!(doc["completed"], json!(true));
        assert_eq!(doc["dayIndex"], json!(2));
    }

    #[tokio::test]
    async fn test_get_all_filters_and_orders() {
        let store = MemoryStore::new();
        for (id, user, day) in [("a", "u1", 3), ("b", "u2", 1), ("c", "u1", 1)] {
            store
                .set("plans", id, json!({"id": id, "userId": user, "dayIndex": day}), false)
                .await
                .unwrap();
        }

        let query = Query::new().filter("userId", "u1").order_by("dayIndex");
        let docs = store.get_all("plans", &query).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["id"], json!("c"));
        assert_eq!(docs[1]["id"], json!("a"));
    }

    #[tokio::test]
    async fn test_get_all_respects_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .set("plans", &format!("p{}", i), json!({"n": i}), false)
                .await
                .unwrap();
        }

        let query = Query::new().order_by_desc("n").limit(2);
        let docs = store.get_all("plans", &query).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["n"], json!(4));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("plans", "p1", json!({}), false).await.unwrap();

        store.delete("plans", "p1").await.unwrap();
        store.delete("plans", "p1").await.unwrap();

        assert!(store.get("plans", "p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_set_applies_all_writes() {
        let store = MemoryStore::new();
        let writes = vec![
            BatchWrite {
                collection: "exercises".into(),
                id: "a".into(),
                document: json!({"id": "a"}),
            },
            BatchWrite {
                collection: "exercises".into(),
                id: "b".into(),
                document: json!({"id": "b"}),
            },
        ];

        let count = store.batch_set(writes).await.unwrap();
        assert_eq!(count, 2);
        assert!(store.get("exercises", "b").await.unwrap().is_some());
    }
}
