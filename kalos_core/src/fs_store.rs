//! File-backed document store.
//!
//! One JSON file per document at `<root>/<collection>/<id>.json`. Writes go
//! through a unique temp file with an exclusive advisory lock and are renamed
//! over the target, so concurrent writers serialize and readers never observe
//! a half-written document. Unparseable files are skipped with a warning on
//! collection scans; a corrupt document degrades to absence, not an error.

use crate::store::{merge_document, BatchWrite, DocumentStore, Query};
use crate::{Error, Result};
use async_trait::async_trait;
use fs2::FileExt;
use serde_json::Value;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Document store rooted at a data directory
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn doc_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{}.json", id))
    }

    /// Read and parse one document file under a shared lock
    ///
    /// Unreadable or unparseable files degrade to `None` with a warning.
    fn read_doc(path: &Path) -> Option<Value> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open document {:?}: {}", path, e);
                return None;
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock document {:?}: {}", path, e);
            return None;
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        let _ = file.unlock();

        if let Err(e) = read {
            tracing::warn!("Failed to read document {:?}: {}", path, e);
            return None;
        }

        match serde_json::from_str(&contents) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Skipping unparseable document {:?}: {}", path, e);
                None
            }
        }
    }

    /// Atomically write a document: temp file, exclusive lock, fsync, rename
    fn write_doc(&self, path: &Path, doc: &Value) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store(format!("document path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(doc)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let path = self.doc_path(collection, id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Self::read_doc(&path))
    }

    async fn get_all(&self, collection: &str, query: &Query) -> Result<Vec<Value>> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|ext| ext == "json") != Some(true) {
                continue;
            }
            if let Some(doc) = Self::read_doc(&path) {
                if query.matches(&doc) {
                    docs.push(doc);
                }
            }
        }

        query.apply_order_and_limit(&mut docs);
        tracing::debug!("Read {} documents from {}", docs.len(), collection);
        Ok(docs)
    }

    async fn set(&self, collection: &str, id: &str, document: Value, merge: bool) -> Result<()> {
        let path = self.doc_path(collection, id);

        let doc = if merge && path.exists() {
            let mut existing = Self::read_doc(&path).unwrap_or(Value::Null);
            merge_document(&mut existing, document);
            existing
        } else {
            document
        };

        self.write_doc(&path, &doc)?;
        tracing::debug!("Wrote document {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let path = self.doc_path(collection, id);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted document {}/{}", collection, id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn batch_set(&self, writes: Vec<BatchWrite>) -> Result<usize> {
        // Sequential, not atomic: a failure leaves earlier writes committed.
        let count = writes.len();
        for write in writes {
            self.set(&write.collection, &write.id, write.document, false)
                .await?;
        }
        tracing::info!("Applied {} batched writes", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(temp_dir.path());

        store
            .set("plans", "p1", json!({"id": "p1", "completed": false}), false)
            .await
            .unwrap();

        let doc = store.get("plans", "p1").await.unwrap().unwrap();
        assert_eq!(doc["id"], json!("p1"));
        assert!(temp_dir.path().join("plans/p1.json").exists());
    }

    #[tokio::test]
    async fn test_get_absent_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(temp_dir.path());

        assert!(store.get("plans", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_preserves_other_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(temp_dir.path());

        store
            .set("plans", "p1", json!({"completed": false, "dayIndex": 4}), false)
            .await
            .unwrap();
        store
            .set("plans", "p1", json!({"completed": true}), true)
            .await
            .unwrap();

        let doc = store.get("plans", "p1").await.unwrap().unwrap();
        assert_eq!(doc["completed"], json!(true));
        assert_eq!(doc["dayIndex"], json!(4));
    }

    #[tokio::test]
    async fn test_corrupt_document_skipped_in_scan() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(temp_dir.path());

        store
            .set("plans", "good", json!({"id": "good"}), false)
            .await
            .unwrap();
        std::fs::write(temp_dir.path().join("plans/bad.json"), "{ not json }").unwrap();

        let docs = store.get_all("plans", &Query::new()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["id"], json!("good"));
    }

    #[tokio::test]
    async fn test_corrupt_document_degrades_to_absent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(temp_dir.path());

        std::fs::create_dir_all(temp_dir.path().join("plans")).unwrap();
        std::fs::write(temp_dir.path().join("plans/bad.json"), "{ not json }").unwrap();

        assert!(store.get("plans", "bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(temp_dir.path());

        store.set("plans", "p1", json!({}), false).await.unwrap();
        store.delete("plans", "p1").await.unwrap();
        store.delete("plans", "p1").await.unwrap();

        assert!(store.get("plans", "p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_stray_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(temp_dir.path());

        store.set("plans", "p1", json!({"id": "p1"}), false).await.unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path().join("plans"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "p1.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only p1.json, found extras: {:?}",
            extras
        );
    }
}
