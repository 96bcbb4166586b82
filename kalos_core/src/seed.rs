//! Catalog seeding and loading.
//!
//! The catalog collections are immutable at runtime; the only write path is
//! administrative reseeding from the built-in catalog via a batched write.

use crate::store::{collections, decode_document, BatchWrite, DocumentStore, Query};
use crate::types::{Catalog, Exercise, Skill};
use crate::{Error, Result};

/// Seed a catalog into the store with a batched write
///
/// Refuses to seed a catalog that fails validation. Unless `force`, an
/// already-populated exercises collection is left untouched. Returns the
/// number of documents written.
pub async fn seed_catalog(
    store: &dyn DocumentStore,
    catalog: &Catalog,
    force: bool,
) -> Result<usize> {
    let errors = catalog.validate();
    if !errors.is_empty() {
        return Err(Error::CatalogValidation(errors.join("; ")));
    }

    if !force {
        let existing = store
            .get_all(collections::EXERCISES, &Query::new().limit(1))
            .await?;
        if !existing.is_empty() {
            tracing::info!("Catalog already seeded, skipping (use force to reseed)");
            return Ok(0);
        }
    }

    let mut writes = Vec::new();
    for (collection, docs) in [
        (
            collections::EXERCISES,
            catalog
                .exercises
                .values()
                .map(serde_json::to_value)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        ),
        (
            collections::SKILLS,
            catalog
                .skills
                .values()
                .map(serde_json::to_value)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        ),
        (
            collections::STRENGTH_PATHS,
            catalog
                .strength_paths
                .values()
                .map(serde_json::to_value)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        ),
    ] {
        for doc in docs {
            let Some(id) = doc.get("id").and_then(|v| v.as_str()).map(String::from) else {
                continue;
            };
            writes.push(BatchWrite {
                collection: collection.to_string(),
                id,
                document: doc,
            });
        }
    }

    let count = store.batch_set(writes).await?;
    tracing::info!("Seeded {} catalog documents", count);
    Ok(count)
}

/// Load the catalog collections back into id-keyed maps
///
/// Undecodable documents are skipped with a warning; an unseeded store
/// yields an empty catalog.
pub async fn load_catalog(store: &dyn DocumentStore) -> Result<Catalog> {
    let mut catalog = Catalog::default();

    for doc in store
        .get_all(collections::EXERCISES, &Query::new())
        .await?
    {
        if let Some(exercise) = decode_document::<Exercise>(collections::EXERCISES, doc) {
            catalog.exercises.insert(exercise.id.clone(), exercise);
        }
    }

    for doc in store.get_all(collections::SKILLS, &Query::new()).await? {
        if let Some(skill) = decode_document::<Skill>(collections::SKILLS, doc) {
            catalog.skills.insert(skill.id.clone(), skill);
        }
    }

    for doc in store
        .get_all(collections::STRENGTH_PATHS, &Query::new())
        .await?
    {
        if let Some(path) = decode_document::<Skill>(collections::STRENGTH_PATHS, doc) {
            catalog.strength_paths.insert(path.id.clone(), path);
        }
    }

    tracing::debug!(
        "Loaded catalog: {} exercises, {} skills, {} paths",
        catalog.exercises.len(),
        catalog.skills.len(),
        catalog.strength_paths.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_and_load_roundtrip() {
        let store = MemoryStore::new();
        let catalog = build_default_catalog();

        let count = seed_catalog(&store, &catalog, false).await.unwrap();
        assert_eq!(
            count,
            catalog.exercises.len() + catalog.skills.len() + catalog.strength_paths.len()
        );

        let loaded = load_catalog(&store).await.unwrap();
        assert_eq!(loaded.exercises.len(), catalog.exercises.len());
        assert_eq!(loaded.skills.len(), catalog.skills.len());
        assert_eq!(loaded.strength_paths.len(), catalog.strength_paths.len());
        assert_eq!(
            loaded.exercise("pushup").unwrap(),
            catalog.exercise("pushup").unwrap()
        );
    }

    #[tokio::test]
    async fn test_second_seed_skipped_without_force() {
        let store = MemoryStore::new();
        let catalog = build_default_catalog();

        seed_catalog(&store, &catalog, false).await.unwrap();
        let count = seed_catalog(&store, &catalog, false).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_force_reseeds() {
        let store = MemoryStore::new();
        let catalog = build_default_catalog();

        seed_catalog(&store, &catalog, false).await.unwrap();
        let count = seed_catalog(&store, &catalog, true).await.unwrap();
        assert!(count > 0);
    }

    #[tokio::test]
    async fn test_invalid_catalog_refused() {
        let store = MemoryStore::new();
        let mut catalog = build_default_catalog();
        if let Some(exercise) = catalog.exercises.get_mut("pushup") {
            exercise.target.value = 0;
        }

        let result = seed_catalog(&store, &catalog, false).await;
        assert!(matches!(result, Err(Error::CatalogValidation(_))));
    }

    #[tokio::test]
    async fn test_load_unseeded_store_is_empty() {
        let store = MemoryStore::new();
        let catalog = load_catalog(&store).await.unwrap();
        assert!(catalog.exercises.is_empty());
    }
}
