//! In-memory document store for development and tests

use crate::core::error::StorageError;
use crate::core::store::{BatchOp, DocumentStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct CollectionData {
    documents: HashMap<Uuid, Value>,
    /// Insertion order, so listings are stable between calls
    order: Vec<Uuid>,
}

/// In-memory document store
///
/// Uses RwLock for thread-safe access. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, CollectionData>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> Result<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0))
    }
}

fn not_found(collection: &str, id: Uuid) -> anyhow::Error {
    StorageError::DocumentNotFound {
        collection: collection.to_string(),
        id,
    }
    .into()
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, id: Uuid, document: Value) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let data = collections.entry(collection.to_string()).or_default();
        if data.documents.contains_key(&id) {
            return Err(StorageError::DocumentExists {
                collection: collection.to_string(),
                id,
            }
            .into());
        }

        data.documents.insert(id, document);
        data.order.push(id);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &Uuid) -> Result<Option<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections
            .get(collection)
            .and_then(|c| c.documents.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections
            .get(collection)
            .map(|c| {
                c.order
                    .iter()
                    .filter_map(|id| c.documents.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn replace(&self, collection: &str, id: Uuid, document: Value) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let slot = collections
            .get_mut(collection)
            .and_then(|c| c.documents.get_mut(&id))
            .ok_or_else(|| not_found(collection, id))?;
        *slot = document;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &Uuid) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let data = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, *id))?;
        data.documents
            .remove(id)
            .ok_or_else(|| not_found(collection, *id))?;
        data.order.retain(|existing| existing != id);
        Ok(())
    }

    async fn batch(&self, collection: &str, ops: Vec<BatchOp>) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let data = collections.entry(collection.to_string()).or_default();

        // Check everything before touching anything
        let missing: Vec<String> = ops
            .iter()
            .map(BatchOp::id)
            .filter(|id| !data.documents.contains_key(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StorageError::BatchRejected {
                message: format!(
                    "{} document(s) not found in '{}': {}",
                    missing.len(),
                    collection,
                    missing.join(", ")
                ),
            }
            .into());
        }

        for op in ops {
            match op {
                BatchOp::Set { id, document } => {
                    data.documents.insert(id, document);
                }
                BatchOp::Delete { id } => {
                    data.documents.remove(&id);
                    data.order.retain(|existing| *existing != id);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store.insert("clients", id, json!({"name": "Ana"})).await.unwrap();

        let doc = store.get("clients", &id).await.unwrap().unwrap();
        assert_eq!(doc["name"], "Ana");
        assert!(store.get("products", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store.insert("clients", id, json!({})).await.unwrap();

        let err = store.insert("clients", id, json!({})).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::DocumentExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = InMemoryDocumentStore::new();
        for n in 0..5 {
            store
                .insert("products", Uuid::new_v4(), json!({"n": n}))
                .await
                .unwrap();
        }
        let ns: Vec<_> = store
            .list("products")
            .await
            .unwrap()
            .iter()
            .map(|d| d["n"].as_i64().unwrap())
            .collect();
        assert_eq!(ns, vec![0, 1, 2, 3, 4]);
        assert!(store.list("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_and_delete_missing() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();
        assert!(store.replace("clients", id, json!({})).await.is_err());
        assert!(store.delete("clients", &id).await.is_err());

        store.insert("clients", id, json!({"v": 1})).await.unwrap();
        store.replace("clients", id, json!({"v": 2})).await.unwrap();
        assert_eq!(store.get("clients", &id).await.unwrap().unwrap()["v"], 2);

        store.delete("clients", &id).await.unwrap();
        assert_eq!(store.len("clients").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let store = InMemoryDocumentStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.insert("clients", a, json!({"v": 1})).await.unwrap();
        store.insert("clients", b, json!({"v": 1})).await.unwrap();

        let err = store
            .batch(
                "clients",
                vec![
                    BatchOp::Set {
                        id: a,
                        document: json!({"v": 2}),
                    },
                    BatchOp::Delete { id: Uuid::new_v4() },
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::BatchRejected { .. })
        ));
        assert_eq!(store.get("clients", &a).await.unwrap().unwrap()["v"], 1);

        store
            .batch(
                "clients",
                vec![
                    BatchOp::Set {
                        id: a,
                        document: json!({"v": 2}),
                    },
                    BatchOp::Delete { id: b },
                ],
            )
            .await
            .unwrap();
        assert_eq!(store.get("clients", &a).await.unwrap().unwrap()["v"], 2);
        assert_eq!(store.len("clients").unwrap(), 1);
    }
}
