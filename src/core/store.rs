//! Schema-less document store abstraction
//!
//! Registries persist flat JSON documents in named collections. A store only
//! knows about collections, ids and JSON; typing happens one layer up in
//! [`Collection`](crate::core::service::Collection).

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// One write of an atomic batch
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Replace an existing document
    Set { id: Uuid, document: Value },
    /// Remove an existing document
    Delete { id: Uuid },
}

impl BatchOp {
    pub fn id(&self) -> Uuid {
        match self {
            BatchOp::Set { id, .. } | BatchOp::Delete { id } => *id,
        }
    }
}

/// Storage backend for registry documents
///
/// Errors are [`StorageError`](crate::core::error::StorageError)s wrapped in
/// `anyhow`, so callers can recover the typed failure.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document; fails if the id is taken
    async fn insert(&self, collection: &str, id: Uuid, document: Value) -> Result<()>;

    async fn get(&self, collection: &str, id: &Uuid) -> Result<Option<Value>>;

    /// All documents of a collection, in insertion order
    async fn list(&self, collection: &str) -> Result<Vec<Value>>;

    /// Replace an existing document; fails if it does not exist
    async fn replace(&self, collection: &str, id: Uuid, document: Value) -> Result<()>;

    /// Remove an existing document; fails if it does not exist
    async fn delete(&self, collection: &str, id: &Uuid) -> Result<()>;

    /// Apply every operation or none of them
    ///
    /// The whole batch is rejected when any targeted document is missing.
    async fn batch(&self, collection: &str, ops: Vec<BatchOp>) -> Result<()>;
}
