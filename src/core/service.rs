//! Typed data services over the document store

use crate::core::entity::{Record, Status};
use crate::core::error::{EntityError, FieldValidationError, ValidationError};
use crate::core::store::{BatchOp, DocumentStore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Service trait for managing the records of one registry
///
/// Errors carry typed [`EntityError`]/[`ValidationError`] values inside
/// `anyhow`, recovered at the HTTP boundary.
#[async_trait]
pub trait DataService<T: Record>: Send + Sync {
    /// Create a new record
    async fn create(&self, record: T) -> Result<T>;

    /// Get a record by ID
    async fn get(&self, id: &Uuid) -> Result<Option<T>>;

    /// List all records
    async fn list(&self) -> Result<Vec<T>>;

    /// Replace an existing record
    async fn update(&self, id: &Uuid, record: T) -> Result<T>;

    /// Delete a record
    async fn delete(&self, id: &Uuid) -> Result<()>;

    /// Set (or toggle, when `status` is `None`) the status of many records at once
    async fn set_status_many(&self, ids: &[Uuid], status: Option<Status>) -> Result<Vec<T>>;

    /// Delete many records at once
    async fn delete_many(&self, ids: &[Uuid]) -> Result<()>;
}

/// [`DataService`] for record type `T` stored in the collection named after
/// its resource
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    fn name() -> &'static str {
        T::resource_name()
    }

    fn decode(document: Value) -> Result<T> {
        serde_json::from_value(document).map_err(|e| {
            EntityError::SerializationError {
                entity_type: T::resource_name_singular().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn encode(record: &T) -> Result<Value> {
        serde_json::to_value(record).map_err(|e| {
            EntityError::SerializationError {
                entity_type: T::resource_name_singular().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Normalize then run the cross-field checks
    fn prepare(mut record: T) -> Result<T> {
        record.normalize();
        record
            .check()
            .map_err(ValidationError::FieldErrors)?;
        Ok(record)
    }

    /// Load every requested record, failing with the full list of missing ids
    async fn load_many(&self, ids: &[Uuid]) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Err(ValidationError::FieldErrors(vec![FieldValidationError::new(
                "ids",
                "select at least one record",
            )])
            .into());
        }

        let unique: Vec<Uuid> = {
            let mut seen = HashSet::new();
            ids.iter().copied().filter(|id| seen.insert(*id)).collect()
        };

        let mut found = Vec::with_capacity(unique.len());
        let mut missing = Vec::new();
        for id in unique {
            match self.store.get(Self::name(), &id).await? {
                Some(document) => found.push(Self::decode(document)?),
                None => missing.push(id),
            }
        }

        if !missing.is_empty() {
            return Err(EntityError::ManyNotFound {
                entity_type: T::resource_name_singular().to_string(),
                ids: missing,
            }
            .into());
        }
        Ok(found)
    }
}

#[async_trait]
impl<T: Record> DataService<T> for Collection<T> {
    async fn create(&self, record: T) -> Result<T> {
        let record = Self::prepare(record)?;
        self.store
            .insert(Self::name(), record.id(), Self::encode(&record)?)
            .await?;
        Ok(record)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        self.store
            .get(Self::name(), id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<T>> {
        self.store
            .list(Self::name())
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    async fn update(&self, id: &Uuid, record: T) -> Result<T> {
        if self.store.get(Self::name(), id).await?.is_none() {
            return Err(EntityError::NotFound {
                entity_type: T::resource_name_singular().to_string(),
                id: *id,
            }
            .into());
        }

        let mut record = Self::prepare(record)?;
        record.touch();
        self.store
            .replace(Self::name(), *id, Self::encode(&record)?)
            .await?;
        Ok(record)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        if self.store.get(Self::name(), id).await?.is_none() {
            return Err(EntityError::NotFound {
                entity_type: T::resource_name_singular().to_string(),
                id: *id,
            }
            .into());
        }
        self.store.delete(Self::name(), id).await
    }

    async fn set_status_many(&self, ids: &[Uuid], status: Option<Status>) -> Result<Vec<T>> {
        let mut records = self.load_many(ids).await?;

        let mut ops = Vec::with_capacity(records.len());
        for record in &mut records {
            let next = status.unwrap_or_else(|| record.status().toggled());
            record.set_status(next);
            record.touch();
            ops.push(BatchOp::Set {
                id: record.id(),
                document: Self::encode(record)?,
            });
        }

        self.store.batch(Self::name(), ops).await?;
        Ok(records)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<()> {
        let records = self.load_many(ids).await?;
        let ops = records
            .iter()
            .map(|r| BatchOp::Delete { id: r.id() })
            .collect();
        self.store.batch(Self::name(), ops).await
    }
}

/// Build a new record from a validated create payload
///
/// Assigns a fresh id (or `id` when given, used for user profiles that
/// share the identity account id) and fresh timestamps.
pub fn record_from_payload<T: Record>(payload: Value, id: Option<Uuid>) -> Result<T> {
    let Value::Object(mut fields) = payload else {
        return Err(ValidationError::InvalidJson {
            message: "expected a JSON object".to_string(),
        }
        .into());
    };

    let now = Utc::now();
    fields.insert(
        "id".to_string(),
        Value::String(id.unwrap_or_else(Uuid::new_v4).to_string()),
    );
    fields.insert("created_at".to_string(), serde_json::to_value(now)?);
    fields.insert("updated_at".to_string(), serde_json::to_value(now)?);
    if fields.get("status").is_none_or(Value::is_null) {
        fields.insert("status".to_string(), serde_json::to_value(Status::Active)?);
    }

    decode_payload(fields)
}

/// Apply a validated update payload on top of the current record
///
/// Only fields present in the payload change; identity and timestamps are
/// kept from `current`.
pub fn merge_payload<T: Record>(current: &T, payload: Value) -> Result<T> {
    let Value::Object(mut fields) = serde_json::to_value(current)? else {
        return Err(anyhow::anyhow!("record did not serialize to an object"));
    };
    if let Value::Object(patch) = payload {
        for (key, value) in patch {
            if key == "status" && value.is_null() {
                continue;
            }
            fields.insert(key, value);
        }
    }
    decode_payload(fields)
}

/// Whether applying an edit would change nothing
///
/// Compares the normalized documents, ignoring `updated_at`.
pub fn is_unchanged<T: Record>(current: &T, edited: &T) -> bool {
    let mut edited = edited.clone();
    edited.normalize();
    let strip = |record: &T| {
        serde_json::to_value(record).ok().map(|mut v| {
            if let Some(obj) = v.as_object_mut() {
                obj.remove("updated_at");
            }
            v
        })
    };
    match (strip(current), strip(&edited)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn decode_payload<T: Record>(fields: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        ValidationError::FieldErrors(vec![FieldValidationError::new(
            T::resource_name_singular(),
            e.to_string(),
        )])
        .into()
    })
}
