//! Registry lifecycle hooks
//!
//! Most registries are plain document collections. Users are special: a
//! profile only exists next to an identity account with the same id, so
//! creating a user signs the account up first and deleting users removes
//! their accounts.

use super::RegistryState;
use crate::core::entity::Record;
use crate::core::error::BackofficeResult;
use crate::entities::user::PASSWORD_FIELD;
use crate::entities::{Carrier, Client, Entry, Product, Supplier, User};
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

#[async_trait]
pub trait RegistryHooks: Record {
    /// Runs on a validated create payload; may return the id of the new record
    async fn before_create(
        _state: &RegistryState<Self>,
        _payload: &mut Value,
    ) -> BackofficeResult<Option<Uuid>> {
        Ok(None)
    }

    /// Undo `before_create` when the record could not be written
    async fn create_failed(_state: &RegistryState<Self>, _id: &Uuid) {}

    /// Runs after records were deleted
    async fn after_delete(_state: &RegistryState<Self>, _ids: &[Uuid]) -> BackofficeResult<()> {
        Ok(())
    }
}

impl RegistryHooks for Client {}
impl RegistryHooks for Carrier {}
impl RegistryHooks for Supplier {}
impl RegistryHooks for Product {}
impl RegistryHooks for Entry {}

#[async_trait]
impl RegistryHooks for User {
    async fn before_create(
        state: &RegistryState<Self>,
        payload: &mut Value,
    ) -> BackofficeResult<Option<Uuid>> {
        let password = payload
            .as_object_mut()
            .and_then(|fields| fields.remove(PASSWORD_FIELD))
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        let email = payload
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let account = state.identity().sign_up(&email, &password).await?;
        if let Some(fields) = payload.as_object_mut() {
            fields.insert("email".to_string(), Value::String(account.email));
        }
        Ok(Some(account.id))
    }

    async fn create_failed(state: &RegistryState<Self>, id: &Uuid) {
        if let Err(e) = state.identity().delete_account(id).await {
            tracing::error!(user_id = %id, error = %e, "failed to remove orphan account");
        }
    }

    async fn after_delete(state: &RegistryState<Self>, ids: &[Uuid]) -> BackofficeResult<()> {
        for id in ids {
            state.identity().delete_account(id).await?;
        }
        Ok(())
    }
}
