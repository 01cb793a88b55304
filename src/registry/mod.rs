//! Per-entity REST surface
//!
//! Every registry exposes the same routes over its collection:
//!
//! ```text
//! GET    /{plural}               list (search, status, sort, page)
//! POST   /{plural}               create
//! GET    /{plural}/{id}          view
//! PUT    /{plural}/{id}          edit
//! DELETE /{plural}/{id}          delete
//! POST   /{plural}/bulk/status   set or toggle the status of a selection
//! POST   /{plural}/bulk/delete   delete a selection
//! GET    /{plural}/export        CSV / XLSX / PDF report
//! GET    /{plural}/live          websocket live view
//! ```

pub mod descriptor;
pub mod handlers;
pub mod hooks;
pub mod live;

pub use descriptor::RegistryDescriptor;
pub use hooks::RegistryHooks;

use crate::auth::{IdentityProvider, SessionHook};
use crate::config::{ListingConfig, RegistryPolicies};
use crate::core::events::{EventBus, RecordEvent};
use crate::core::service::Collection;
use crate::core::store::DocumentStore;
use axum::extract::FromRef;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Shared state of one registry's handlers
pub struct RegistryState<T> {
    /// URL plural, also used to name exported files
    pub plural: Arc<str>,
    pub collection: Collection<T>,
    pub sessions: SessionHook,
    pub events: EventBus,
    pub policies: Arc<RegistryPolicies>,
    pub listing: ListingConfig,
}

impl<T> Clone for RegistryState<T> {
    fn clone(&self) -> Self {
        Self {
            plural: self.plural.clone(),
            collection: self.collection.clone(),
            sessions: self.sessions.clone(),
            events: self.events.clone(),
            policies: self.policies.clone(),
            listing: self.listing.clone(),
        }
    }
}

impl<T: RegistryHooks> RegistryState<T> {
    pub fn new(
        plural: &str,
        store: Arc<dyn DocumentStore>,
        sessions: SessionHook,
        events: EventBus,
        policies: RegistryPolicies,
        listing: ListingConfig,
    ) -> Self {
        Self {
            plural: Arc::from(plural),
            collection: Collection::new(store),
            sessions,
            events,
            policies: Arc::new(policies),
            listing,
        }
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        self.sessions.identity()
    }

    /// Publish a change of this registry's collection
    pub(crate) fn publish_created(&self, record: &T, actor: Option<String>) {
        self.events.publish(
            RecordEvent::Created {
                collection: T::resource_name().to_string(),
                record_id: record.id(),
                data: to_data(record),
            },
            actor,
        );
    }

    pub(crate) fn publish_updated(&self, record: &T, actor: Option<String>) {
        self.events.publish(
            RecordEvent::Updated {
                collection: T::resource_name().to_string(),
                record_id: record.id(),
                data: to_data(record),
            },
            actor,
        );
    }

    pub(crate) fn publish_deleted(&self, record_ids: Vec<Uuid>, actor: Option<String>) {
        self.events.publish(
            RecordEvent::Deleted {
                collection: T::resource_name().to_string(),
                record_ids,
            },
            actor,
        );
    }
}

fn to_data<R: Serialize>(record: &R) -> serde_json::Value {
    serde_json::to_value(record).unwrap_or(serde_json::Value::Null)
}

impl<T> FromRef<RegistryState<T>> for SessionHook {
    fn from_ref(state: &RegistryState<T>) -> Self {
        state.sessions.clone()
    }
}
