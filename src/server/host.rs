//! Server host holding the shared state of the back office
//!
//! The host is transport-agnostic: it owns the configuration, the document
//! store, the identity provider, the session hook, the event bus and the
//! registered registries. Exposures turn it into routers.

use crate::auth::{IdentityProvider, SessionHook};
use crate::config::{AppConfig, BootstrapAdmin};
use crate::core::entity::Entity;
use crate::core::error::AuthError;
use crate::core::events::EventBus;
use crate::core::service::{Collection, DataService, record_from_payload};
use crate::core::store::DocumentStore;
use crate::entities::User;
use crate::server::entity_registry::EntityRegistry;
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

pub struct ServerHost {
    pub config: Arc<AppConfig>,

    /// Document store shared by every registry
    pub store: Arc<dyn DocumentStore>,

    pub identity: Arc<dyn IdentityProvider>,

    /// Resolves bearer tokens into user profiles
    pub sessions: SessionHook,

    /// Record change notifications (live views, session cache)
    pub event_bus: EventBus,

    /// Registry route descriptors
    pub entity_registry: EntityRegistry,
}

impl ServerHost {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        sessions: SessionHook,
        event_bus: EventBus,
        entity_registry: EntityRegistry,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            identity,
            sessions,
            event_bus,
            entity_registry,
        }
    }

    /// Get entity types registered in the host
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }

    /// Whether any registry is mounted
    pub fn is_ready(&self) -> bool {
        !self.entity_registry.is_empty()
    }

    /// Create the administrator account and profile unless the e-mail is taken
    ///
    /// Returns whether an account was created.
    pub async fn seed_admin(&self, admin: &BootstrapAdmin) -> Result<bool> {
        let account = match self.identity.sign_up(&admin.email, &admin.password).await {
            Ok(account) => account,
            Err(e) if matches!(e.downcast_ref::<AuthError>(), Some(AuthError::EmailInUse { .. })) => {
                tracing::debug!(email = %admin.email, "bootstrap administrator already exists");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let profile: User = record_from_payload(
            json!({
                "name": admin.name,
                "email": account.email,
                "role": "admin",
            }),
            Some(account.id),
        )?;

        let users = Collection::<User>::new(self.store.clone());
        if let Err(e) = users.create(profile).await {
            self.identity.delete_account(&account.id).await?;
            return Err(e);
        }

        tracing::info!(
            email = %account.email,
            collection = <User as Entity>::resource_name(),
            "bootstrap administrator created"
        );
        Ok(true)
    }
}
