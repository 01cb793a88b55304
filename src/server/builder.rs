//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::{EntityDescriptor, EntityRegistry};
use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::auth::{IdentityProvider, InMemoryIdentityProvider, SessionHook};
use crate::config::{AppConfig, RegistryConfig};
use crate::core::events::EventBus;
use crate::core::store::DocumentStore;
use crate::entities::{Carrier, Client, Entry, Product, Supplier, User};
use crate::registry::{RegistryDescriptor, RegistryHooks, RegistryState};
use crate::storage::InMemoryDocumentStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared parts handed to each registry when the host is built
struct HostParts<'a> {
    config: &'a AppConfig,
    store: &'a Arc<dyn DocumentStore>,
    sessions: &'a SessionHook,
    events: &'a EventBus,
}

type DescriptorFactory = fn(&HostParts<'_>) -> Box<dyn EntityDescriptor>;

fn descriptor_for<T: RegistryHooks>(parts: &HostParts<'_>) -> Box<dyn EntityDescriptor> {
    let singular = T::resource_name_singular();
    let registry = parts
        .config
        .registry(singular)
        .cloned()
        .unwrap_or_else(|| RegistryConfig::default_for(singular, T::resource_name()));

    let state = RegistryState::<T>::new(
        &registry.plural,
        parts.store.clone(),
        parts.sessions.clone(),
        parts.events.clone(),
        registry.auth.policies(),
        parts.config.listing.clone(),
    );
    Box::new(RegistryDescriptor::new(
        &registry.singular,
        &registry.plural,
        state,
    ))
}

/// Builder for the back office server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(AppConfig::load()?)
///     .register_all()
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn DocumentStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    factories: Vec<DescriptorFactory>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default_config(),
            store: None,
            identity: None,
            factories: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Document store (defaults to [`InMemoryDocumentStore`])
    pub fn with_store(mut self, store: impl DocumentStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Identity provider (defaults to [`InMemoryIdentityProvider`] with the
    /// configured session TTL)
    pub fn with_identity_provider(mut self, identity: impl IdentityProvider + 'static) -> Self {
        self.identity = Some(Arc::new(identity));
        self
    }

    /// Mount the registry of record type `T`
    ///
    /// Its URL plural and policies come from the `registries` section of the
    /// configuration; unconfigured registries use the defaults.
    pub fn register<T: RegistryHooks>(mut self) -> Self {
        self.factories.push(descriptor_for::<T>);
        self
    }

    /// Mount the six registries of the back office
    pub fn register_all(self) -> Self {
        self.register::<Client>()
            .register::<Product>()
            .register::<Carrier>()
            .register::<Supplier>()
            .register::<Entry>()
            .register::<User>()
    }

    /// Add routes outside the registries (reports, webhooks, ...)
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Spawns the session hook, so it must run inside a Tokio runtime.
    pub fn build_host(&mut self) -> Result<ServerHost> {
        self.config.validate()?;

        let store = self
            .store
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryDocumentStore::new()));
        let identity = self.identity.take().unwrap_or_else(|| {
            Arc::new(InMemoryIdentityProvider::new(self.config.auth.session_ttl()))
        });
        let events = EventBus::new(self.config.events.capacity);
        let sessions = SessionHook::new(identity.clone(), store.clone());
        sessions.spawn(&events);

        let parts = HostParts {
            config: &self.config,
            store: &store,
            sessions: &sessions,
            events: &events,
        };
        let mut entity_registry = EntityRegistry::new();
        for factory in &self.factories {
            entity_registry.register(factory(&parts));
        }

        tracing::info!(registries = ?entity_registry.entity_types(), "host built");

        Ok(ServerHost::new(
            self.config.clone(),
            store,
            identity,
            sessions,
            events,
            entity_registry,
        ))
    }

    /// Build the host and its REST router
    pub fn build_with_host(mut self) -> Result<(Arc<ServerHost>, Router)> {
        let host = Arc::new(self.build_host()?);
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let router = RestExposure::build_router(host.clone(), custom_routes)?;
        Ok((host, router))
    }

    /// Build the final REST router
    pub fn build(self) -> Result<Router> {
        self.build_with_host().map(|(_, router)| router)
    }

    /// Seed the bootstrap administrator and serve with graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let (host, app) = self.build_with_host()?;

        if let Some(admin) = &host.config.auth.bootstrap_admin {
            host.seed_admin(admin).await?;
        }

        let addr = host.config.bind_address();
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_all_mounts_six_registries() {
        let host = ServerBuilder::new().register_all().build_host().unwrap();
        assert_eq!(
            host.entity_types(),
            vec!["client", "product", "carrier", "supplier", "entry", "user"]
        );
        assert_eq!(host.entity_registry.plural_of("entry"), Some("entries"));
    }

    #[tokio::test]
    async fn test_configured_plural_is_used() {
        let mut config = AppConfig::default_config();
        config.registries = vec![RegistryConfig::new("client", "clientes")];

        let host = ServerBuilder::new()
            .with_config(config)
            .register::<Client>()
            .register::<Product>()
            .build_host()
            .unwrap();
        assert_eq!(host.entity_registry.plural_of("client"), Some("clientes"));
        assert_eq!(host.entity_registry.plural_of("product"), Some("products"));
    }

    #[test]
    fn test_unconfigured_user_registry_stays_admin_only() {
        let registry = RegistryConfig::default_for("user", "users");
        assert_eq!(registry.auth.read, "admin_only");
        assert_eq!(
            RegistryConfig::default_for("client", "clients").auth.read,
            "authenticated"
        );
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default_config();
        config.listing.default_page_size = 0;
        assert!(
            ServerBuilder::new()
                .with_config(config)
                .register_all()
                .build_host()
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_build_router() {
        assert!(ServerBuilder::new().register_all().build().is_ok());
    }
}
