//! # Backoffice
//!
//! Administrative back office for a small distribution business: client,
//! product, carrier and supplier registries, user management and an entry
//! log, served as a REST API over a pluggable document store and identity
//! provider.
//!
//! ## Features
//!
//! - **Registries**: list with search, status filter, tri-state sort and
//!   pagination; create/edit/view forms validated against per-entity schemas
//! - **Brazilian documents**: CPF/CNPJ check digits, CEP, phones and UF codes
//! - **Bulk operations**: batched status toggle and delete of a selection
//! - **Exports**: CSV, XLSX and PDF reports of any listing
//! - **Live views**: websocket snapshots re-sent on every change
//! - **Sessions**: bearer tokens resolved to user profiles with role policies
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use backoffice::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_config(AppConfig::load()?)
//!         .register_all()
//!         .serve()
//!         .await
//! }
//! ```
//!
//! ## Defining a registry
//!
//! ```rust,ignore
//! impl_record!(
//!     Warehouse,
//!     "warehouse",
//!     "warehouses",
//!     title: "Warehouses",
//!     search: ["name", "city"],
//!     columns: [Column::new("name", "Name", ColumnFormat::Text)],
//!     {
//!         name: String,
//!         city: String,
//!     },
//! );
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod entities;
pub mod export;
pub mod navigation;
pub mod registry;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AuthContext, AuthPolicy, BackofficeError, BackofficeResult, BatchOp, Collection, Column,
        ColumnFormat, DataService, DocumentStore, Entity, EventBus, EventEnvelope, FieldFormat,
        FieldValue, ListQuery, Operation, PaginatedResponse, PaginationMeta, Record, RecordEvent,
        SortDirection, SortState, Status,
    };
    pub use crate::core::validation::{EntityValidationConfig, Validated, filters, validators};

    // === Macros ===
    pub use crate::impl_record;

    // === Entities ===
    pub use crate::entities::{
        Carrier, Client, Entry, EntryKind, PersonType, Product, Supplier, User, UserRole,
    };

    // === Auth ===
    pub use crate::auth::{
        Auth, IdentityProvider, InMemoryIdentityProvider, Session, SessionEvent, SessionHook,
    };

    // === Storage ===
    pub use crate::storage::InMemoryDocumentStore;

    // === Config ===
    pub use crate::config::{AppConfig, RegistryAuthConfig, RegistryConfig};

    // === Exports ===
    pub use crate::export::{ExportFormat, ExportTable};

    // === Server ===
    pub use crate::registry::{RegistryDescriptor, RegistryHooks, RegistryState};
    pub use crate::server::{EntityDescriptor, EntityRegistry, RestExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
