//! Core module containing fundamental traits and types of the back office

pub mod auth;
pub mod entity;
pub mod error;
pub mod events;
pub mod field;
pub mod query;
pub mod service;
pub mod store;
pub mod validation;

pub use auth::{AuthContext, AuthPolicy};
pub use entity::{Column, ColumnFormat, Entity, Operation, Record, Status};
pub use error::{BackofficeError, BackofficeResult};
pub use events::{EventBus, EventEnvelope, RecordEvent};
pub use field::{FieldFormat, FieldValue};
pub use query::{ListQuery, PaginatedResponse, PaginationMeta, SortDirection, SortState};
pub use service::{Collection, DataService};
pub use store::{BatchOp, DocumentStore};
