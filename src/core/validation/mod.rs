//! Validation and filtering system
//!
//! Declarative per-entity schemas: filters clean the raw form values, then
//! validators check them. The [`Validated`] extractor applies the schema
//! before a handler runs.

pub mod config;
pub mod documents;
pub mod extractor;
pub mod filters;
pub mod validators;

pub use config::EntityValidationConfig;
pub use extractor::Validated;
