//! Typed error handling for the back office
//!
//! Every failure that crosses the HTTP boundary is a [`BackofficeError`].
//! Each category maps to a status code and a stable machine-readable code so
//! the front end can show a meaningful notification.
//!
//! # Error Categories
//!
//! - [`EntityError`]: record lookups and CRUD operations
//! - [`ValidationError`]: form payloads and query parameters
//! - [`StorageError`]: document store failures
//! - [`AuthError`]: identity provider and authorization
//! - [`ExportError`]: CSV/XLSX/PDF generation
//! - [`ConfigError`]: configuration loading

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type of the back office
#[derive(Debug, Error)]
pub enum BackofficeError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl BackofficeError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BackofficeError::Entity(e) => e.status_code(),
            BackofficeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BackofficeError::Storage(e) => e.status_code(),
            BackofficeError::Auth(e) => e.status_code(),
            BackofficeError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BackofficeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BackofficeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            BackofficeError::Entity(e) => e.error_code(),
            BackofficeError::Validation(e) => e.error_code(),
            BackofficeError::Storage(e) => e.error_code(),
            BackofficeError::Auth(e) => e.error_code(),
            BackofficeError::Export(_) => "EXPORT_FAILED",
            BackofficeError::Config(_) => "CONFIG_ERROR",
            BackofficeError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            BackofficeError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            BackofficeError::Entity(EntityError::ManyNotFound { entity_type, ids }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "ids": ids.iter().map(Uuid::to_string).collect::<Vec<_>>()
                }))
            }
            BackofficeError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }

    /// Shorthand for a single field validation failure
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        BackofficeError::Validation(ValidationError::FieldErrors(vec![
            FieldValidationError::new(field, message),
        ]))
    }
}

impl IntoResponse for BackofficeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    #[error("{} {entity_type} record(s) not found", .ids.len())]
    ManyNotFound { entity_type: String, ids: Vec<Uuid> },

    #[error("{entity_type} with id '{id}' already exists")]
    AlreadyExists { entity_type: String, id: Uuid },

    #[error("Unknown registry: {entity_type}")]
    UnknownType { entity_type: String },

    #[error("Failed to serialize/deserialize {entity_type}: {message}")]
    SerializationError {
        entity_type: String,
        message: String,
    },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } | EntityError::ManyNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
            EntityError::UnknownType { .. } => StatusCode::BAD_REQUEST,
            EntityError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } | EntityError::ManyNotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
            EntityError::UnknownType { .. } => "UNKNOWN_ENTITY_TYPE",
            EntityError::SerializationError { .. } => "ENTITY_SERIALIZATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation errors: {}", format_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Invalid UUID format: {value}")]
    InvalidUuid { value: String },

    #[error("Invalid query parameter '{parameter}': {message}")]
    InvalidQuery { parameter: String, message: String },
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
            ValidationError::InvalidUuid { .. } => "INVALID_ID",
            ValidationError::InvalidQuery { .. } => "INVALID_QUERY",
        }
    }
}

/// A single field validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn format_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Storage Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document '{id}' not found in collection '{collection}'")]
    DocumentNotFound { collection: String, id: Uuid },

    #[error("Document '{id}' already exists in collection '{collection}'")]
    DocumentExists { collection: String, id: Uuid },

    #[error("Batch write rejected: {message}")]
    BatchRejected { message: String },

    #[error("Storage backend '{backend}' is unavailable: {message}")]
    Unavailable { backend: String, message: String },
}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::DocumentExists { .. } => StatusCode::CONFLICT,
            StorageError::BatchRejected { .. } => StatusCode::NOT_FOUND,
            StorageError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            StorageError::DocumentExists { .. } => "DOCUMENT_EXISTS",
            StorageError::BatchRejected { .. } => "BATCH_REJECTED",
            StorageError::Unavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for '{email}'")]
    EmailInUse { email: String },

    #[error("Session expired")]
    SessionExpired,
}

impl AuthError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AuthError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AuthError::Forbidden {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::EmailInUse { .. } => StatusCode::CONFLICT,
            AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized { .. } => "UNAUTHORIZED",
            AuthError::Forbidden { .. } => "FORBIDDEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::EmailInUse { .. } => "EMAIL_IN_USE",
            AuthError::SessionExpired => "SESSION_EXPIRED",
        }
    }
}

// =============================================================================
// Export Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(String),

    #[error("Excel export failed: {0}")]
    Spreadsheet(String),

    #[error("PDF export failed: {0}")]
    Pdf(String),
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", .file.as_deref().map(|f| format!(" file '{f}'")).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for BackofficeError {
    fn from(err: serde_json::Error) -> Self {
        BackofficeError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for BackofficeError {
    fn from(err: serde_yaml::Error) -> Self {
        BackofficeError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for BackofficeError {
    fn from(err: uuid::Error) -> Self {
        BackofficeError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for BackofficeError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<BackofficeError>() {
            Ok(typed) => return typed,
            Err(err) => err,
        };
        let err = match err.downcast::<EntityError>() {
            Ok(entity) => return BackofficeError::Entity(entity),
            Err(err) => err,
        };
        let err = match err.downcast::<ValidationError>() {
            Ok(validation) => return BackofficeError::Validation(validation),
            Err(err) => err,
        };
        let err = match err.downcast::<AuthError>() {
            Ok(auth) => return BackofficeError::Auth(auth),
            Err(err) => err,
        };
        match err.downcast::<StorageError>() {
            Ok(storage) => BackofficeError::Storage(storage),
            Err(err) => BackofficeError::Internal(err.to_string()),
        }
    }
}

/// Result alias for operations that cross the HTTP boundary
pub type BackofficeResult<T> = Result<T, BackofficeError>;
