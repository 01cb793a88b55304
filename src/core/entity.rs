//! Entity traits defining the core abstraction for all registry records

use crate::core::error::FieldValidationError;
use crate::core::field::FieldValue;
use crate::core::validation::EntityValidationConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Lifecycle status shared by every registry record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub const ALL: [&'static str; 2] = ["active", "inactive"];

    /// The other status (bulk toggle)
    pub fn toggled(self) -> Self {
        match self {
            Status::Active => Status::Inactive,
            Status::Inactive => Status::Active,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }

    /// Label used in exported reports
    pub fn label(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }
}

/// Form operation a payload is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// How an exported column is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    Text,
    /// CPF or CNPJ, masked by length
    Document,
    Phone,
    ZipCode,
    /// `YYYY-MM-DD` rendered as `dd/mm/yyyy`
    Date,
    /// Two decimal places
    Decimal,
    Integer,
    Status,
}

/// One column of a registry table / export
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
    pub format: ColumnFormat,
}

impl Column {
    pub const fn new(key: &'static str, header: &'static str, format: ColumnFormat) -> Self {
        Self {
            key,
            header,
            format,
        }
    }
}

/// Base trait for all entities in the system.
///
/// All entities have an id, creation and modification timestamps and a
/// [`Status`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs and as collection name (e.g., "clients")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "client")
    fn resource_name_singular() -> &'static str;

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    fn status(&self) -> Status;

    fn is_active(&self) -> bool {
        self.status() == Status::Active
    }
}

/// A registry record: a flat document with a validation schema
///
/// Implemented by the `impl_record!` macro; entities override
/// [`Record::check`] and [`Record::normalize`] for cross-field rules.
pub trait Record: Entity + Serialize + DeserializeOwned + std::fmt::Debug {
    /// Title shown on exported reports
    fn title() -> &'static str;

    /// Fields matched by the free-text search box
    fn search_fields() -> &'static [&'static str];

    /// Table and export columns, in display order
    fn columns() -> &'static [Column];

    /// Read a field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Validation and filtering schema for a form operation
    fn validation(operation: Operation) -> EntityValidationConfig;

    /// Cross-field rules evaluated after the schema passed
    fn check(&self) -> Result<(), Vec<FieldValidationError>> {
        Ok(())
    }

    /// Recompute derived fields before the record is written
    fn normalize(&mut self) {}

    fn set_status(&mut self, status: Status);

    fn touch(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_toggle() {
        assert_eq!(Status::Active.toggled(), Status::Inactive);
        assert_eq!(Status::Inactive.toggled(), Status::Active);
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_value(Status::Inactive).unwrap();
        assert_eq!(json, "inactive");
        let parsed: Status = serde_json::from_value(serde_json::json!("active")).unwrap();
        assert_eq!(parsed, Status::Active);
    }

    #[test]
    fn test_status_all_matches_serde_names() {
        for name in Status::ALL {
            let parsed: Status = serde_json::from_value(serde_json::json!(name)).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }
}
