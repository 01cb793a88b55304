//! Declarative validation schema for a registry form

use crate::core::error::FieldValidationError;
use anyhow::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

type ValidatorFn = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type FilterFn = Arc<dyn Fn(&str, Value) -> Result<Value> + Send + Sync>;

#[derive(Clone, Default)]
struct FieldRules {
    filters: Vec<FilterFn>,
    validators: Vec<ValidatorFn>,
}

/// Validation and filtering rules for one entity operation
///
/// Only declared fields survive [`validate_and_filter`](Self::validate_and_filter);
/// anything else in the payload (ids, timestamps, unknown keys) is dropped.
/// Blank strings are treated as `null`, the way an empty form input is.
/// A [`partial`](Self::partial) schema (edit forms) skips absent fields.
#[derive(Clone)]
pub struct EntityValidationConfig {
    entity_type: &'static str,
    fields: Vec<(&'static str, FieldRules)>,
    partial: bool,
}

impl EntityValidationConfig {
    pub fn new(entity_type: &'static str) -> Self {
        Self {
            entity_type,
            fields: Vec::new(),
            partial: false,
        }
    }

    /// Only validate the fields present in the payload
    pub fn partial(mut self) -> Self {
        self.partial = true;
        self
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn entity_type(&self) -> &str {
        self.entity_type
    }

    fn rules_mut(&mut self, field: &'static str) -> &mut FieldRules {
        let index = match self.fields.iter().position(|(name, _)| *name == field) {
            Some(index) => index,
            None => {
                self.fields.push((field, FieldRules::default()));
                self.fields.len() - 1
            }
        };
        &mut self.fields[index].1
    }

    /// Declare a field without rules (accepted as-is)
    pub fn field(mut self, field: &'static str) -> Self {
        self.rules_mut(field);
        self
    }

    /// Add a validator to a field
    pub fn validate<V>(mut self, field: &'static str, validator: V) -> Self
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules_mut(field).validators.push(Arc::new(validator));
        self
    }

    /// Add a filter to a field; filters run in declaration order, before validators
    pub fn filter<F>(mut self, field: &'static str, filter: F) -> Self
    where
        F: Fn(&str, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.rules_mut(field).filters.push(Arc::new(filter));
        self
    }

    /// Names of the declared fields
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    /// Filter then validate a payload
    ///
    /// Returns the cleaned object with the declared fields that were present,
    /// or every failing field at once.
    pub fn validate_and_filter(&self, payload: Value) -> Result<Value, Vec<FieldValidationError>> {
        let Value::Object(mut input) = payload else {
            return Err(vec![FieldValidationError::new(
                self.entity_type,
                "expected a JSON object",
            )]);
        };

        let mut output = Map::new();
        let mut errors = Vec::new();

        for (field, rules) in &self.fields {
            let present = input.contains_key(*field);
            if !present && self.partial {
                continue;
            }
            let mut value = input.remove(*field).unwrap_or(Value::Null);

            for filter in &rules.filters {
                if value.is_null() {
                    break;
                }
                match filter(field, value.clone()) {
                    Ok(filtered) => value = filtered,
                    Err(e) => {
                        errors.push(FieldValidationError::new(*field, e.to_string()));
                        break;
                    }
                }
            }

            if value.as_str().is_some_and(|s| s.trim().is_empty()) {
                value = Value::Null;
            }

            for validator in &rules.validators {
                if let Err(message) = validator(field, &value) {
                    errors.push(FieldValidationError::new(*field, message));
                }
            }

            if present {
                output.insert((*field).to_string(), value);
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(errors)
        }
    }
}

impl std::fmt::Debug for EntityValidationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityValidationConfig")
            .field("entity_type", &self.entity_type)
            .field("fields", &self.field_names())
            .field("partial", &self.partial)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::{filters, validators};
    use serde_json::json;

    fn config() -> EntityValidationConfig {
        EntityValidationConfig::new("product")
            .filter("name", filters::trim())
            .validate("name", validators::required())
            .validate("name", validators::string_length(2, 10))
            .filter("code", filters::trim())
            .filter("code", filters::uppercase())
            .validate("code", validators::required())
            .filter("price", filters::round_decimals(2))
            .validate("price", validators::positive())
            .field("notes")
    }

    #[test]
    fn test_filters_run_before_validators() {
        let out = config()
            .validate_and_filter(json!({"name": "  Pen ", "code": " ab-1 ", "price": 1.239}))
            .expect("payload is valid");
        assert_eq!(out, json!({"name": "Pen", "code": "AB-1", "price": 1.24}));
    }

    #[test]
    fn test_all_errors_collected() {
        let errors = config()
            .validate_and_filter(json!({"name": "P", "price": -1}))
            .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "code", "price"]);
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let out = config()
            .validate_and_filter(json!({
                "name": "Pen", "code": "X", "id": "abc", "created_at": "now"
            }))
            .unwrap();
        assert!(out.get("id").is_none());
        assert!(out.get("created_at").is_none());
    }

    #[test]
    fn test_blank_optional_becomes_null() {
        let out = config()
            .validate_and_filter(json!({"name": "Pen", "code": "X", "notes": "   "}))
            .unwrap();
        assert_eq!(out["notes"], Value::Null);
    }

    #[test]
    fn test_absent_fields_not_emitted() {
        let cfg = EntityValidationConfig::new("product")
            .validate("price", validators::optional())
            .field("name");
        let out = cfg.validate_and_filter(json!({"name": "Pen"})).unwrap();
        assert_eq!(out, json!({"name": "Pen"}));
    }

    #[test]
    fn test_partial_skips_absent_fields() {
        let out = config()
            .partial()
            .validate_and_filter(json!({"price": "12"}))
            .unwrap();
        assert_eq!(out, json!({"price": "12"}));

        let errors = config()
            .partial()
            .validate_and_filter(json!({"name": "  "}))
            .unwrap_err();
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn test_non_object_rejected() {
        let errors = config().validate_and_filter(json!([1, 2])).unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
