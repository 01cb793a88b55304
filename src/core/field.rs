//! Field values used by list search, sorting and exports

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// A polymorphic field value read out of a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    /// Convert a JSON value into a field value
    ///
    /// Arrays and objects have no place in flat records and map to `Null`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::Bool(b) => FieldValue::Boolean(*b),
            _ => FieldValue::Null,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Ordering used by list sorting
    ///
    /// Numbers compare numerically, strings case- and accent-insensitively.
    /// ISO dates and RFC 3339 timestamps sort chronologically as strings.
    /// `Null` sorts after everything else.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Greater,
            (_, FieldValue::Null) => Ordering::Less,
            (FieldValue::String(a), FieldValue::String(b)) => fold(a).cmp(&fold(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => a.display().cmp(&b.display()),
            },
        }
    }

    /// Whether this value contains the (already folded) search term
    pub fn contains(&self, folded_term: &str) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::String(s) => fold(s).contains(folded_term),
            other => other.display().contains(folded_term),
        }
    }

    /// Plain textual rendering
    pub fn display(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => format!("{:.2}", f),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Null => String::new(),
        }
    }
}

/// Lowercase and strip the Latin diacritics common in Portuguese text
pub fn fold(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Field format validators
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    Phone,
    Custom(Regex),
}

impl FieldFormat {
    pub fn validate(&self, value: &str) -> bool {
        match self {
            FieldFormat::Email => Self::is_valid_email(value),
            FieldFormat::Phone => Self::is_valid_phone(value),
            FieldFormat::Custom(regex) => regex.is_match(value),
        }
    }

    fn is_valid_email(email: &str) -> bool {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                .expect("email pattern is valid")
        });
        regex.is_match(email)
    }

    /// Brazilian phone numbers: area code plus 8 (landline) or 9 (mobile) digits
    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PHONE_REGEX.get_or_init(|| {
            Regex::new(r"^[1-9]{2}9?[0-9]{8}$").expect("phone pattern is valid")
        });
        regex.is_match(phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(FieldValue::from_json(&json!(3)), FieldValue::Integer(3));
        assert_eq!(FieldValue::from_json(&json!(2.5)), FieldValue::Float(2.5));
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(&json!(["a"])), FieldValue::Null);
    }

    #[test]
    fn test_compare_mixed_numbers() {
        let a = FieldValue::Integer(10);
        let b = FieldValue::Float(9.5);
        assert_eq!(a.compare(&b), Ordering::Greater);
    }

    #[test]
    fn test_compare_strings_ignores_case_and_accents() {
        let a = FieldValue::String("Álvaro".into());
        let b = FieldValue::String("alvaro".into());
        assert_eq!(a.compare(&b), Ordering::Equal);

        let c = FieldValue::String("beatriz".into());
        assert_eq!(a.compare(&c), Ordering::Less);
    }

    #[test]
    fn test_null_sorts_last() {
        let a = FieldValue::Null;
        let b = FieldValue::String("x".into());
        assert_eq!(a.compare(&b), Ordering::Greater);
        assert_eq!(b.compare(&a), Ordering::Less);
    }

    #[test]
    fn test_contains_folded() {
        let v = FieldValue::String("São José".into());
        assert!(v.contains("sao jo"));
        assert!(!FieldValue::Null.contains("x"));
        assert!(FieldValue::Integer(1234).contains("23"));
    }

    #[test]
    fn test_email_format() {
        assert!(FieldFormat::Email.validate("contato@empresa.com.br"));
        assert!(!FieldFormat::Email.validate("contato@"));
    }

    #[test]
    fn test_phone_format() {
        assert!(FieldFormat::Phone.validate("11987654321"));
        assert!(FieldFormat::Phone.validate("1133334444"));
        assert!(!FieldFormat::Phone.validate("0133334444"));
        assert!(!FieldFormat::Phone.validate("123"));
    }
}
