//! Reusable field validators
//!
//! Every validator receives the field name and the already-filtered value.
//! Validators other than [`required`] let `null` through so that optional
//! fields can be left blank.

use super::documents;
use crate::core::field::FieldFormat;
use serde_json::Value;

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Validator: field is required (present, not null, not blank)
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if is_blank(value) {
            Err(format!("'{}' is required", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: field is optional (always valid)
pub fn optional() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, _: &Value| Ok(())
}

/// Validator: string length must be within range (in characters)
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        if len < min {
            Err(format!(
                "'{}' must have at least {} characters (got {})",
                field, min, len
            ))
        } else if len > max {
            Err(format!(
                "'{}' must not exceed {} characters (got {})",
                field, max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be a number
pub fn number() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() || value.is_number() {
            Ok(())
        } else {
            Err(format!("'{}' must be a number", field))
        }
    }
}

/// Validator: number must be strictly positive
pub fn positive() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num <= 0.0 => Err(format!("'{}' must be positive (got {})", field, num)),
        _ => Ok(()),
    }
}

/// Validator: number must be zero or more
pub fn non_negative() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num < 0.0 => Err(format!("'{}' must not be negative (got {})", field, num)),
        _ => Ok(()),
    }
}

/// Validator: number must not exceed maximum
pub fn max_value(max: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num > max => Err(format!(
            "'{}' must not exceed {} (got {})",
            field, max, num
        )),
        _ => Ok(()),
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: &'static [&'static str],
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if !allowed.contains(&s) => Err(format!(
            "'{}' must be one of {:?} (got {})",
            field, allowed, s
        )),
        _ => Ok(()),
    }
}

/// Validator: date must match format
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if chrono::NaiveDate::parse_from_str(s, format).is_err() => Err(format!(
            "'{}' must be a date in format {} (got {})",
            field, format, s
        )),
        _ => Ok(()),
    }
}

/// Validator: e-mail address
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if !FieldFormat::Email.validate(s) => {
            Err(format!("'{}' must be a valid e-mail address", field))
        }
        _ => Ok(()),
    }
}

/// Validator: phone number (digits only, with area code)
pub fn phone() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if !FieldFormat::Phone.validate(s) => Err(format!(
            "'{}' must be a phone number with area code (10 or 11 digits)",
            field
        )),
        _ => Ok(()),
    }
}

/// Validator: CPF with valid check digits
pub fn cpf() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if !documents::is_valid_cpf(s) => Err(format!("'{}' is not a valid CPF", field)),
        _ => Ok(()),
    }
}

/// Validator: CNPJ with valid check digits
pub fn cnpj() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if !documents::is_valid_cnpj(s) => {
            Err(format!("'{}' is not a valid CNPJ", field))
        }
        _ => Ok(()),
    }
}

/// Validator: CPF or CNPJ, chosen by the number of digits
pub fn cpf_or_cnpj() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if !(documents::is_valid_cpf(s) || documents::is_valid_cnpj(s)) => {
            Err(format!("'{}' is not a valid CPF or CNPJ", field))
        }
        _ => Ok(()),
    }
}

/// Validator: CEP (8 digits)
pub fn zip_code() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if s.len() != 8 || !s.chars().all(|c| c.is_ascii_digit()) => {
            Err(format!("'{}' must be a CEP with 8 digits", field))
        }
        _ => Ok(()),
    }
}

/// Validator: two-letter Brazilian state code
pub fn state_code() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if !documents::STATE_CODES.contains(&s) => {
            Err(format!("'{}' is not a valid state code (got {})", field, s))
        }
        _ => Ok(()),
    }
}

/// Validator: UUID reference to another record
pub fn uuid() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if uuid::Uuid::parse_str(s).is_err() => {
            Err(format!("'{}' must be a valid identifier", field))
        }
        _ => Ok(()),
    }
}

/// Validator: string must match a format
///
/// `description` completes the sentence "'field' must be ...".
pub fn matches(
    format: FieldFormat,
    description: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if !format.validate(s) => Err(format!("'{}' must be {}", field, description)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_rejects_null_and_blank() {
        let v = required();
        assert!(v("name", &json!(null)).is_err());
        assert!(v("name", &json!("   ")).is_err());
        assert!(v("name", &json!("Ana")).is_ok());
        assert!(v("price", &json!(0)).is_ok());
    }

    #[test]
    fn test_optional_always_ok() {
        let v = optional();
        assert!(v("notes", &json!(null)).is_ok());
        assert!(v("notes", &json!("x")).is_ok());
    }

    #[test]
    fn test_string_length_counts_characters() {
        let v = string_length(2, 4);
        assert!(v("name", &json!("ção")).is_ok());
        let err = v("name", &json!("a")).unwrap_err();
        assert!(err.contains("at least 2"));
        let err = v("name", &json!("abcde")).unwrap_err();
        assert!(err.contains("exceed 4"));
        assert!(v("name", &json!(null)).is_ok());
    }

    #[test]
    fn test_number_rejects_strings() {
        let v = number();
        assert!(v("price", &json!("12")).is_err());
        assert!(v("price", &json!(12)).is_ok());
        assert!(v("price", &json!(null)).is_ok());
    }

    #[test]
    fn test_positive_and_non_negative() {
        assert!(positive()("price", &json!(0)).is_err());
        assert!(positive()("price", &json!(0.01)).is_ok());
        assert!(non_negative()("stock", &json!(0)).is_ok());
        assert!(non_negative()("stock", &json!(-1)).is_err());
    }

    #[test]
    fn test_max_value() {
        assert!(max_value(10.0)("qty", &json!(10)).is_ok());
        assert!(max_value(10.0)("qty", &json!(10.5)).is_err());
    }

    #[test]
    fn test_in_list() {
        const ROLES: &[&str] = &["admin", "operator"];
        let v = in_list(ROLES);
        assert!(v("role", &json!("admin")).is_ok());
        assert!(v("role", &json!("root")).unwrap_err().contains("one of"));
    }

    #[test]
    fn test_date_format() {
        let v = date_format("%Y-%m-%d");
        assert!(v("date", &json!("2024-02-29")).is_ok());
        assert!(v("date", &json!("2023-02-29")).is_err());
        assert!(v("date", &json!("29/02/2024")).is_err());
    }

    #[test]
    fn test_documents() {
        assert!(cpf()("document", &json!("52998224725")).is_ok());
        assert!(cpf()("document", &json!("52998224724")).is_err());
        assert!(cnpj()("document", &json!("11222333000181")).is_ok());
        assert!(cnpj()("document", &json!("52998224725")).is_err());
        assert!(cpf_or_cnpj()("document", &json!("52998224725")).is_ok());
        assert!(cpf_or_cnpj()("document", &json!("11222333000181")).is_ok());
        assert!(cpf_or_cnpj()("document", &json!("123")).is_err());
    }

    #[test]
    fn test_zip_and_state() {
        assert!(zip_code()("zip_code", &json!("01310100")).is_ok());
        assert!(zip_code()("zip_code", &json!("0131010")).is_err());
        assert!(state_code()("state", &json!("SP")).is_ok());
        assert!(state_code()("state", &json!("XX")).is_err());
    }

    #[test]
    fn test_email_and_phone() {
        assert!(email()("email", &json!("ana@empresa.com")).is_ok());
        assert!(email()("email", &json!("ana")).is_err());
        assert!(phone()("phone", &json!("11987654321")).is_ok());
        assert!(phone()("phone", &json!("987654321")).is_err());
    }

    #[test]
    fn test_uuid_reference() {
        assert!(uuid()("client_id", &json!(uuid::Uuid::new_v4().to_string())).is_ok());
        assert!(uuid()("client_id", &json!("nope")).is_err());
    }

    #[test]
    fn test_matches_custom_format() {
        let format = FieldFormat::Custom(regex::Regex::new(r"^[A-Z]{3}[0-9]{4}$").unwrap());
        let v = matches(format, "a plate like ABC1234");
        assert!(v("plate", &json!("ABC1234")).is_ok());
        assert!(v("plate", &json!("abc")).unwrap_err().contains("ABC1234"));
    }
}
