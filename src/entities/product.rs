//! Product registry

use crate::core::entity::{Column, ColumnFormat, Operation, Status};
use crate::core::validation::{EntityValidationConfig, filters, validators};
use crate::impl_record;

/// Units of measure a product can be sold in
pub const UNITS: [&str; 8] = ["un", "kg", "g", "l", "ml", "m", "cx", "pc"];

/// Largest accepted price or unit price, in reais
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Largest accepted stock or entry quantity
pub const MAX_QUANTITY: f64 = 1_000_000_000.0;

impl_record!(
    Product,
    "product",
    "products",
    title: "Products",
    search: ["name", "code", "description"],
    columns: [
        Column::new("code", "Code", ColumnFormat::Text),
        Column::new("name", "Name", ColumnFormat::Text),
        Column::new("unit", "Unit", ColumnFormat::Text),
        Column::new("price", "Price (R$)", ColumnFormat::Decimal),
        Column::new("stock", "Stock", ColumnFormat::Decimal),
        Column::new("status", "Status", ColumnFormat::Status),
    ],
    {
        name: String,
        /// Internal SKU, upper case
        code: String,
        description: Option<String>,
        unit: String,
        price: f64,
        stock: f64,
    },
);

impl Product {
    pub fn schema(operation: Operation) -> EntityValidationConfig {
        let config = EntityValidationConfig::new("product")
            .filter("name", filters::trim())
            .validate("name", validators::required())
            .validate("name", validators::string_length(2, 120))
            .filter("code", filters::trim())
            .filter("code", filters::uppercase())
            .validate("code", validators::required())
            .validate("code", validators::string_length(1, 30))
            .filter("description", filters::trim())
            .validate("description", validators::string_length(0, 1000))
            .filter("unit", filters::trim())
            .filter("unit", filters::lowercase())
            .validate("unit", validators::required())
            .validate("unit", validators::in_list(&UNITS))
            .filter("price", filters::parse_decimal())
            .filter("price", filters::round_decimals(2))
            .validate("price", validators::required())
            .validate("price", validators::number())
            .validate("price", validators::positive())
            .validate("price", validators::max_value(MAX_AMOUNT))
            .filter("stock", filters::parse_decimal())
            .filter("stock", filters::round_decimals(3))
            .validate("stock", validators::required())
            .validate("stock", validators::number())
            .validate("stock", validators::non_negative())
            .validate("stock", validators::max_value(MAX_QUANTITY))
            .validate("status", validators::in_list(&Status::ALL));

        match operation {
            Operation::Create => config,
            Operation::Update => config.partial(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Record;
    use crate::core::field::FieldValue;
    use crate::core::service::record_from_payload;
    use serde_json::json;

    #[test]
    fn test_price_accepts_decimal_comma() {
        let out = Product::validation(Operation::Create)
            .validate_and_filter(json!({
                "name": "Cimento CP-II 50kg",
                "code": " cim-50 ",
                "unit": "UN",
                "price": "1.234,567",
                "stock": 12
            }))
            .unwrap();
        assert_eq!(out["code"], "CIM-50");
        assert_eq!(out["unit"], "un");
        assert_eq!(out["price"], json!(1234.57));
    }

    #[test]
    fn test_price_must_be_positive_number() {
        let errors = Product::validation(Operation::Update)
            .validate_and_filter(json!({"price": "free", "stock": -1}))
            .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["price", "stock"]);

        let errors = Product::validation(Operation::Update)
            .validate_and_filter(json!({"price": 0}))
            .unwrap_err();
        assert_eq!(errors[0].field, "price");
    }

    #[test]
    fn test_field_value_reads_numbers_and_options() {
        let product: Product = record_from_payload(
            json!({"name": "Areia", "code": "AR", "unit": "kg", "price": 2.5, "stock": 100}),
            None,
        )
        .unwrap();

        assert_eq!(product.field_value("price"), Some(FieldValue::Float(2.5)));
        assert_eq!(product.field_value("description"), Some(FieldValue::Null));
        assert_eq!(
            product.field_value("status"),
            Some(FieldValue::String("active".into()))
        );
        assert_eq!(product.field_value("unknown"), None);
    }
}
