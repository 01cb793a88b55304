//! Carrier registry: freight companies

use crate::core::entity::{Column, ColumnFormat, Operation, Status};
use crate::core::field::FieldFormat;
use crate::core::validation::{EntityValidationConfig, filters, validators};
use crate::impl_record;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

impl_record!(
    Carrier,
    "carrier",
    "carriers",
    title: "Carriers",
    search: ["name", "document", "email", "vehicle_plate", "city"],
    columns: [
        Column::new("name", "Name", ColumnFormat::Text),
        Column::new("document", "CNPJ", ColumnFormat::Document),
        Column::new("email", "E-mail", ColumnFormat::Text),
        Column::new("phone", "Phone", ColumnFormat::Phone),
        Column::new("vehicle_plate", "Plate", ColumnFormat::Text),
        Column::new("city", "City", ColumnFormat::Text),
        Column::new("state", "UF", ColumnFormat::Text),
        Column::new("status", "Status", ColumnFormat::Status),
    ],
    {
        name: String,
        document: String,
        email: String,
        phone: String,
        /// Old (`ABC1234`) or Mercosul (`ABC1D23`) plate
        vehicle_plate: Option<String>,
        city: String,
        state: String,
    },
);

fn plate_format() -> FieldFormat {
    static PLATE: OnceLock<Regex> = OnceLock::new();
    let regex = PLATE.get_or_init(|| {
        Regex::new(r"^[A-Z]{3}[0-9][A-Z0-9][0-9]{2}$").expect("plate pattern is valid")
    });
    FieldFormat::Custom(regex.clone())
}

/// Filter: drop the dash and spaces of a typed plate
fn strip_plate_separators() -> impl Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + Clone
{
    |_: &str, value: Value| match value {
        Value::String(s) => Ok(Value::String(
            s.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect(),
        )),
        other => Ok(other),
    }
}

impl Carrier {
    pub fn schema(operation: Operation) -> EntityValidationConfig {
        let config = EntityValidationConfig::new("carrier")
            .filter("name", filters::trim())
            .validate("name", validators::required())
            .validate("name", validators::string_length(3, 120))
            .filter("document", filters::digits_only())
            .validate("document", validators::required())
            .validate("document", validators::cnpj())
            .filter("email", filters::trim())
            .filter("email", filters::lowercase())
            .validate("email", validators::required())
            .validate("email", validators::email())
            .filter("phone", filters::digits_only())
            .validate("phone", validators::required())
            .validate("phone", validators::phone())
            .filter("vehicle_plate", strip_plate_separators())
            .filter("vehicle_plate", filters::uppercase())
            .validate(
                "vehicle_plate",
                validators::matches(plate_format(), "a plate like ABC1234 or ABC1D23"),
            )
            .filter("city", filters::trim())
            .validate("city", validators::required())
            .validate("city", validators::string_length(2, 100))
            .filter("state", filters::trim())
            .filter("state", filters::uppercase())
            .validate("state", validators::required())
            .validate("state", validators::state_code())
            .validate("status", validators::in_list(&Status::ALL));

        match operation {
            Operation::Create => config,
            Operation::Update => config.partial(),
        }
    }
}
