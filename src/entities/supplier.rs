//! Supplier registry

use crate::core::entity::{Column, ColumnFormat, Operation, Status};
use crate::core::validation::{EntityValidationConfig, filters, validators};
use crate::impl_record;

impl_record!(
    Supplier,
    "supplier",
    "suppliers",
    title: "Suppliers",
    search: ["name", "trade_name", "document", "email", "city"],
    columns: [
        Column::new("name", "Company name", ColumnFormat::Text),
        Column::new("trade_name", "Trade name", ColumnFormat::Text),
        Column::new("document", "CNPJ", ColumnFormat::Document),
        Column::new("email", "E-mail", ColumnFormat::Text),
        Column::new("phone", "Phone", ColumnFormat::Phone),
        Column::new("city", "City", ColumnFormat::Text),
        Column::new("state", "UF", ColumnFormat::Text),
        Column::new("status", "Status", ColumnFormat::Status),
    ],
    {
        /// Legal name
        name: String,
        trade_name: Option<String>,
        document: String,
        email: String,
        phone: String,
        city: String,
        state: String,
    },
);

impl Supplier {
    pub fn schema(operation: Operation) -> EntityValidationConfig {
        let config = EntityValidationConfig::new("supplier")
            .filter("name", filters::trim())
            .validate("name", validators::required())
            .validate("name", validators::string_length(3, 120))
            .filter("trade_name", filters::trim())
            .validate("trade_name", validators::string_length(2, 120))
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
