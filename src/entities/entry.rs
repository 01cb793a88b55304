//! Stock entries: inbound and outbound movements of a product
//!
//! Entries reference a client and a product by id and keep a copy of their
//! names for display; there is no referential integrity between registries.

use crate::core::entity::{Column, ColumnFormat, Operation, Status};
use crate::core::error::FieldValidationError;
use crate::core::validation::filters::round_to;
use crate::core::validation::{EntityValidationConfig, filters, validators};
use crate::entities::product::{MAX_AMOUNT, MAX_QUANTITY};
use crate::impl_record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Inbound,
    Outbound,
}

impl EntryKind {
    pub const ALL: [&'static str; 2] = ["inbound", "outbound"];
}

impl_record!(
    Entry,
    "entry",
    "entries",
    title: "Entries",
    search: ["client_name", "product_name", "carrier_name", "notes"],
    columns: [
        Column::new("date", "Date", ColumnFormat::Date),
        Column::new("kind", "Type", ColumnFormat::Text),
        Column::new("client_name", "Client", ColumnFormat::Text),
        Column::new("product_name", "Product", ColumnFormat::Text),
        Column::new("carrier_name", "Carrier", ColumnFormat::Text),
        Column::new("quantity", "Qty", ColumnFormat::Decimal),
        Column::new("unit_price", "Unit price (R$)", ColumnFormat::Decimal),
        Column::new("total", "Total (R$)", ColumnFormat::Decimal),
    ],
    {
        date: NaiveDate,
        kind: EntryKind,
        client_id: Uuid,
        client_name: String,
        product_id: Uuid,
        product_name: String,
        carrier_name: Option<String>,
        quantity: f64,
        unit_price: f64,
        /// `quantity * unit_price`, always recomputed on write
        #[serde(default)]
        total: f64,
        notes: Option<String>,
    },
    check = Entry::check_rules,
    normalize = Entry::compute_total,
);

impl Entry {
    pub fn schema(operation: Operation) -> EntityValidationConfig {
        let config = EntityValidationConfig::new("entry")
            .filter("date", filters::trim())
            .validate("date", validators::required())
            .validate("date", validators::date_format("%Y-%m-%d"))
            .filter("kind", filters::lowercase())
            .validate("kind", validators::required())
            .validate("kind", validators::in_list(&EntryKind::ALL))
            .validate("client_id", validators::required())
            .validate("client_id", validators::uuid())
            .filter("client_name", filters::trim())
            .validate("client_name", validators::required())
            .validate("product_id", validators::required())
            .validate("product_id", validators::uuid())
            .filter("product_name", filters::trim())
            .validate("product_name", validators::required())
            .filter("carrier_name", filters::trim())
            .filter("quantity", filters::parse_decimal())
            .filter("quantity", filters::round_decimals(3))
            .validate("quantity", validators::required())
            .validate("quantity", validators::number())
            .validate("quantity", validators::positive())
            .validate("quantity", validators::max_value(MAX_QUANTITY))
            .filter("unit_price", filters::parse_decimal())
            .filter("unit_price", filters::round_decimals(2))
            .validate("unit_price", validators::required())
            .validate("unit_price", validators::number())
            .validate("unit_price", validators::positive())
            .validate("unit_price", validators::max_value(MAX_AMOUNT))
            .filter("notes", filters::trim())
            .validate("notes", validators::string_length(0, 500))
            .validate("status", validators::in_list(&Status::ALL));

        match operation {
            Operation::Create => config,
            Operation::Update => config.partial(),
        }
    }

    fn compute_total(&mut self) {
        self.total = round_to(self.quantity * self.unit_price, 2);
    }

    /// A total that cannot be stored as a JSON number is refused
    fn check_rules(&self) -> Result<(), Vec<FieldValidationError>> {
        if self.total.is_finite() {
            Ok(())
        } else {
            Err(vec![FieldValidationError::new(
                "total",
                "quantity times unit price is out of range",
            )])
        }
    }
}
