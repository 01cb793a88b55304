//! Client registry: individuals (CPF) and companies (CNPJ)

use crate::core::entity::{Column, ColumnFormat, Operation, Status};
use crate::core::error::FieldValidationError;
use crate::core::validation::{EntityValidationConfig, filters, validators};
use crate::impl_record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonType {
    Individual,
    Company,
}

impl PersonType {
    pub const ALL: [&'static str; 2] = ["individual", "company"];
}

impl_record!(
    Client,
    "client",
    "clients",
    title: "Clients",
    search: ["name", "document", "email", "phone", "city"],
    columns: [
        Column::new("name", "Name", ColumnFormat::Text),
        Column::new("document", "CPF/CNPJ", ColumnFormat::Document),
        Column::new("email", "E-mail", ColumnFormat::Text),
        Column::new("phone", "Phone", ColumnFormat::Phone),
        Column::new("zip_code", "CEP", ColumnFormat::ZipCode),
        Column::new("city", "City", ColumnFormat::Text),
        Column::new("state", "UF", ColumnFormat::Text),
        Column::new("status", "Status", ColumnFormat::Status),
    ],
    {
        name: String,
        person_type: PersonType,
        /// CPF (11 digits) or CNPJ (14 digits), stored unmasked
        document: String,
        email: String,
        phone: String,
        zip_code: String,
        address: String,
        city: String,
        state: String,
    },
    check = Client::check_rules,
);

impl Client {
    pub fn schema(operation: Operation) -> EntityValidationConfig {
        let config = EntityValidationConfig::new("client")
            .filter("name", filters::trim())
            .validate("name", validators::required())
            .validate("name", validators::string_length(3, 120))
            .validate("person_type", validators::required())
            .validate("person_type", validators::in_list(&PersonType::ALL))
            .filter("document", filters::digits_only())
            .validate("document", validators::required())
            .validate("document", validators::cpf_or_cnpj())
            .filter("email", filters::trim())
            .filter("email", filters::lowercase())
            .validate("email", validators::required())
            .validate("email", validators::email())
            .filter("phone", filters::digits_only())
            .validate("phone", validators::required())
            .validate("phone", validators::phone())
            .filter("zip_code", filters::digits_only())
            .validate("zip_code", validators::required())
            .validate("zip_code", validators::zip_code())
            .filter("address", filters::trim())
            .validate("address", validators::required())
            .validate("address", validators::string_length(3, 200))
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

    /// The document kind must agree with the person type
    fn check_rules(&self) -> Result<(), Vec<FieldValidationError>> {
        let expected = match self.document.len() {
            11 => PersonType::Individual,
            14 => PersonType::Company,
            _ => return Ok(()),
        };
        if self.person_type == expected {
            return Ok(());
        }

        let message = match self.person_type {
            PersonType::Individual => "individuals must be registered with a CPF",
            PersonType::Company => "companies must be registered with a CNPJ",
        };
        Err(vec![FieldValidationError::new("document", message)])
    }
}
