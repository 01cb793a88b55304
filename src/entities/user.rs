//! User profiles
//!
//! A user is an identity-provider account plus a profile document that
//! shares its id. The password only travels in the create payload; it is
//! handed to the identity provider and never stored in the profile.

use crate::core::entity::{Column, ColumnFormat, Operation, Status};
use crate::core::validation::{EntityValidationConfig, filters, validators};
use crate::impl_record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Operator,
    #[default]
    Viewer,
}

impl UserRole {
    pub const ALL: [&'static str; 3] = ["admin", "operator", "viewer"];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Operator => "operator",
            UserRole::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "operator" => Some(UserRole::Operator),
            "viewer" => Some(UserRole::Viewer),
            _ => None,
        }
    }
}

/// Create-only field carrying the initial password
pub const PASSWORD_FIELD: &str = "password";

impl_record!(
    User,
    "user",
    "users",
    title: "Users",
    search: ["name", "email"],
    columns: [
        Column::new("name", "Name", ColumnFormat::Text),
        Column::new("email", "E-mail", ColumnFormat::Text),
        Column::new("role", "Role", ColumnFormat::Text),
        Column::new("created_at", "Created", ColumnFormat::Date),
        Column::new("status", "Status", ColumnFormat::Status),
    ],
    {
        name: String,
        email: String,
        #[serde(default)]
        role: UserRole,
    },
);

impl User {
    /// Create form: name, e-mail, password and role. Edit form: name and role;
    /// the e-mail is the login and stays fixed.
    pub fn schema(operation: Operation) -> EntityValidationConfig {
        let config = EntityValidationConfig::new("user")
            .filter("name", filters::trim())
            .validate("name", validators::required())
            .validate("name", validators::string_length(3, 120))
            .validate("role", validators::in_list(&UserRole::ALL))
            .validate("status", validators::in_list(&Status::ALL));

        match operation {
            Operation::Create => config
                .filter("email", filters::trim())
                .filter("email", filters::lowercase())
                .validate("email", validators::required())
                .validate("email", validators::email())
                .validate(PASSWORD_FIELD, validators::required())
                .validate(PASSWORD_FIELD, validators::string_length(8, 128)),
            Operation::Update => config.partial(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
