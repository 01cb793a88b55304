//! Macros for reducing boilerplate when defining registry records
//!
//! Every record carries the same envelope (`id`, `created_at`,
//! `updated_at`, `status`); the macro injects it and implements
//! [`Entity`](crate::core::entity::Entity) and
//! [`Record`](crate::core::entity::Record) on top of the declared fields.

/// Define a registry record with automatic trait implementations
///
/// The type must provide an inherent `schema(Operation) -> EntityValidationConfig`
/// function. Cross-field rules and derived fields are hooked in with the
/// optional `check` and `normalize` clauses.
///
/// # Example
///
/// ```rust,ignore
/// impl_record!(
///     Product, "product", "products",
///     title: "Products",
///     search: ["name", "code"],
///     columns: [
///         Column::new("code", "Code", ColumnFormat::Text),
///         Column::new("name", "Name", ColumnFormat::Text),
///     ],
///     {
///         name: String,
///         code: String,
///         price: f64,
///     },
///     check = Product::check_rules,
/// );
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident,
        $singular:expr,
        $plural:expr,
        title: $title:expr,
        search: [ $( $search_field:expr ),* $(,)? ],
        columns: [ $( $column:expr ),* $(,)? ],
        {
            $( $(#[$meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        }
        $(, check = $check:path )?
        $(, normalize = $normalize:path )?
        $(,)?
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            pub id: ::uuid::Uuid,

            pub created_at: ::chrono::DateTime<::chrono::Utc>,

            pub updated_at: ::chrono::DateTime<::chrono::Utc>,

            #[serde(default)]
            pub status: $crate::core::entity::Status,

            $( $(#[$meta])* pub $field : $field_type, )*
        }

        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn status(&self) -> $crate::core::entity::Status {
                self.status
            }
        }

        impl $crate::core::entity::Record for $type {
            fn title() -> &'static str {
                $title
            }

            fn search_fields() -> &'static [&'static str] {
                &[ $( $search_field ),* ]
            }

            fn columns() -> &'static [$crate::core::entity::Column] {
                const COLUMNS: &[$crate::core::entity::Column] = &[ $( $column ),* ];
                COLUMNS
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                use $crate::core::field::FieldValue;

                let json = match field {
                    "id" => ::serde_json::to_value(self.id),
                    "created_at" => ::serde_json::to_value(self.created_at),
                    "updated_at" => ::serde_json::to_value(self.updated_at),
                    "status" => ::serde_json::to_value(self.status),
                    $( stringify!($field) => ::serde_json::to_value(&self.$field), )*
                    _ => return None,
                };
                json.ok().map(|value| FieldValue::from_json(&value))
            }

            fn validation(
                operation: $crate::core::entity::Operation,
            ) -> $crate::core::validation::EntityValidationConfig {
                <$type>::schema(operation)
            }

            $(
                fn check(&self) -> Result<(), Vec<$crate::core::error::FieldValidationError>> {
                    $check(self)
                }
            )?

            $(
                fn normalize(&mut self) {
                    $normalize(self)
                }
            )?

            fn set_status(&mut self, status: $crate::core::entity::Status) {
                self.status = status;
            }

            fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }
        }
    };
}
