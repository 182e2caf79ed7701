use serde::Serialize;

use crate::error::ValidationError;

/// Derived columns in insertion order. The auto-incremented `id` is left to the database.
pub const RECORD_COLUMNS: &[&str] = &[
    "name",
    "email",
    "password",
    "date_of_birth",
    "address",
    "city",
    "state_id",
    "zip",
    "country_id",
    "account_type",
    "closest_airport",
];

pub const DEFAULT_TABLE: &str = "users";

/// The target table a generator fills and a benchmark measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    name: String,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if !sane_name(&name) {
            return Err(ValidationError::Identifier(name));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn has_column(&self, column: &str) -> bool { column == "id" || RECORD_COLUMNS.contains(&column) }
}

impl Default for TableSchema {
    fn default() -> Self { Self { name: DEFAULT_TABLE.to_owned() } }
}

/// Identifiers are interpolated into DDL, so only `[A-Za-z0-9_]` is allowed.
pub fn sane_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 63 && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn quote_ident(name: &str) -> String { format!("\"{}\"", name) }
