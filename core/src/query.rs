//! The fixed workload: an equality filter on two columns.

use serde::Serialize;

use crate::error::ValidationError;
use crate::schema::{quote_ident, sane_name, TableSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Text(String),
    Integer(i64),
}

impl Literal {
    /// SQL literal text. Single quotes inside text are doubled.
    pub fn render(&self) -> String {
        match self {
            Literal::Text(text) => format!("'{}'", text.replace('\'', "''")),
            Literal::Integer(number) => number.to_string(),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self { Literal::Text(value.to_owned()) }
}

impl From<String> for Literal {
    fn from(value: String) -> Self { Literal::Text(value) }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self { Literal::Integer(value) }
}

/// `SELECT <projection> FROM <table> WHERE <col> = <literal> AND ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTemplate {
    pub table: String,
    pub projection: Vec<String>,
    pub predicates: Vec<(String, Literal)>,
}

impl QueryTemplate {
    /// `SELECT name, state_id FROM <table> WHERE name = 'User_1000' AND state_id = 0`
    pub fn workload(table: &TableSchema) -> Self { Self::equality(table, "User_1000", 0) }

    /// The workload shape with other filter values.
    pub fn equality(table: &TableSchema, name: impl Into<String>, state_id: i64) -> Self {
        Self {
            table: table.name().to_owned(),
            projection: vec!["name".to_owned(), "state_id".to_owned()],
            predicates: vec![("name".to_owned(), Literal::Text(name.into())), ("state_id".to_owned(), Literal::Integer(state_id))],
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.projection.is_empty() {
            return Err(ValidationError::EmptyQuery("projection"));
        }
        if self.predicates.is_empty() {
            return Err(ValidationError::EmptyQuery("predicates"));
        }
        let columns = self.projection.iter().chain(self.predicates.iter().map(|(column, _)| column));
        for identifier in std::iter::once(&self.table).chain(columns) {
            if !sane_name(identifier) {
                return Err(ValidationError::Identifier(identifier.clone()));
            }
        }
        Ok(())
    }

    pub fn to_sql(&self) -> String {
        let projection = self.projection.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
        let filter =
            self.predicates.iter().map(|(column, value)| format!("{} = {}", quote_ident(column), value.render())).collect::<Vec<_>>().join(" AND ");
        format!("SELECT {} FROM {} WHERE {}", projection, quote_ident(&self.table), filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_sql() {
        let query = QueryTemplate::workload(&TableSchema::default());
        query.validate().unwrap();
        assert_eq!(query.to_sql(), r#"SELECT "name", "state_id" FROM "users" WHERE "name" = 'User_1000' AND "state_id" = 0"#);
    }

    #[test]
    fn test_literal_escaping() {
        assert_eq!(Literal::from("O'Brien").render(), "'O''Brien'");
        assert_eq!(Literal::from(-3).render(), "-3");
    }

    #[test]
    fn test_validate_rejects_bad_identifiers() {
        let mut query = QueryTemplate::workload(&TableSchema::default());
        query.projection.push("name; --".to_owned());
        assert!(matches!(query.validate(), Err(ValidationError::Identifier(_))));

        let mut query = QueryTemplate::workload(&TableSchema::default());
        query.predicates.clear();
        assert_eq!(query.validate(), Err(ValidationError::EmptyQuery("predicates")));
    }
}
