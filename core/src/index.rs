//! Named index sets applied to the target table before a measurement.

use serde::Serialize;

use crate::error::ValidationError;
use crate::schema::{sane_name, TableSchema};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IndexSpec {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexSpec {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self { name: name.into(), columns: columns.iter().map(|c| c.to_string()).collect() }
    }

    /// Index named `idx_{table}_{col}_{col}...`.
    pub fn on(table: &TableSchema, columns: &[&str]) -> Self { Self::new(format!("idx_{}_{}", table.name(), columns.join("_")), columns) }

    pub fn validate(&self, table: &TableSchema) -> Result<(), ValidationError> {
        if !sane_name(&self.name) {
            return Err(ValidationError::Identifier(self.name.clone()));
        }
        if self.columns.is_empty() {
            return Err(ValidationError::EmptyIndex(self.name.clone()));
        }
        for column in &self.columns {
            if !sane_name(column) || !table.has_column(column) {
                return Err(ValidationError::Identifier(column.clone()));
            }
        }
        Ok(())
    }
}

/// Zero or more indexes that are active together during one measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexConfiguration {
    pub name: String,
    pub indexes: Vec<IndexSpec>,
}

impl IndexConfiguration {
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), indexes: Vec::new() } }

    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn is_empty(&self) -> bool { self.indexes.is_empty() }

    pub fn validate(&self, table: &TableSchema) -> Result<(), ValidationError> {
        if !sane_name(&self.name) {
            return Err(ValidationError::Identifier(self.name.clone()));
        }
        self.indexes.iter().try_for_each(|index| index.validate(table))
    }
}

/// The four configurations compared for `WHERE name = ? AND state_id = ?`, in presentation order.
pub fn standard_configurations(table: &TableSchema) -> Vec<IndexConfiguration> {
    vec![
        IndexConfiguration::new("no_index"),
        IndexConfiguration::new("state_id").with_index(IndexSpec::on(table, &["state_id"])),
        IndexConfiguration::new("name").with_index(IndexSpec::on(table, &["name"])),
        IndexConfiguration::new("name_state_id").with_index(IndexSpec::on(table, &["name", "state_id"])),
    ]
}

/// Parses `label=[index_name:]col+col,...`. An empty right-hand side means no indexes.
///
/// ```rust,ignore
/// parse_configuration("composite=name+state_id", &table)?;
/// parse_configuration("two=idx_a:name,idx_b:state_id", &table)?;
/// parse_configuration("baseline=", &table)?;
/// ```
pub fn parse_configuration(input: &str, table: &TableSchema) -> Result<IndexConfiguration, ValidationError> {
    let invalid = |reason: &str| ValidationError::Configuration { input: input.to_owned(), reason: reason.to_owned() };

    let (label, indexes) = input.split_once('=').ok_or_else(|| invalid("expected label=columns"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(invalid("empty label"));
    }

    let mut configuration = IndexConfiguration::new(label);
    for part in indexes.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, columns) = match part.split_once(':') {
            Some((name, columns)) => (Some(name.trim()), columns),
            None => (None, part),
        };
        let columns: Vec<&str> = columns.split('+').map(str::trim).filter(|c| !c.is_empty()).collect();
        if columns.is_empty() {
            return Err(invalid("index without columns"));
        }
        let index = match name {
            Some(name) => IndexSpec::new(name, &columns),
            None => IndexSpec::on(table, &columns),
        };
        configuration = configuration.with_index(index);
    }

    configuration.validate(table)?;
    Ok(configuration)
}
