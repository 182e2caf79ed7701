//! SQL text for the SQLite backend
//!
//! Identifiers come from validated [`TableSchema`] / [`IndexSpec`] values and are always quoted.

use seedbench_core::schema::{quote_ident, RECORD_COLUMNS};
use seedbench_core::{IndexSpec, TableSchema};

pub fn create_table(table: &TableSchema) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {}(
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "name" TEXT NOT NULL,
            "email" TEXT NOT NULL UNIQUE,
            "password" TEXT NOT NULL,
            "date_of_birth" TEXT NOT NULL,
            "address" TEXT NOT NULL,
            "city" TEXT NOT NULL,
            "state_id" INTEGER NOT NULL,
            "zip" TEXT NOT NULL,
            "country_id" INTEGER NOT NULL,
            "account_type" TEXT NOT NULL,
            "closest_airport" TEXT NOT NULL
        )"#,
        quote_ident(table.name())
    )
}

/// One statement per batch: the batch is bound as a JSON array and expanded by `json_each`.
pub fn insert_batch(table: &TableSchema) -> String {
    let columns = RECORD_COLUMNS.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    let extracts = RECORD_COLUMNS.iter().map(|c| format!("json_extract(value, '$.{}')", c)).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {}({}) SELECT {} FROM json_each(?1)", quote_ident(table.name()), columns, extracts)
}

/// Deliberately without `IF NOT EXISTS`: a name clash must fail.
pub fn create_index(table: &TableSchema, index: &IndexSpec) -> String {
    let columns = index.columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    format!("CREATE INDEX {} ON {}({})", quote_ident(&index.name), quote_ident(table.name()), columns)
}

pub fn drop_index(index: &IndexSpec) -> String { format!("DROP INDEX {}", quote_ident(&index.name)) }

pub fn truncate(table: &TableSchema) -> String { format!("DELETE FROM {}", quote_ident(table.name())) }

/// Restarts the AUTOINCREMENT counter after a truncate.
pub const RESET_SEQUENCE: &str = "DELETE FROM sqlite_sequence WHERE name = ?1";

pub fn row_count(table: &TableSchema) -> String { format!("SELECT COUNT(*) FROM {}", quote_ident(table.name())) }

pub fn explain_query_plan(sql: &str) -> String { format!("EXPLAIN QUERY PLAN {}", sql) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_batch_sql() {
        let sql = insert_batch(&TableSchema::default());
        assert!(sql.starts_with(r#"INSERT INTO "users"("name", "email", "password""#));
        assert!(sql.contains("json_extract(value, '$.closest_airport')"));
        assert!(sql.ends_with("FROM json_each(?1)"));
    }

    #[test]
    fn test_index_sql() {
        let table = TableSchema::default();
        let index = IndexSpec::on(&table, &["name", "state_id"]);
        assert_eq!(create_index(&table, &index), r#"CREATE INDEX "idx_users_name_state_id" ON "users"("name", "state_id")"#);
        assert_eq!(drop_index(&index), r#"DROP INDEX "idx_users_name_state_id""#);
    }
}
