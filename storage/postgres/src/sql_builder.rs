//! SQL text for the Postgres backend
//!
//! Identifiers come from validated [`TableSchema`] / [`IndexSpec`] values and are always quoted.

use seedbench_core::schema::{quote_ident, RECORD_COLUMNS};
use seedbench_core::{IndexSpec, TableSchema};

pub fn create_table(table: &TableSchema) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {}(
            "id" BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
            "name" VARCHAR(64) NOT NULL,
            "email" VARCHAR(128) NOT NULL UNIQUE,
            "password" VARCHAR(64) NOT NULL,
            "date_of_birth" DATE NOT NULL,
            "address" VARCHAR(128) NOT NULL,
            "city" VARCHAR(64) NOT NULL,
            "state_id" INTEGER NOT NULL,
            "zip" CHAR(5) NOT NULL,
            "country_id" INTEGER NOT NULL,
            "account_type" VARCHAR(16) NOT NULL,
            "closest_airport" CHAR(3) NOT NULL
        )"#,
        quote_ident(table.name())
    )
}

/// The whole batch is bound once as `$1` and expanded server side against the table's row type.
pub fn insert_batch(table: &TableSchema) -> String {
    let columns = RECORD_COLUMNS.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    let table = quote_ident(table.name());
    format!("INSERT INTO {table}({columns}) SELECT {columns} FROM json_populate_recordset(NULL::{table}, $1::json)")
}

/// No `IF NOT EXISTS`: a name clash must fail.
pub fn create_index(table: &TableSchema, index: &IndexSpec) -> String {
    let columns = index.columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    format!("CREATE INDEX {} ON {}({})", quote_ident(&index.name), quote_ident(table.name()), columns)
}

pub fn drop_index(index: &IndexSpec) -> String { format!("DROP INDEX {}", quote_ident(&index.name)) }

pub fn truncate(table: &TableSchema) -> String { format!("TRUNCATE TABLE {} RESTART IDENTITY", quote_ident(table.name())) }

pub fn row_count(table: &TableSchema) -> String { format!("SELECT COUNT(*) FROM {}", quote_ident(table.name())) }

/// Refreshes planner statistics and the visibility map, so index-only scans are costed as such.
pub fn vacuum_analyze(table: &TableSchema) -> String { format!("VACUUM ANALYZE {}", quote_ident(table.name())) }

/// Executes the statement and reports the plan with actual counts.
pub fn explain_analyze(sql: &str) -> String { format!("EXPLAIN (ANALYZE, FORMAT JSON) {}", sql) }
