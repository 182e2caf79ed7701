use std::time::Duration;

use serde::Serialize;

/// How the engine reached the rows of the target table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPath {
    FullScan,
    NonCoveringIndexLookup,
    CoveringIndexLookup,
    /// Anything else, carrying the engine's own node label.
    Other(String),
}

impl AccessPath {
    pub fn label(&self) -> &str {
        match self {
            AccessPath::FullScan => "full scan",
            AccessPath::NonCoveringIndexLookup => "non-covering index lookup",
            AccessPath::CoveringIndexLookup => "covering index lookup",
            AccessPath::Other(node) => node,
        }
    }

    /// Lower is better for an equality predicate: covering, then index filtering, then full scan.
    pub fn preference(&self) -> u8 {
        match self {
            AccessPath::CoveringIndexLookup => 0,
            AccessPath::NonCoveringIndexLookup => 1,
            AccessPath::Other(_) => 2,
            AccessPath::FullScan => 3,
        }
    }
}

impl std::fmt::Display for AccessPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.label()) }
}

/// Measurement of the fixed query under one index configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanMetric {
    pub access_path: AccessPath,
    pub index_name: Option<String>,
    /// Planner cost of the whole statement, when the engine reports one.
    pub estimated_cost: Option<f64>,
    pub estimated_rows: Option<f64>,
    /// Rows returned by the statement.
    pub actual_rows: u64,
    /// Rows read at the access node, including those a filter then discarded.
    pub rows_examined: Option<u64>,
    pub elapsed: Duration,
    /// Raw plan output as reported by the engine.
    pub plan: String,
}

impl PlanMetric {
    pub fn new(access_path: AccessPath, elapsed: Duration) -> Self {
        Self {
            access_path,
            index_name: None,
            estimated_cost: None,
            estimated_rows: None,
            actual_rows: 0,
            rows_examined: None,
            elapsed,
            plan: String::new(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 { self.elapsed.as_secs_f64() * 1000.0 }
}
