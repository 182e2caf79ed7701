//! Reading `EXPLAIN (ANALYZE, FORMAT JSON)` output

use std::time::Duration;

use seedbench_core::{AccessPath, PlanError, PlanMetric};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ExplainOutput {
    #[serde(rename = "Plan")]
    pub plan: PlanNode,
    #[serde(rename = "Execution Time")]
    pub execution_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PlanNode {
    #[serde(rename = "Node Type")]
    pub node_type: String,
    #[serde(rename = "Relation Name")]
    pub relation_name: Option<String>,
    #[serde(rename = "Index Name")]
    pub index_name: Option<String>,
    #[serde(rename = "Total Cost")]
    pub total_cost: f64,
    #[serde(rename = "Plan Rows")]
    pub plan_rows: f64,
    // Fractional since Postgres 18
    #[serde(rename = "Actual Rows")]
    pub actual_rows: Option<f64>,
    #[serde(rename = "Actual Loops")]
    pub actual_loops: Option<f64>,
    #[serde(rename = "Rows Removed by Filter", default)]
    pub rows_removed_by_filter: f64,
    #[serde(rename = "Rows Removed by Index Recheck", default)]
    pub rows_removed_by_index_recheck: f64,
    #[serde(rename = "Plans", default)]
    pub plans: Vec<PlanNode>,
}

impl PlanNode {
    /// First node, depth first, that reads `table`.
    pub fn access_node(&self, table: &str) -> Option<&PlanNode> {
        if self.relation_name.as_deref() == Some(table) {
            return Some(self);
        }
        self.plans.iter().find_map(|child| child.access_node(table))
    }

    fn loops(&self) -> f64 { self.actual_loops.unwrap_or(1.0) }

    /// Rows returned across all loops.
    pub fn total_actual_rows(&self) -> f64 { self.actual_rows.unwrap_or(0.0) * self.loops() }

    /// Rows the node read, counting those its filter or a bitmap recheck threw away.
    pub fn rows_examined(&self) -> f64 {
        (self.actual_rows.unwrap_or(0.0) + self.rows_removed_by_filter + self.rows_removed_by_index_recheck) * self.loops()
    }

    fn index_names(&self, into: &mut Vec<String>) {
        if let Some(name) = &self.index_name {
            into.push(name.clone());
        }
        for child in &self.plans {
            child.index_names(into);
        }
    }

    pub fn access_path(&self) -> (AccessPath, Option<String>) {
        match self.node_type.as_str() {
            "Seq Scan" => (AccessPath::FullScan, None),
            "Index Only Scan" => (AccessPath::CoveringIndexLookup, self.index_name.clone()),
            "Index Scan" => (AccessPath::NonCoveringIndexLookup, self.index_name.clone()),
            // the indexes sit on the Bitmap Index Scan children
            "Bitmap Heap Scan" => {
                let mut names = Vec::new();
                self.index_names(&mut names);
                (AccessPath::NonCoveringIndexLookup, (!names.is_empty()).then(|| names.join(",")))
            }
            other => (AccessPath::Other(other.to_owned()), self.index_name.clone()),
        }
    }
}

/// Builds the metric for `table` from the JSON document `EXPLAIN` returned.
pub fn parse_explain(document: &serde_json::Value, table: &str) -> Result<PlanMetric, PlanError> {
    let outputs: Vec<ExplainOutput> =
        serde_json::from_value(document.clone()).map_err(|err| PlanError::parse(format!("unexpected EXPLAIN document: {}", err)))?;
    let output = outputs.into_iter().next().ok_or_else(|| PlanError::parse("EXPLAIN returned no plan"))?;

    let root = &output.plan;
    let access = root.access_node(table).ok_or_else(|| PlanError::parse(format!("no plan node reads table {:?}", table)))?;
    let (access_path, index_name) = access.access_path();
    let elapsed = Duration::from_secs_f64(output.execution_time.unwrap_or(0.0).max(0.0) / 1000.0);

    Ok(PlanMetric {
        index_name,
        estimated_cost: Some(root.total_cost),
        estimated_rows: Some(root.plan_rows),
        actual_rows: root.total_actual_rows().round() as u64,
        rows_examined: Some(access.rows_examined().round() as u64),
        plan: serde_json::to_string_pretty(document).unwrap_or_default(),
        ..PlanMetric::new(access_path, elapsed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn explain(plan: serde_json::Value) -> serde_json::Value {
        json!([{ "Plan": plan, "Planning Time": 0.2, "Triggers": [], "Execution Time": 1.5 }])
    }

    #[test]
    fn test_seq_scan() {
        let document = explain(json!({
            "Node Type": "Seq Scan", "Parallel Aware": false, "Relation Name": "users", "Alias": "users",
            "Startup Cost": 0.0, "Total Cost": 2084.0, "Plan Rows": 1, "Plan Width": 14,
            "Actual Rows": 1, "Actual Loops": 1, "Rows Removed by Filter": 49999,
            "Filter": "(((name)::text = 'User_1000'::text) AND (state_id = 0))"
        }));
        let metric = parse_explain(&document, "users").unwrap();
        assert_eq!(metric.access_path, AccessPath::FullScan);
        assert_eq!(metric.index_name, None);
        assert_eq!(metric.estimated_cost, Some(2084.0));
        assert_eq!(metric.estimated_rows, Some(1.0));
        assert_eq!(metric.actual_rows, 1);
        assert_eq!(metric.rows_examined, Some(50_000));
        assert!((metric.elapsed_ms() - 1.5).abs() < 1e-6);
        assert!(metric.plan.contains("Seq Scan"));
    }

    #[test]
    fn test_parallel_seq_scan_under_gather() {
        let document = explain(json!({
            "Node Type": "Gather", "Total Cost": 1000.0, "Plan Rows": 1, "Actual Rows": 1, "Actual Loops": 1,
            "Plans": [{
                "Node Type": "Seq Scan", "Parent Relationship": "Outer", "Parallel Aware": true, "Relation Name": "users",
                "Total Cost": 900.0, "Plan Rows": 1, "Actual Rows": 0.33, "Actual Loops": 3, "Rows Removed by Filter": 33333
            }]
        }));
        let metric = parse_explain(&document, "users").unwrap();
        assert_eq!(metric.access_path, AccessPath::FullScan);
        assert_eq!(metric.estimated_cost, Some(1000.0));
        assert_eq!(metric.rows_examined, Some(100_000));
    }

    #[test]
    fn test_index_scans() {
        let document = explain(json!({
            "Node Type": "Index Scan", "Relation Name": "users", "Index Name": "idx_users_name",
            "Total Cost": 8.44, "Plan Rows": 1, "Actual Rows": 1, "Actual Loops": 1, "Rows Removed by Filter": 0
        }));
        let metric = parse_explain(&document, "users").unwrap();
        assert_eq!(metric.access_path, AccessPath::NonCoveringIndexLookup);
        assert_eq!(metric.index_name.as_deref(), Some("idx_users_name"));
        assert_eq!(metric.rows_examined, Some(1));

        let document = explain(json!({
            "Node Type": "Index Only Scan", "Relation Name": "users", "Index Name": "idx_users_name_state_id",
            "Total Cost": 4.44, "Plan Rows": 1, "Actual Rows": 1, "Actual Loops": 1, "Heap Fetches": 0
        }));
        let metric = parse_explain(&document, "users").unwrap();
        assert_eq!(metric.access_path, AccessPath::CoveringIndexLookup);
        assert_eq!(metric.index_name.as_deref(), Some("idx_users_name_state_id"));
    }

    #[test]
    fn test_bitmap_heap_scan_takes_child_index() {
        let document = explain(json!({
            "Node Type": "Bitmap Heap Scan", "Relation Name": "users", "Total Cost": 1200.5, "Plan Rows": 1,
            "Actual Rows": 1, "Actual Loops": 1, "Rows Removed by Filter": 999, "Rows Removed by Index Recheck": 0,
            "Plans": [{
                "Node Type": "Bitmap Index Scan", "Parent Relationship": "Outer", "Index Name": "idx_users_state_id",
                "Total Cost": 11.9, "Plan Rows": 1000, "Actual Rows": 1000, "Actual Loops": 1
            }]
        }));
        let metric = parse_explain(&document, "users").unwrap();
        assert_eq!(metric.access_path, AccessPath::NonCoveringIndexLookup);
        assert_eq!(metric.index_name.as_deref(), Some("idx_users_state_id"));
        assert_eq!(metric.rows_examined, Some(1000));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(parse_explain(&json!({"not": "a plan"}), "users"), Err(PlanError::Parse(_))));
        assert!(matches!(parse_explain(&json!([]), "users"), Err(PlanError::Parse(_))));

        let document = explain(json!({ "Node Type": "Result", "Total Cost": 0.01, "Plan Rows": 1 }));
        assert!(matches!(parse_explain(&document, "users"), Err(PlanError::Parse(_))));
    }
}
