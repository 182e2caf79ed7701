//! Ordered before/after comparison of index configurations.

use serde_json::json;

use crate::error::BenchError;
use crate::index::IndexConfiguration;
use crate::plan::PlanMetric;

#[derive(Debug)]
pub struct BenchEntry {
    pub configuration: IndexConfiguration,
    pub outcome: Result<PlanMetric, BenchError>,
}

impl BenchEntry {
    pub fn metric(&self) -> Option<&PlanMetric> { self.outcome.as_ref().ok() }

    pub fn error(&self) -> Option<&BenchError> { self.outcome.as_ref().err() }
}

/// One entry per configuration, in the order the configurations were given.
#[derive(Debug)]
pub struct BenchmarkReport {
    pub query: String,
    entries: Vec<BenchEntry>,
}

impl BenchmarkReport {
    pub fn new(query: impl Into<String>) -> Self { Self { query: query.into(), entries: Vec::new() } }

    pub fn push(&mut self, configuration: IndexConfiguration, outcome: Result<PlanMetric, BenchError>) {
        self.entries.push(BenchEntry { configuration, outcome });
    }

    pub fn entries(&self) -> &[BenchEntry] { &self.entries }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, configuration: &str) -> Option<&BenchEntry> { self.entries.iter().find(|e| e.configuration.name == configuration) }

    pub fn failures(&self) -> impl Iterator<Item = &BenchEntry> { self.entries.iter().filter(|e| e.outcome.is_err()) }

    /// The measured entry with the lowest estimated cost, or the lowest elapsed time when the
    /// engine reports no costs. Does not reorder the report.
    pub fn best(&self) -> Option<&BenchEntry> {
        let measured = self.entries.iter().filter_map(|e| e.metric().map(|m| (e, m)));
        let key = |m: &PlanMetric| m.estimated_cost.unwrap_or(f64::INFINITY);
        if self.entries.iter().filter_map(BenchEntry::metric).all(|m| m.estimated_cost.is_none()) {
            measured.min_by(|(_, a), (_, b)| a.elapsed.cmp(&b.elapsed)).map(|(e, _)| e)
        } else {
            measured.min_by(|(_, a), (_, b)| key(*a).total_cmp(&key(*b))).map(|(e, _)| e)
        }
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Query: {}\n", self.query));
        out.push_str(&format!(
            "{:<20} {:<28} {:>12} {:>12} {:>12} {:>14} {:>12}\n",
            "Configuration", "Access path", "Est. cost", "Est. rows", "Rows", "Examined", "Time (ms)"
        ));
        out.push_str(&"-".repeat(116));
        out.push('\n');
        for entry in &self.entries {
            match &entry.outcome {
                Ok(metric) => out.push_str(&format!(
                    "{:<20} {:<28} {:>12} {:>12} {:>12} {:>14} {:>12.3}\n",
                    entry.configuration.name,
                    metric.access_path.label(),
                    optional(metric.estimated_cost.map(|c| format!("{:.2}", c))),
                    optional(metric.estimated_rows.map(|r| format!("{:.0}", r))),
                    metric.actual_rows,
                    optional(metric.rows_examined.map(|r| r.to_string())),
                    metric.elapsed_ms(),
                )),
                Err(err) => out.push_str(&format!("{:<20} error ({}): {}\n", entry.configuration.name, err.kind(), err)),
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        let entries: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|entry| match &entry.outcome {
                Ok(metric) => json!({
                    "configuration": entry.configuration,
                    "access_path": metric.access_path.label(),
                    "index_name": metric.index_name,
                    "estimated_cost": metric.estimated_cost,
                    "estimated_rows": metric.estimated_rows,
                    "actual_rows": metric.actual_rows,
                    "rows_examined": metric.rows_examined,
                    "elapsed_ms": metric.elapsed_ms(),
                }),
                Err(err) => json!({
                    "configuration": entry.configuration,
                    "error": { "kind": err.kind(), "message": err.to_string() },
                }),
            })
            .collect();
        json!({ "query": self.query, "entries": entries })
    }

    pub fn print_summary(&self) {
        println!("\n=== Index Benchmark ===");
        print!("{}", self.render_table());
        if let Some(best) = self.best() {
            println!("Best: {}", best.configuration.name);
        }
        println!();
    }
}

fn optional(value: Option<String>) -> String { value.unwrap_or_else(|| "-".to_owned()) }
