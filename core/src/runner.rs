//! Sequential measurement of index configurations.

use tracing::{debug, info, warn};

use crate::error::{BenchError, IndexMutationError, PlanError};
use crate::index::{IndexConfiguration, IndexSpec};
use crate::plan::PlanMetric;
use crate::query::QueryTemplate;
use crate::report::BenchmarkReport;
use crate::storage::PlanTarget;

/// Applies each configuration in turn and measures the query under it.
///
/// Exactly one configuration's indexes are present at measurement time. A configuration
/// that fails is reported as an error entry and the run moves on to the next one. The
/// engine's plan choice is recorded, never forced.
pub struct BenchmarkRunner<'a, T: PlanTarget + ?Sized> {
    target: &'a T,
}

impl<'a, T: PlanTarget + ?Sized> BenchmarkRunner<'a, T> {
    pub fn new(target: &'a T) -> Self { Self { target } }

    pub async fn run(&self, query: &QueryTemplate, configurations: &[IndexConfiguration]) -> BenchmarkReport {
        let mut report = BenchmarkReport::new(query.to_sql());
        let query_check = query.validate();
        let mut active: Vec<IndexSpec> = Vec::new();

        for configuration in configurations {
            let outcome = match &query_check {
                Ok(()) => self.measure(query, configuration, &mut active).await,
                Err(err) => Err(err.clone().into()),
            };
            match &outcome {
                Ok(metric) => info!(
                    "Configuration {}: {} (cost {:?}, rows examined {:?}, {:.3} ms)",
                    configuration.name,
                    metric.access_path,
                    metric.estimated_cost,
                    metric.rows_examined,
                    metric.elapsed_ms()
                ),
                Err(err) => warn!("Configuration {} skipped: {}", configuration.name, err),
            }
            report.push(configuration.clone(), outcome);
        }

        if let Err(err) = self.drop_active(&mut active).await {
            warn!("Leaving table with a stale index: {}", err);
        }
        report
    }

    async fn measure(
        &self,
        query: &QueryTemplate,
        configuration: &IndexConfiguration,
        active: &mut Vec<IndexSpec>,
    ) -> Result<PlanMetric, BenchError> {
        self.drop_active(active).await?;
        configuration.validate(self.target.table())?;

        for index in &configuration.indexes {
            debug!("Configuration {}: creating index {} on {:?}", configuration.name, index.name, index.columns);
            if let Err(source) = self.target.create_index(index).await {
                // Leave no partial configuration behind for the next one.
                if let Err(err) = self.drop_active(active).await {
                    warn!("Could not roll back configuration {}: {}", configuration.name, err);
                }
                return Err(IndexMutationError::create(index, source).into());
            }
            active.push(index.clone());
        }

        self.target.refresh_statistics().await.map_err(PlanError::Execution)?;
        Ok(self.target.explain(query).await?)
    }

    /// Drops the active indexes newest first. An index that fails to drop is forgotten so a
    /// single stuck index does not block every later configuration.
    async fn drop_active(&self, active: &mut Vec<IndexSpec>) -> Result<(), IndexMutationError> {
        while let Some(index) = active.pop() {
            debug!("Dropping index {}", index.name);
            self.target.drop_index(&index).await.map_err(|source| IndexMutationError::drop(&index, source))?;
        }
        Ok(())
    }
}
