//! Batched, committed population of the target table.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::batch::BatchRequest;
use crate::error::GenerateError;
use crate::record::SyntheticRecord;
use crate::storage::BulkSink;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateSummary {
    pub inserted: u64,
    pub batches: usize,
    pub elapsed: Duration,
}

impl GenerateSummary {
    pub fn rows_per_sec(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.inserted as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Fills a [`BulkSink`] with [`SyntheticRecord`]s, one committed batch at a time.
///
/// Batches run strictly in increasing offset order, so after a failure the rows already
/// committed are exactly the offsets before the failing batch. The generator never
/// deletes; clearing the table before a re-run is up to the caller.
pub struct Generator<'a, S: BulkSink + ?Sized> {
    sink: &'a S,
}

impl<'a, S: BulkSink + ?Sized> Generator<'a, S> {
    pub fn new(sink: &'a S) -> Self { Self { sink } }

    /// Inserts `total_rows` records starting at offset 0 and returns the count inserted.
    pub async fn generate(&self, total_rows: i64, batch_size: i64) -> Result<u64, GenerateError> {
        let request = BatchRequest::new(total_rows, batch_size)?;
        Ok(self.run(&request).await?.inserted)
    }

    pub async fn run(&self, request: &BatchRequest) -> Result<GenerateSummary, GenerateError> {
        let started = Instant::now();
        let mut inserted = 0u64;
        let mut batches = 0usize;

        for offsets in request.batches() {
            let offset = offsets.start;
            let records = SyntheticRecord::batch(offsets);
            let expected = records.len() as u64;

            let written = match self.sink.insert_batch(&records).await {
                Ok(written) => written,
                Err(source) => {
                    error!("Batch at offset {} failed after {} committed rows: {}", offset, inserted, source);
                    return Err(GenerateError::Insertion { committed: inserted, offset, source });
                }
            };
            if written != expected {
                return Err(GenerateError::ShortBatch { committed: inserted, offset, expected, written });
            }

            inserted += written;
            batches += 1;
            debug!("Committed batch {} at offset {} ({} rows, {} total)", batches, offset, written, inserted);
        }

        let summary = GenerateSummary { inserted, batches, elapsed: started.elapsed() };
        info!(
            "Generated {} rows in {} batches over {:.3}s ({:.0} rows/sec)",
            summary.inserted,
            summary.batches,
            summary.elapsed.as_secs_f64(),
            summary.rows_per_sec()
        );
        Ok(summary)
    }
}
