//! Validated batch requests and the offset ranges they cover.

use std::ops::Range;

use serde::Serialize;

use crate::error::ValidationError;

pub const MAX_BATCH_SIZE: u64 = 10_000;

/// A validated `(total_rows, batch_size)` pair, optionally resuming from a non-zero offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchRequest {
    total_rows: u64,
    batch_size: u64,
    start_offset: u64,
}

impl BatchRequest {
    /// Accepts signed input so that negative counts surface as validation errors instead of wrapping.
    pub fn new(total_rows: i64, batch_size: i64) -> Result<Self, ValidationError> {
        if total_rows <= 0 {
            return Err(ValidationError::TotalRows(total_rows));
        }
        if batch_size < 1 || batch_size as u64 > MAX_BATCH_SIZE {
            return Err(ValidationError::BatchSize(batch_size));
        }
        Ok(Self { total_rows: total_rows as u64, batch_size: batch_size as u64, start_offset: 0 })
    }

    /// Shifts the covered offsets to `[start_offset, start_offset + total_rows)`.
    pub fn starting_at(self, start_offset: u64) -> Result<Self, ValidationError> {
        if start_offset.checked_add(self.total_rows).is_none() {
            return Err(ValidationError::OffsetOverflow { start: start_offset, total: self.total_rows });
        }
        Ok(Self { start_offset, ..self })
    }

    pub fn total_rows(&self) -> u64 { self.total_rows }

    pub fn batch_size(&self) -> u64 { self.batch_size }

    pub fn start_offset(&self) -> u64 { self.start_offset }

    pub fn offsets(&self) -> Range<u64> { self.start_offset..self.start_offset + self.total_rows }

    pub fn batches(&self) -> BatchPlan {
        let offsets = self.offsets();
        BatchPlan { next: offsets.start, end: offsets.end, batch_size: self.batch_size }
    }
}

/// Consecutive half-open ranges of at most `batch_size` offsets, in increasing order.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    next: u64,
    end: u64,
    batch_size: u64,
}

impl Iterator for BatchPlan {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Range<u64>> {
        if self.next >= self.end {
            return None;
        }
        let take = self.batch_size.min(self.end - self.next);
        let range = self.next..self.next + take;
        self.next += take;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next).div_ceil(self.batch_size) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchPlan {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_requests() {
        assert_eq!(BatchRequest::new(0, 100), Err(ValidationError::TotalRows(0)));
        assert_eq!(BatchRequest::new(-5, 100), Err(ValidationError::TotalRows(-5)));
        assert_eq!(BatchRequest::new(10, 0), Err(ValidationError::BatchSize(0)));
        assert_eq!(BatchRequest::new(10, 10_001), Err(ValidationError::BatchSize(10_001)));
        assert_eq!(BatchRequest::new(10, -1), Err(ValidationError::BatchSize(-1)));
    }

    #[test]
    fn test_accepts_batch_size_bounds() {
        assert!(BatchRequest::new(10, 1).is_ok());
        assert!(BatchRequest::new(10, 10_000).is_ok());
    }

    #[test]
    fn test_batches_are_half_open_and_contiguous() {
        let request = BatchRequest::new(25, 10).unwrap();
        let batches: Vec<Range<u64>> = request.batches().collect();
        assert_eq!(batches, vec![0..10, 10..20, 20..25]);
        assert_eq!(request.batches().len(), 3);
    }

    #[test]
    fn test_batches_cover_total_exactly() {
        for (total, size) in [(1, 1), (1, 10_000), (9_999, 10_000), (10_000, 10_000), (10_001, 10_000), (12_345, 7)] {
            let request = BatchRequest::new(total, size).unwrap();
            let covered: u64 = request.batches().map(|r| r.end - r.start).sum();
            assert_eq!(covered, total as u64, "total={total} size={size}");
            assert!(request.batches().all(|r| r.end - r.start <= size as u64));
        }
    }

    #[test]
    fn test_resume_from_offset() {
        let request = BatchRequest::new(5, 2).unwrap().starting_at(100).unwrap();
        assert_eq!(request.batches().collect::<Vec<_>>(), vec![100..102, 102..104, 104..105]);
        assert_eq!(request.offsets(), 100..105);

        let overflow = BatchRequest::new(10, 2).unwrap().starting_at(u64::MAX - 3);
        assert!(matches!(overflow, Err(ValidationError::OffsetOverflow { .. })));
    }
}
