//! Bounded worker pool for CPU-heavy batch validation
//!
//! Bulk imports arrive as raw text rows. Parsing and validating them is the
//! one place the engine uses real parallelism; work is fanned out over a
//! fixed number of permits so the request-handling runtime is never
//! starved. Malformed rows are rejected here, before any database
//! interaction. Workers never share a database transaction.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{Result, RoutingError, ValidationError};

/// Upper bound guarding against runaway imports.
pub const MAX_BATCH_SIZE: usize = 10_000;

/// One raw row from a bulk import, untrusted.
#[derive(Debug, Clone)]
pub struct RawSubjectRow {
    pub row: usize,
    pub subject_id: String,
    pub country_id: Option<String>,
}

/// A row that passed validation and is safe to hand to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRow {
    pub row: usize,
    pub subject_id: i64,
    pub country_id: Option<i64>,
}

/// Per-row validation results for a whole batch, in row order.
#[derive(Debug, Default)]
pub struct BatchValidation {
    pub valid: Vec<ValidatedRow>,
    pub rejected: Vec<ValidationError>,
}

impl BatchValidation {
    pub fn subject_ids(&self) -> Vec<i64> {
        self.valid.iter().map(|r| r.subject_id).collect()
    }
}

/// Fixed-size pool for batch-row validation.
pub struct ValidationPool {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl ValidationPool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Pool sized to the available CPU cores.
    pub fn with_default_size() -> Self {
        Self::new(num_cpus::get())
    }

    pub fn size(&self) -> usize {
        self.workers
    }

    /// Validate a batch, fanning chunks out across the pool.
    ///
    /// Structural problems (empty batch, oversized batch) fail the whole
    /// call; individual bad rows land in `rejected` while the rest of the
    /// batch proceeds.
    pub async fn validate_batch(&self, rows: Vec<RawSubjectRow>) -> Result<BatchValidation> {
        if rows.is_empty() {
            return Err(RoutingError::Validation(ValidationError::EmptyBatch));
        }
        if rows.len() > MAX_BATCH_SIZE {
            return Err(RoutingError::Validation(ValidationError::BatchTooLarge {
                size: rows.len(),
                max: MAX_BATCH_SIZE,
            }));
        }

        let chunk_size = rows.len().div_ceil(self.workers);
        let mut handles = Vec::new();

        for chunk in rows.chunks(chunk_size) {
            let chunk: Vec<RawSubjectRow> = chunk.to_vec();
            let permits = Arc::clone(&self.permits);
            handles.push(tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| format!("validation pool closed: {e}"))?;
                Ok::<_, String>(chunk.iter().map(validate_row).collect::<Vec<_>>())
            }));
        }

        let mut outcome = BatchValidation::default();
        for handle in handles {
            let results = handle
                .await
                .map_err(|e| worker_failure(format!("validation worker panicked: {e}")))?
                .map_err(worker_failure)?;
            for result in results {
                match result {
                    Ok(valid) => outcome.valid.push(valid),
                    Err(rejected) => outcome.rejected.push(rejected),
                }
            }
        }

        outcome.valid.sort_by_key(|r| r.row);
        debug!(
            valid = outcome.valid.len(),
            rejected = outcome.rejected.len(),
            "batch validation finished"
        );
        Ok(outcome)
    }
}

fn worker_failure(reason: String) -> RoutingError {
    RoutingError::Validation(ValidationError::InvalidField {
        row: 0,
        field: "batch",
        value: String::new(),
        reason,
    })
}

fn validate_row(row: &RawSubjectRow) -> std::result::Result<ValidatedRow, ValidationError> {
    let subject_id = parse_id(row.row, "subject_id", &row.subject_id)?;

    let country_id = match &row.country_id {
        Some(raw) if !raw.trim().is_empty() => Some(parse_id(row.row, "country_id", raw)?),
        _ => None,
    };

    Ok(ValidatedRow {
        row: row.row,
        subject_id,
        country_id,
    })
}

fn parse_id(
    row: usize,
    field: &'static str,
    raw: &str,
) -> std::result::Result<i64, ValidationError> {
    let parsed: i64 = raw.trim().parse().map_err(|_| ValidationError::InvalidField {
        row,
        field,
        value: raw.to_string(),
        reason: "expected a numeric id".to_string(),
    })?;

    if parsed <= 0 {
        return Err(ValidationError::InvalidField {
            row,
            field,
            value: raw.to_string(),
            reason: "id must be positive".to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(row: usize, id: &str) -> RawSubjectRow {
        RawSubjectRow {
            row,
            subject_id: id.to_string(),
            country_id: None,
        }
    }

    #[test]
    fn default_pool_has_at_least_one_worker() {
        assert!(ValidationPool::with_default_size().size() >= 1);
        assert_eq!(ValidationPool::new(0).size(), 1);
    }

    #[tokio::test]
    async fn valid_rows_parse_in_order() {
        let pool = ValidationPool::new(2);
        let rows = vec![raw(0, "10"), raw(1, " 11 "), raw(2, "12")];
        let outcome = pool.validate_batch(rows).await.unwrap();
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.subject_ids(), vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn bad_rows_are_rejected_without_sinking_the_batch() {
        let pool = ValidationPool::new(4);
        let mut rows = vec![raw(0, "7"), raw(1, "abc"), raw(2, "-4")];
        rows.push(RawSubjectRow {
            row: 3,
            subject_id: "8".to_string(),
            country_id: Some("xx".to_string()),
        });

        let outcome = pool.validate_batch(rows).await.unwrap();
        assert_eq!(outcome.subject_ids(), vec![7]);
        assert_eq!(outcome.rejected.len(), 3);
    }

    #[tokio::test]
    async fn empty_batch_is_a_structural_error() {
        let pool = ValidationPool::new(1);
        let err = pool.validate_batch(Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::RoutingError::Validation(ValidationError::EmptyBatch)
        ));
    }

    #[tokio::test]
    async fn optional_country_id_is_parsed() {
        let pool = ValidationPool::new(1);
        let rows = vec![RawSubjectRow {
            row: 0,
            subject_id: "5".to_string(),
            country_id: Some("44".to_string()),
        }];
        let outcome = pool.validate_batch(rows).await.unwrap();
        assert_eq!(outcome.valid[0].country_id, Some(44));
    }
}
