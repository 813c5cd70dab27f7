//! Error handling for the assignment and routing engine
//!
//! This module provides idiomatic Rust error types using thiserror for
//! better error messages and proper error chain handling.

use thiserror::Error;

use crate::models::{LocalityScope, UnitKind};

/// Main error type for the routing engine
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("no eligible candidate for {unit_kind} in scope {scope}")]
    NoEligibleCandidate {
        unit_kind: UnitKind,
        scope: LocalityScope,
    },

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Input validation errors, raised before any database interaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("row {row}: field '{field}' has invalid value '{value}': {reason}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("batch is empty")]
    EmptyBatch,

    #[error("batch size {size} exceeds maximum allowed size {max}")]
    BatchTooLarge { size: usize, max: usize },
}

impl RoutingError {
    /// Soft failures leave the unit of work unassigned instead of failing
    /// the surrounding batch.
    pub fn is_soft(&self) -> bool {
        matches!(self, RoutingError::NoEligibleCandidate { .. })
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        RoutingError::NotFound { entity, id }
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = RoutingError::not_found("lead", 42);
        assert_eq!(err.to_string(), "lead 42 not found");
    }

    #[test]
    fn no_eligible_candidate_is_soft() {
        let err = RoutingError::NoEligibleCandidate {
            unit_kind: UnitKind::Lead,
            scope: LocalityScope::for_country(7),
        };
        assert!(err.is_soft());
        assert!(!RoutingError::not_found("staff", 1).is_soft());
    }

    #[test]
    fn validation_error_reports_row_and_field() {
        let err = ValidationError::InvalidField {
            row: 3,
            field: "lead_id",
            value: "abc".to_string(),
            reason: "expected a numeric id".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("lead_id"));
        assert!(msg.contains("abc"));
    }
}
