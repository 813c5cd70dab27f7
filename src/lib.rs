//! Lead Router - least-loaded assignment engine for the consultancy CRM
//!
//! This crate consolidates the CRM's routing logic: given a unit of work
//! (lead, application, counselling task) and a locality scope, pick the
//! least-loaded eligible staff member and commit the assignment atomically
//! with its follow-up task and audit history.
//!
//! ## Flow
//! Trigger -> BatchCoordinator (or AssignmentEngine for one unit) ->
//! roster query -> bulk load counts -> least-loaded pick -> one
//! transaction per subject (links + task + history).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lead_router::config::RoutingConfig;
//! use lead_router::database::{DatabaseConfig, DatabaseManager};
//! use lead_router::models::UnitKind;
//! use lead_router::routing::{BatchCoordinator, LeadCountryResolver};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let db = DatabaseManager::new(DatabaseConfig::default()).await?;
//! let config = RoutingConfig::default();
//! let coordinator = BatchCoordinator::new(db.pool().clone(), config.clone());
//! let resolver = LeadCountryResolver::new(db.pool().clone());
//!
//! let outcome = coordinator
//!     .assign_batch(&[101, 102, 103], UnitKind::Lead,
//!                   &config.roles.counselling_roles(), &resolver, 1)
//!     .await?;
//! println!("assigned {} of 3", outcome.assignments.len());
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Injected role/status configuration
pub mod config;

// Domain model structs
pub mod models;

// Database integration
pub mod database;

// Assignment and routing engine
pub mod routing;

// Bounded validation worker pool
pub mod workers;

// Public re-exports for the common entry points
pub use config::{RoleRegistry, RoutingConfig, StatusRegistry};
pub use database::{DatabaseConfig, DatabaseManager};
pub use error::{Result, RoutingError, ValidationError};
pub use models::{LocalityScope, UnitKind};
pub use routing::{
    AssignOptions, AssignmentEngine, AssignmentOutcome, BatchCoordinator, BatchOutcome,
    DescriptionRefresher, SubjectEvent,
};
pub use workers::{BatchValidation, RawSubjectRow, ValidatedRow, ValidationPool};
