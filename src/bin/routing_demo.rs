//! Wiring demo: validate a raw batch, then auto-assign it.
//!
//! Usage: routing_demo <subject_id>... (DATABASE_URL must point at a
//! database carrying the assignment schema).

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lead_router::config::RoutingConfig;
use lead_router::database::{DatabaseConfig, DatabaseManager};
use lead_router::models::UnitKind;
use lead_router::routing::{BatchCoordinator, LeadCountryResolver};
use lead_router::workers::{RawSubjectRow, ValidationPool};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let raw_ids: Vec<String> = std::env::args().skip(1).collect();
    if raw_ids.is_empty() {
        bail!("usage: routing_demo <subject_id>...");
    }

    let db = DatabaseManager::new(DatabaseConfig::default())
        .await
        .context("database connection failed")?;
    db.run_migrations().await.context("schema check failed")?;

    let pool = ValidationPool::with_default_size();
    let rows = raw_ids
        .iter()
        .enumerate()
        .map(|(row, id)| RawSubjectRow {
            row,
            subject_id: id.clone(),
            country_id: None,
        })
        .collect();
    let validation = pool.validate_batch(rows).await?;
    for rejected in &validation.rejected {
        eprintln!("rejected: {rejected}");
    }

    let config = RoutingConfig::default();
    let coordinator = BatchCoordinator::new(db.pool().clone(), config.clone());
    let resolver = LeadCountryResolver::new(db.pool().clone());

    let outcome = coordinator
        .assign_batch(
            &validation.subject_ids(),
            UnitKind::Lead,
            &config.roles.counselling_roles(),
            &resolver,
            0, // system actor
        )
        .await?;

    for (subject_id, staff_id) in &outcome.assignments {
        info!(subject_id, staff_id, "assigned");
    }
    for subject_id in &outcome.unresolved {
        info!(subject_id, "no eligible candidate");
    }
    for (subject_id, message) in &outcome.failed {
        info!(subject_id, message = %message, "failed");
    }

    db.close().await;
    Ok(())
}
