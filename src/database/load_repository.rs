//! Bulk load counting for candidate staff
//!
//! One GROUP BY query per candidate pool; selection runs for every batch
//! item, so per-staff count queries are off the table. Staff with no
//! assignments are zero-filled on the way out.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::config::StatusRegistry;
use crate::error::Result;
use crate::models::UnitKind;

#[derive(Clone)]
pub struct LoadRepository {
    pool: PgPool,
}

impl LoadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Committed load counts for the given staff and unit kind.
    ///
    /// Every requested staff id is present in the result, zero when they
    /// hold nothing.
    pub async fn active_counts(
        &self,
        unit_kind: UnitKind,
        staff_ids: &[i64],
        statuses: &StatusRegistry,
    ) -> Result<HashMap<i64, i64>> {
        let counted = match unit_kind {
            UnitKind::Lead => self.lead_link_counts(staff_ids, statuses.spam).await?,
            UnitKind::Application => self.application_counts(staff_ids).await?,
            UnitKind::Counselling => self.open_task_counts(staff_ids).await?,
        };

        let mut counts = HashMap::with_capacity(staff_ids.len());
        for &id in staff_ids {
            counts.insert(id, counted.get(&id).copied().unwrap_or(0));
        }
        Ok(counts)
    }

    /// Assignment links held per staff member, excluding spam-status links.
    async fn lead_link_counts(
        &self,
        staff_ids: &[i64],
        spam_status_id: i64,
    ) -> Result<HashMap<i64, i64>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT staff_id, COUNT(*) AS assigned
            FROM assignment_links
            WHERE staff_id = ANY($1)
              AND status_id <> $2
            GROUP BY staff_id
            "#,
        )
        .bind(staff_ids)
        .bind(spam_status_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Applications currently assigned per staff member.
    async fn application_counts(&self, staff_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT assigned_user, COUNT(*) AS assigned
            FROM applications
            WHERE assigned_user = ANY($1)
            GROUP BY assigned_user
            "#,
        )
        .bind(staff_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Open, non-completed tasks per owner, for counselling-style work.
    async fn open_task_counts(&self, staff_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT owner_id, COUNT(*) AS assigned
            FROM tasks
            WHERE owner_id = ANY($1)
              AND NOT completed
            GROUP BY owner_id
            "#,
        )
        .bind(staff_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
