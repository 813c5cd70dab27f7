//! Transaction-scoped writes for the assignment flow
//!
//! Every method here takes an open `Transaction` so the engine can compose
//! link replacement, task creation and history append into one atomic unit.
//! Nothing in this module begins or commits a transaction itself.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::Result;
use crate::models::{AssignmentLink, HistoryEntry, TaskItem, UnitKind};

#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Delete the subject's current links, optionally limited to one
    /// country scope. Returns the number of links removed.
    pub async fn delete_links(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        subject_id: i64,
        country_id: Option<i64>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM assignment_links
            WHERE subject_id = $1
              AND ($2::bigint IS NULL OR country_id = $2)
            "#,
        )
        .bind(subject_id)
        .bind(country_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Create one assignment link for a staff member within a scope.
    pub async fn create_link(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        staff_id: i64,
        subject_id: i64,
        country_id: Option<i64>,
        status_id: i64,
        followup_date: NaiveDate,
    ) -> Result<AssignmentLink> {
        let link = sqlx::query_as::<_, AssignmentLink>(
            r#"
            INSERT INTO assignment_links (staff_id, subject_id, country_id, status_id, followup_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, staff_id, subject_id, country_id, status_id, followup_date, created_at
            "#,
        )
        .bind(staff_id)
        .bind(subject_id)
        .bind(country_id)
        .bind(status_id)
        .bind(followup_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(link)
    }

    /// Create the follow-up task owned by the newly assigned staff member.
    pub async fn create_task(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner_id: i64,
        subject_id: i64,
        subject_kind: UnitKind,
        title: &str,
        description: &str,
        due_date: NaiveDate,
    ) -> Result<TaskItem> {
        let task = sqlx::query_as::<_, TaskItem>(
            r#"
            INSERT INTO tasks (owner_id, subject_id, subject_kind, title, description, due_date, completed)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING id, owner_id, subject_id, subject_kind, title, description, due_date,
                      completed, created_at
            "#,
        )
        .bind(owner_id)
        .bind(subject_id)
        .bind(subject_kind.to_string())
        .bind(title)
        .bind(description)
        .bind(due_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(task)
    }

    /// Point an application at its new owner. Returns the number of rows
    /// touched (zero when the application does not exist).
    pub async fn set_application_owner(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        application_id: i64,
        staff_id: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE applications SET assigned_user = $2 WHERE id = $1"#,
        )
        .bind(application_id)
        .bind(staff_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Append one immutable audit entry for the subject.
    pub async fn append_history(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        subject_id: i64,
        action: &str,
        actor_id: i64,
        country_id: Option<i64>,
    ) -> Result<HistoryEntry> {
        let entry = sqlx::query_as::<_, HistoryEntry>(
            r#"
            INSERT INTO history_entries (subject_id, action, actor_id, country_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, subject_id, action, actor_id, country_id, created_at
            "#,
        )
        .bind(subject_id)
        .bind(action)
        .bind(actor_id)
        .bind(country_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(entry)
    }
}
