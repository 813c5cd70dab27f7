//! Task reads and description maintenance
//!
//! Task descriptions are denormalized copies of subject profile data. The
//! refresh hook in `routing::refresh` uses this repository to bring the
//! open tasks of a subject back in line after a profile edit.

use sqlx::{PgPool, Row};

use crate::error::Result;
use crate::models::TaskItem;

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open (non-completed) tasks referencing a subject.
    pub async fn open_tasks_for_subject(&self, subject_id: i64) -> Result<Vec<TaskItem>> {
        let tasks = sqlx::query_as::<_, TaskItem>(
            r#"
            SELECT id, owner_id, subject_id, subject_kind, title, description, due_date,
                   completed, created_at
            FROM tasks
            WHERE subject_id = $1
              AND NOT completed
            ORDER BY id
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Rewrite the stored description of one task.
    pub async fn update_description(&self, task_id: i64, description: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE tasks SET description = $2 WHERE id = $1 AND NOT completed"#,
        )
        .bind(task_id)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Mark a task complete. Returns false when the task does not exist.
    pub async fn complete_task(&self, task_id: i64) -> Result<bool> {
        let result = sqlx::query(r#"UPDATE tasks SET completed = TRUE WHERE id = $1"#)
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of open tasks a staff member currently owns.
    pub async fn open_task_count(&self, owner_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"SELECT COUNT(*) AS open FROM tasks WHERE owner_id = $1 AND NOT completed"#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("open"))
    }
}
