//! Staff roster queries: who is eligible to receive a unit of work
//!
//! Read-only. Eligibility is role membership plus an optional locality
//! filter: country membership is a many-to-many check against the
//! staff-country join table, branch and franchise are plain equality on the
//! staff row.

use sqlx::{PgPool, Row};

use crate::error::Result;
use crate::models::{LocalityScope, StaffMember};

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active staff members holding one of the given roles within the given
    /// locality scope.
    ///
    /// An empty result means "no eligible assignee" and is a normal
    /// outcome, not an error.
    pub async fn eligible_staff(
        &self,
        role_ids: &[i64],
        scope: &LocalityScope,
    ) -> Result<Vec<StaffMember>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.role_id, s.branch_id, s.franchise_id, s.region_id,
                   s.active,
                   COALESCE(
                       array_agg(sc.country_id) FILTER (WHERE sc.country_id IS NOT NULL),
                       '{}'
                   ) AS country_ids
            FROM staff s
            LEFT JOIN staff_countries sc ON sc.staff_id = s.id
            WHERE s.active
              AND s.role_id = ANY($1)
              AND ($2::bigint IS NULL OR EXISTS (
                    SELECT 1 FROM staff_countries m
                    WHERE m.staff_id = s.id AND m.country_id = $2))
              AND ($3::bigint IS NULL OR s.branch_id = $3)
              AND ($4::bigint IS NULL OR s.franchise_id = $4)
            GROUP BY s.id
            ORDER BY s.id
            "#,
        )
        .bind(role_ids)
        .bind(scope.country_id)
        .bind(scope.branch_id)
        .bind(scope.franchise_id)
        .fetch_all(&self.pool)
        .await?;

        let mut staff = Vec::with_capacity(rows.len());
        for row in rows {
            staff.push(StaffMember {
                id: row.get("id"),
                name: row.get("name"),
                role_id: row.get("role_id"),
                branch_id: row.get("branch_id"),
                franchise_id: row.get("franchise_id"),
                region_id: row.get("region_id"),
                country_ids: row.get("country_ids"),
                active: row.get("active"),
            });
        }
        Ok(staff)
    }

    /// Fetch a single staff member by id, with country memberships.
    pub async fn get_staff(&self, staff_id: i64) -> Result<Option<StaffMember>> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.name, s.role_id, s.branch_id, s.franchise_id, s.region_id,
                   s.active,
                   COALESCE(
                       array_agg(sc.country_id) FILTER (WHERE sc.country_id IS NOT NULL),
                       '{}'
                   ) AS country_ids
            FROM staff s
            LEFT JOIN staff_countries sc ON sc.staff_id = s.id
            WHERE s.id = $1
            GROUP BY s.id
            "#,
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StaffMember {
            id: row.get("id"),
            name: row.get("name"),
            role_id: row.get("role_id"),
            branch_id: row.get("branch_id"),
            franchise_id: row.get("franchise_id"),
            region_id: row.get("region_id"),
            country_ids: row.get("country_ids"),
            active: row.get("active"),
        }))
    }

    /// Resolve country codes for title building ("John Doe - IN,UK").
    pub async fn country_codes(&self, country_ids: &[i64]) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"SELECT code FROM countries WHERE id = ANY($1) ORDER BY id"#,
        )
        .bind(country_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.get("code")).collect())
    }

    /// Resolve a country's display name for history text.
    pub async fn country_name(&self, country_id: i64) -> Result<Option<String>> {
        let row = sqlx::query(r#"SELECT name FROM countries WHERE id = $1"#)
            .bind(country_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("name")))
    }
}
