//! Subject reads: lead profiles, study preferences and applications
//!
//! The engine never mutates these records; it reads them to resolve
//! locality scopes and to synthesize task descriptions.

use sqlx::{PgPool, Row};

use crate::error::Result;
use crate::models::{Application, Gender, Lead, StudyPreference};
use crate::routing::description::SubjectProfile;

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a lead with its preferred-country set.
    pub async fn get_lead(&self, lead_id: i64) -> Result<Option<Lead>> {
        let row = sqlx::query(
            r#"
            SELECT l.id, l.name, l.gender, l.birth_year, l.marital_status, l.city,
                   l.stage_id, l.branch_id, l.franchise_id, l.region_id,
                   COALESCE(
                       array_agg(lc.country_id) FILTER (WHERE lc.country_id IS NOT NULL),
                       '{}'
                   ) AS preferred_country_ids
            FROM leads l
            LEFT JOIN lead_countries lc ON lc.lead_id = l.id
            WHERE l.id = $1
            GROUP BY l.id
            "#,
        )
        .bind(lead_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Lead {
            id: row.get("id"),
            name: row.get("name"),
            gender: row
                .get::<Option<String>, _>("gender")
                .as_deref()
                .and_then(Gender::parse),
            birth_year: row.get("birth_year"),
            marital_status: row.get("marital_status"),
            city: row.get("city"),
            stage_id: row.get("stage_id"),
            branch_id: row.get("branch_id"),
            franchise_id: row.get("franchise_id"),
            region_id: row.get("region_id"),
            preferred_country_ids: row.get("preferred_country_ids"),
        }))
    }

    /// First study preference on record for a lead, if any.
    pub async fn first_study_preference(&self, lead_id: i64) -> Result<Option<StudyPreference>> {
        let row = sqlx::query(
            r#"
            SELECT course_name, university_name, intake_year
            FROM study_preferences
            WHERE lead_id = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(lead_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StudyPreference {
            course_name: row.get("course_name"),
            university_name: row.get("university_name"),
            intake_year: row.get("intake_year"),
        }))
    }

    pub async fn get_application(&self, application_id: i64) -> Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, lead_id, assigned_user, university_name, campus_name, course_name
            FROM applications
            WHERE id = $1
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(app)
    }

    /// Assemble the description-builder input for a lead subject.
    pub async fn profile_for_lead(&self, lead_id: i64) -> Result<Option<SubjectProfile>> {
        let Some(lead) = self.get_lead(lead_id).await? else {
            return Ok(None);
        };
        let study = self.first_study_preference(lead_id).await?;

        Ok(Some(SubjectProfile {
            name: lead.name,
            gender: lead.gender,
            birth_year: lead.birth_year,
            marital_status: lead.marital_status,
            city: lead.city,
            study,
        }))
    }

    /// Assemble the description-builder input for an application subject.
    ///
    /// Demographics come from the underlying lead; the study segment comes
    /// from the application's own university/course context.
    pub async fn profile_for_application(
        &self,
        application_id: i64,
    ) -> Result<Option<SubjectProfile>> {
        let Some(app) = self.get_application(application_id).await? else {
            return Ok(None);
        };
        let Some(lead) = self.get_lead(app.lead_id).await? else {
            return Ok(None);
        };

        let study = if app.course_name.is_some() || app.university_name.is_some() {
            Some(StudyPreference {
                course_name: app.course_name,
                university_name: app.university_name,
                intake_year: None,
            })
        } else {
            self.first_study_preference(lead.id).await?
        };

        Ok(Some(SubjectProfile {
            name: lead.name,
            gender: lead.gender,
            birth_year: lead.birth_year,
            marital_status: lead.marital_status,
            city: lead.city,
            study,
        }))
    }
}
