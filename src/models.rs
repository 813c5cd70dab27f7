//! Domain model structs shared across the routing engine
//!
//! Staff and subject records are owned by the surrounding CRM's admin CRUD;
//! the engine reads them and writes only assignment links, tasks and history
//! entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of unit of work the engine routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Lead,
    Application,
    Counselling,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Lead => write!(f, "lead"),
            UnitKind::Application => write!(f, "application"),
            UnitKind::Counselling => write!(f, "counselling"),
        }
    }
}

/// Locality dimension restricting which staff are eligible for a subject.
///
/// All-`None` means unscoped: every active staff member with a matching
/// role is a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalityScope {
    pub country_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub franchise_id: Option<i64>,
}

impl LocalityScope {
    pub fn for_country(country_id: i64) -> Self {
        Self {
            country_id: Some(country_id),
            ..Default::default()
        }
    }

    pub fn for_branch(branch_id: i64) -> Self {
        Self {
            branch_id: Some(branch_id),
            ..Default::default()
        }
    }

    pub fn for_franchise(franchise_id: i64) -> Self {
        Self {
            franchise_id: Some(franchise_id),
            ..Default::default()
        }
    }

    pub fn is_unscoped(&self) -> bool {
        self.country_id.is_none() && self.branch_id.is_none() && self.franchise_id.is_none()
    }
}

impl fmt::Display for LocalityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unscoped() {
            return write!(f, "any");
        }
        let mut first = true;
        let parts = [
            ("country", self.country_id),
            ("branch", self.branch_id),
            ("franchise", self.franchise_id),
        ];
        for (label, id) in parts {
            if let Some(id) = id {
                if !first {
                    write!(f, ",")?;
                }
                first = false;
                write!(f, "{label}={id}")?;
            }
        }
        Ok(())
    }
}

/// Gender as captured on the lead profile; drives the salutation in task
/// descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn salutation(&self) -> &'static str {
        match self {
            Gender::Male => "Mr.",
            Gender::Female => "Ms.",
            Gender::Other => "Mx.",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Staff record with its flattened country membership set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: i64,
    pub name: String,
    pub role_id: i64,
    pub branch_id: Option<i64>,
    pub franchise_id: Option<i64>,
    pub region_id: Option<i64>,
    pub country_ids: Vec<i64>,
    pub active: bool,
}

/// Lead profile as read for routing and description building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub gender: Option<Gender>,
    pub birth_year: Option<i32>,
    pub marital_status: Option<String>,
    pub city: Option<String>,
    pub stage_id: i64,
    pub branch_id: Option<i64>,
    pub franchise_id: Option<i64>,
    pub region_id: Option<i64>,
    pub preferred_country_ids: Vec<i64>,
}

/// First study preference on a lead, consumed by the description builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPreference {
    pub course_name: Option<String>,
    pub university_name: Option<String>,
    pub intake_year: Option<i32>,
}

/// Application derived from a lead's study preference.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub lead_id: i64,
    pub assigned_user: Option<i64>,
    pub university_name: Option<String>,
    pub campus_name: Option<String>,
    pub course_name: Option<String>,
}

/// Follow-up work item created by a successful assignment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskItem {
    pub id: i64,
    pub owner_id: i64,
    pub subject_id: i64,
    pub subject_kind: String,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Join record connecting a staff member to a subject within a scope.
///
/// On reassignment old links for the subject are deleted and new ones
/// created inside the same transaction, so the link set always reflects
/// only the current owners.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssignmentLink {
    pub id: i64,
    pub staff_id: i64,
    pub subject_id: i64,
    pub country_id: Option<i64>,
    pub status_id: i64,
    pub followup_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit record. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    pub subject_id: i64,
    pub action: String,
    pub actor_id: i64,
    pub country_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
