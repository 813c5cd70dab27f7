//! The assignment transaction
//!
//! One atomic unit: replace prior links, create the new link(s), create the
//! follow-up task from the subject's current profile, append history. Any
//! failure rolls the whole transaction back; partial assignment is never
//! observable.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::RoutingConfig;
use crate::database::{AssignmentRepository, LeadRepository, StaffRepository};
use crate::error::{Result, RoutingError};
use crate::models::{AssignmentLink, HistoryEntry, LocalityScope, TaskItem, UnitKind};
use crate::routing::description::{build_description, build_title, SubjectProfile};

/// Per-call knobs for `AssignmentEngine::assign`.
#[derive(Debug, Clone)]
pub struct AssignOptions {
    pub scope: LocalityScope,
    pub create_task: bool,
    pub replace_existing: bool,
}

impl AssignOptions {
    /// The common reassignment shape: replace old links and open a task.
    pub fn reassign(scope: LocalityScope) -> Self {
        Self {
            scope,
            create_task: true,
            replace_existing: true,
        }
    }

    /// First-time assignment: keep any links from other scopes untouched.
    pub fn fresh(scope: LocalityScope) -> Self {
        Self {
            scope,
            create_task: true,
            replace_existing: false,
        }
    }
}

/// Everything a committed assignment produced.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub links: Vec<AssignmentLink>,
    pub task: Option<TaskItem>,
    pub history: Vec<HistoryEntry>,
}

/// Orchestrates the atomic assignment flow over the repositories.
#[derive(Clone)]
pub struct AssignmentEngine {
    config: RoutingConfig,
    staff: StaffRepository,
    leads: LeadRepository,
    assignments: AssignmentRepository,
}

impl AssignmentEngine {
    pub fn new(pool: PgPool, config: RoutingConfig) -> Self {
        Self {
            config,
            staff: StaffRepository::new(pool.clone()),
            leads: LeadRepository::new(pool.clone()),
            assignments: AssignmentRepository::new(pool),
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Assign one unit of work to one staff member.
    ///
    /// Reads (subject, staff, country labels) happen up front; every write
    /// runs on a single transaction that commits at the end or not at all.
    pub async fn assign(
        &self,
        subject_id: i64,
        unit_kind: UnitKind,
        staff_id: i64,
        actor_id: i64,
        options: &AssignOptions,
    ) -> Result<AssignmentOutcome> {
        let staff = self
            .staff
            .get_staff(staff_id)
            .await?
            .ok_or_else(|| RoutingError::not_found("staff", staff_id))?;
        let role_label = self.config.roles.label(staff.role_id);

        let (subject_name, profile, target_countries) = self
            .load_subject(subject_id, unit_kind, &options.scope)
            .await?;

        let country_codes = if target_countries.is_empty() {
            Vec::new()
        } else {
            self.staff.country_codes(&target_countries).await?
        };
        let mut country_names = Vec::with_capacity(target_countries.len());
        for &country_id in &target_countries {
            let name = self
                .staff
                .country_name(country_id)
                .await?
                .unwrap_or_else(|| format!("country {country_id}"));
            country_names.push((country_id, name));
        }

        let today = Utc::now().date_naive();
        let mut tx = self.assignments.pool().begin().await?;

        if options.replace_existing && unit_kind != UnitKind::Application {
            let removed = self
                .assignments
                .delete_links(&mut tx, subject_id, options.scope.country_id)
                .await?;
            if removed > 0 {
                debug!(subject_id, removed, "replaced existing assignment links");
            }
        }

        let mut links = Vec::new();
        match unit_kind {
            UnitKind::Application => {
                let touched = self
                    .assignments
                    .set_application_owner(&mut tx, subject_id, staff_id)
                    .await?;
                if touched == 0 {
                    return Err(RoutingError::not_found("application", subject_id));
                }
            }
            UnitKind::Lead | UnitKind::Counselling => {
                if target_countries.is_empty() {
                    links.push(
                        self.assignments
                            .create_link(
                                &mut tx,
                                staff_id,
                                subject_id,
                                None,
                                self.config.statuses.new_lead,
                                today,
                            )
                            .await?,
                    );
                } else {
                    for &country_id in &target_countries {
                        links.push(
                            self.assignments
                                .create_link(
                                    &mut tx,
                                    staff_id,
                                    subject_id,
                                    Some(country_id),
                                    self.config.statuses.new_lead,
                                    today,
                                )
                                .await?,
                        );
                    }
                }
            }
        }

        let task = if options.create_task {
            let title = build_title(&subject_name, &country_codes);
            let description = build_description(&profile);
            Some(
                self.assignments
                    .create_task(
                        &mut tx,
                        staff_id,
                        subject_id,
                        unit_kind,
                        &title,
                        &description,
                        today,
                    )
                    .await?,
            )
        } else {
            None
        };

        let mut history = Vec::new();
        if country_names.is_empty() {
            let action = format!(
                "{unit_kind} assigned to {} ({role_label})",
                staff.name
            );
            history.push(
                self.assignments
                    .append_history(&mut tx, subject_id, &action, actor_id, None)
                    .await?,
            );
        } else {
            for (country_id, country_name) in &country_names {
                let action = format!("Task assigned to {country_name}'s {role_label}");
                history.push(
                    self.assignments
                        .append_history(&mut tx, subject_id, &action, actor_id, Some(*country_id))
                        .await?,
                );
            }
        }

        tx.commit().await?;
        info!(
            subject_id,
            staff_id,
            %unit_kind,
            links = links.len(),
            task_created = task.is_some(),
            "assignment committed"
        );

        Ok(AssignmentOutcome {
            links,
            task,
            history,
        })
    }

    /// Resolve the subject's display name, description profile and target
    /// country set. Missing subjects surface as NotFound before any write.
    async fn load_subject(
        &self,
        subject_id: i64,
        unit_kind: UnitKind,
        scope: &LocalityScope,
    ) -> Result<(String, SubjectProfile, Vec<i64>)> {
        match unit_kind {
            UnitKind::Lead | UnitKind::Counselling => {
                let lead = self
                    .leads
                    .get_lead(subject_id)
                    .await?
                    .ok_or_else(|| RoutingError::not_found("lead", subject_id))?;
                let study = self.leads.first_study_preference(subject_id).await?;

                let targets = match scope.country_id {
                    Some(country_id) => vec![country_id],
                    None => lead.preferred_country_ids.clone(),
                };

                let profile = SubjectProfile {
                    name: lead.name.clone(),
                    gender: lead.gender,
                    birth_year: lead.birth_year,
                    marital_status: lead.marital_status.clone(),
                    city: lead.city.clone(),
                    study,
                };
                Ok((lead.name, profile, targets))
            }
            UnitKind::Application => {
                let profile = self
                    .leads
                    .profile_for_application(subject_id)
                    .await?
                    .ok_or_else(|| RoutingError::not_found("application", subject_id))?;
                let targets = scope.country_id.into_iter().collect();
                Ok((profile.name.clone(), profile, targets))
            }
        }
    }
}
