//! Batch assignment coordination
//!
//! Drives selection and the per-subject assignment transaction across a
//! whole batch. Rosters and committed load counts are fetched once per
//! distinct scope; the `BatchPlanner` running counter layers this batch's
//! picks on top so load balances across the run. Each subject commits its
//! own transaction, so one failure never rolls back earlier subjects.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::RoutingConfig;
use crate::database::{LeadRepository, LoadRepository, StaffRepository};
use crate::error::{Result, RoutingError};
use crate::models::{LocalityScope, UnitKind};
use crate::routing::assignment::{AssignOptions, AssignmentEngine, AssignmentOutcome};
use crate::routing::selector::{rank, BatchPlanner, CandidateLoad};

/// Maps a subject to the locality scope restricting its candidate pool.
#[async_trait]
pub trait LocalityResolver: Send + Sync {
    async fn resolve(&self, subject_id: i64) -> Result<LocalityScope>;
}

/// Every subject shares one scope (e.g. a bulk action within one country).
pub struct FixedScopeResolver(pub LocalityScope);

#[async_trait]
impl LocalityResolver for FixedScopeResolver {
    async fn resolve(&self, _subject_id: i64) -> Result<LocalityScope> {
        Ok(self.0)
    }
}

/// Scope a lead by its first preferred country, unscoped when it has none.
pub struct LeadCountryResolver {
    leads: LeadRepository,
}

impl LeadCountryResolver {
    pub fn new(pool: PgPool) -> Self {
        Self {
            leads: LeadRepository::new(pool),
        }
    }
}

#[async_trait]
impl LocalityResolver for LeadCountryResolver {
    async fn resolve(&self, subject_id: i64) -> Result<LocalityScope> {
        let lead = self
            .leads
            .get_lead(subject_id)
            .await?
            .ok_or_else(|| RoutingError::not_found("lead", subject_id))?;

        Ok(match lead.preferred_country_ids.first() {
            Some(&country_id) => LocalityScope::for_country(country_id),
            None => LocalityScope::default(),
        })
    }
}

/// Per-item results of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Subject id to the staff member it was assigned to.
    pub assignments: HashMap<i64, i64>,
    /// Subjects whose scope yielded no eligible staff; left unassigned.
    pub unresolved: Vec<i64>,
    /// Subjects whose own transaction failed; earlier commits stand.
    pub failed: Vec<(i64, String)>,
}

impl BatchOutcome {
    pub fn is_fully_assigned(&self) -> bool {
        self.unresolved.is_empty() && self.failed.is_empty()
    }
}

pub struct BatchCoordinator {
    config: RoutingConfig,
    engine: AssignmentEngine,
    staff: StaffRepository,
    loads: LoadRepository,
}

impl BatchCoordinator {
    pub fn new(pool: PgPool, config: RoutingConfig) -> Self {
        Self {
            engine: AssignmentEngine::new(pool.clone(), config.clone()),
            staff: StaffRepository::new(pool.clone()),
            loads: LoadRepository::new(pool),
            config,
        }
    }

    /// Assign every subject in the batch, balancing load across the run.
    ///
    /// Zero-candidate scopes are soft: the subject lands in `unresolved`
    /// and the batch continues. Transaction failures land in `failed` the
    /// same way; nothing already committed is undone.
    pub async fn assign_batch(
        &self,
        subject_ids: &[i64],
        unit_kind: UnitKind,
        role_ids: &[i64],
        resolver: &dyn LocalityResolver,
        actor_id: i64,
    ) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        let mut planner = BatchPlanner::new();
        let mut pools: HashMap<LocalityScope, Vec<CandidateLoad>> = HashMap::new();

        for &subject_id in subject_ids {
            let scope = match resolver.resolve(subject_id).await {
                Ok(scope) => scope,
                Err(e) => {
                    warn!(subject_id, error = %e, "failed to resolve locality scope");
                    outcome.failed.push((subject_id, e.to_string()));
                    continue;
                }
            };

            let candidates = match pools.get(&scope) {
                Some(cached) => cached.clone(),
                None => match self.candidate_pool(unit_kind, role_ids, &scope).await {
                    Ok(candidates) => {
                        pools.insert(scope, candidates.clone());
                        candidates
                    }
                    Err(e) => {
                        warn!(subject_id, %scope, error = %e, "failed to load candidate pool");
                        outcome.failed.push((subject_id, e.to_string()));
                        continue;
                    }
                },
            };

            let Some(staff_id) = planner.pick(&candidates) else {
                info!(subject_id, %scope, "no eligible candidate; left unassigned");
                outcome.unresolved.push(subject_id);
                continue;
            };

            let options = AssignOptions::reassign(scope);
            match self
                .engine
                .assign(subject_id, unit_kind, staff_id, actor_id, &options)
                .await
            {
                Ok(_) => {
                    outcome.assignments.insert(subject_id, staff_id);
                }
                Err(e) => {
                    // The transaction rolled back, so the anticipated load
                    // never materialized; release the pick.
                    planner.unpick(staff_id);
                    warn!(subject_id, staff_id, error = %e, "assignment failed; continuing batch");
                    outcome.failed.push((subject_id, e.to_string()));
                }
            }
        }

        info!(
            total = subject_ids.len(),
            assigned = outcome.assignments.len(),
            unresolved = outcome.unresolved.len(),
            failed = outcome.failed.len(),
            "batch assignment finished"
        );
        Ok(outcome)
    }

    /// Pick the least-loaded eligible staff member for one unit of work
    /// and commit the assignment.
    ///
    /// An empty candidate pool is a hard error here, unlike the batch path
    /// where it only marks the subject unresolved. Candidates are tried in
    /// rank order: when one vanishes between the roster read and the
    /// transaction, the next-ranked candidate gets the work.
    pub async fn assign_least_loaded(
        &self,
        subject_id: i64,
        unit_kind: UnitKind,
        role_ids: &[i64],
        scope: LocalityScope,
        actor_id: i64,
    ) -> Result<(i64, AssignmentOutcome)> {
        let candidates = self.candidate_pool(unit_kind, role_ids, &scope).await?;
        if candidates.is_empty() {
            return Err(RoutingError::NoEligibleCandidate { unit_kind, scope });
        }

        let options = AssignOptions::reassign(scope);
        for staff_id in rank(&candidates) {
            match self
                .engine
                .assign(subject_id, unit_kind, staff_id, actor_id, &options)
                .await
            {
                Ok(outcome) => return Ok((staff_id, outcome)),
                Err(RoutingError::NotFound { entity: "staff", id }) => {
                    warn!(subject_id, staff_id = id, "ranked candidate vanished; trying next");
                }
                Err(e) => return Err(e),
            }
        }

        Err(RoutingError::NoEligibleCandidate { unit_kind, scope })
    }

    /// Roster plus committed load counts for one scope, fetched in two
    /// bulk queries.
    async fn candidate_pool(
        &self,
        unit_kind: UnitKind,
        role_ids: &[i64],
        scope: &LocalityScope,
    ) -> Result<Vec<CandidateLoad>> {
        let roster = self.staff.eligible_staff(role_ids, scope).await?;
        if roster.is_empty() {
            return Ok(Vec::new());
        }

        let staff_ids: Vec<i64> = roster.iter().map(|s| s.id).collect();
        let counts = self
            .loads
            .active_counts(unit_kind, &staff_ids, &self.config.statuses)
            .await?;

        Ok(staff_ids
            .into_iter()
            .map(|id| CandidateLoad::new(id, counts.get(&id).copied().unwrap_or(0)))
            .collect())
    }
}
