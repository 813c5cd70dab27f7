//! Derived-description recomputation hook
//!
//! Task descriptions are denormalized snapshots of subject profile data.
//! Mutating flows emit a `SubjectEvent` instead of remembering to rewrite
//! task text themselves; the refresher recomputes descriptions for the
//! subject's open, non-completed tasks.

use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::database::{LeadRepository, TaskRepository};
use crate::error::Result;
use crate::models::UnitKind;
use crate::routing::description::build_description;

/// Profile mutations that invalidate stored task descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectEvent {
    DemographicsChanged {
        subject_id: i64,
        unit_kind: UnitKind,
    },
    StudyPreferenceChanged {
        subject_id: i64,
        unit_kind: UnitKind,
    },
}

impl SubjectEvent {
    pub fn subject_id(&self) -> i64 {
        match *self {
            SubjectEvent::DemographicsChanged { subject_id, .. }
            | SubjectEvent::StudyPreferenceChanged { subject_id, .. } => subject_id,
        }
    }

    pub fn unit_kind(&self) -> UnitKind {
        match *self {
            SubjectEvent::DemographicsChanged { unit_kind, .. }
            | SubjectEvent::StudyPreferenceChanged { unit_kind, .. } => unit_kind,
        }
    }
}

/// Recomputes denormalized task descriptions after profile edits.
#[derive(Clone)]
pub struct DescriptionRefresher {
    leads: LeadRepository,
    tasks: TaskRepository,
}

impl DescriptionRefresher {
    pub fn new(pool: PgPool) -> Self {
        Self {
            leads: LeadRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool),
        }
    }

    /// Handle one event synchronously. Returns the number of task rows
    /// rewritten. A vanished subject refreshes nothing.
    pub async fn handle(&self, event: SubjectEvent) -> Result<usize> {
        self.refresh_subject(event.subject_id(), event.unit_kind())
            .await
    }

    /// Recompute descriptions for every open task referencing the subject.
    pub async fn refresh_subject(&self, subject_id: i64, unit_kind: UnitKind) -> Result<usize> {
        let profile = match unit_kind {
            UnitKind::Lead | UnitKind::Counselling => {
                self.leads.profile_for_lead(subject_id).await?
            }
            UnitKind::Application => self.leads.profile_for_application(subject_id).await?,
        };

        let Some(profile) = profile else {
            debug!(subject_id, "subject gone; nothing to refresh");
            return Ok(0);
        };

        let description = build_description(&profile);
        let open_tasks = self.tasks.open_tasks_for_subject(subject_id).await?;

        let mut refreshed = 0;
        for task in open_tasks {
            refreshed += self
                .tasks
                .update_description(task.id, &description)
                .await? as usize;
        }

        debug!(subject_id, refreshed, "task descriptions refreshed");
        Ok(refreshed)
    }

    /// Spawn a background listener so mutating flows can fire events
    /// without awaiting the refresh. Dropping the sender stops the task.
    pub fn spawn_listener(self, buffer: usize) -> (mpsc::Sender<SubjectEvent>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<SubjectEvent>(buffer);
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = self.handle(event).await {
                    warn!(subject_id = event.subject_id(), error = %e, "description refresh failed");
                }
            }
        });
        (tx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_carry_subject_and_kind() {
        let event = SubjectEvent::StudyPreferenceChanged {
            subject_id: 11,
            unit_kind: UnitKind::Lead,
        };
        assert_eq!(event.subject_id(), 11);
        assert_eq!(event.unit_kind(), UnitKind::Lead);
    }
}
