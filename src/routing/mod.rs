//! Assignment and routing engine
//!
//! Control flow: a triggering event hands subjects to the batch coordinator
//! (or directly to the assignment engine for one unit). The roster queries
//! supply candidates, the load counter scores them, the selector picks, and
//! the engine commits links, task and history in one transaction.

pub mod assignment;
pub mod batch;
pub mod description;
pub mod refresh;
pub mod selector;

pub use assignment::{AssignOptions, AssignmentEngine, AssignmentOutcome};
pub use batch::{
    BatchCoordinator, BatchOutcome, FixedScopeResolver, LeadCountryResolver, LocalityResolver,
};
pub use description::{build_description, build_title, SubjectProfile};
pub use refresh::{DescriptionRefresher, SubjectEvent};
pub use selector::{rank, select_least, BatchPlanner, CandidateLoad};
