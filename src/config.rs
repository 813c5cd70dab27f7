//! Injected role and status identifier configuration
//!
//! The surrounding CRM keys staff roles and link statuses by database ids.
//! The engine never reads those ids from the environment ad hoc; they are
//! resolved once at the composition root and passed in as registries.

use serde::{Deserialize, Serialize};

fn env_id(name: &str, fallback: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}

/// Role ids recognised by the roster queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRegistry {
    pub counsellor: i64,
    pub country_manager: i64,
    pub cre: i64,
    pub cre_tl: i64,
    pub application_team: i64,
    pub application_manager: i64,
    pub branch_counsellor: i64,
    pub franchise_counsellor: i64,
}

impl RoleRegistry {
    /// Roles eligible to own a counsellor assignment for a country-scoped
    /// lead. Country managers participate in the same round-robin pool.
    pub fn counselling_roles(&self) -> Vec<i64> {
        vec![self.counsellor, self.country_manager]
    }

    /// Roles eligible for application processing work.
    pub fn application_roles(&self) -> Vec<i64> {
        vec![self.application_team, self.application_manager]
    }

    /// Roles eligible for first-touch lead handling.
    pub fn cre_roles(&self) -> Vec<i64> {
        vec![self.cre, self.cre_tl]
    }

    /// Human-readable label for history entries.
    pub fn label(&self, role_id: i64) -> &'static str {
        match role_id {
            id if id == self.counsellor => "counsellor",
            id if id == self.country_manager => "country manager",
            id if id == self.cre => "CRE",
            id if id == self.cre_tl => "CRE team lead",
            id if id == self.application_team => "application team member",
            id if id == self.application_manager => "application manager",
            id if id == self.branch_counsellor => "branch counsellor",
            id if id == self.franchise_counsellor => "franchise counsellor",
            _ => "staff member",
        }
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self {
            counsellor: env_id("COUNSELLOR_ROLE_ID", 3),
            country_manager: env_id("COUNTRY_MANAGER_ROLE_ID", 4),
            cre: env_id("CRE_ROLE_ID", 5),
            cre_tl: env_id("CRE_TL_ROLE_ID", 6),
            application_team: env_id("APPLICATION_TEAM_ROLE_ID", 7),
            application_manager: env_id("APPLICATION_MANAGER_ROLE_ID", 8),
            branch_counsellor: env_id("BRANCH_COUNSELLOR_ROLE_ID", 9),
            franchise_counsellor: env_id("FRANCHISE_COUNSELLOR_ROLE_ID", 10),
        }
    }
}

/// Link/lead status ids recognised by the load counter and the assignment
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRegistry {
    pub new_lead: i64,
    pub follow_up: i64,
    pub spam: i64,
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self {
            new_lead: env_id("NEW_LEAD_STATUS_ID", 1),
            follow_up: env_id("FOLLOW_UP_STATUS_ID", 2),
            spam: env_id("SPAM_STATUS_ID", 12),
        }
    }
}

/// Everything the routing engine needs injected at construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub roles: RoleRegistry,
    pub statuses: StatusRegistry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counselling_pool_includes_country_managers() {
        let roles = RoleRegistry::default();
        let pool = roles.counselling_roles();
        assert!(pool.contains(&roles.counsellor));
        assert!(pool.contains(&roles.country_manager));
    }

    #[test]
    fn label_falls_back_for_unknown_roles() {
        let roles = RoleRegistry::default();
        assert_eq!(roles.label(roles.cre), "CRE");
        assert_eq!(roles.label(9999), "staff member");
    }
}
