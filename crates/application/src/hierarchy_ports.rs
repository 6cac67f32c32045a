use chrono::{DateTime, Utc};
use grantline_domain::{EventStatus, RoleType};

/// Fields for one role-provisioning log write.
#[derive(Debug, Clone)]
pub struct RoleHierarchyEventDraft {
    /// Audit trail entry this provisioning step was wrapped in, when one
    /// was written.
    pub audit_event_id: Option<i64>,
    /// Acting principal.
    pub invoked_by: String,
    /// Deployment environment the new role is scoped to.
    pub environment_name: String,
    /// The provisioned role.
    pub created_role_name: String,
    /// Functional/technical classification of the provisioned role.
    pub created_role_type: RoleType,
    /// Database-level role the new role maps to.
    pub mapped_database_role: String,
    /// Account-level role the new role hangs under.
    pub parent_account_role: String,
    /// CREATE ROLE statement, verbatim.
    pub sql_command_create_role: String,
    /// Database-role grant statement, verbatim.
    pub sql_command_grant_db_role: String,
    /// Ownership grant statement, verbatim.
    pub sql_command_grant_ownership: String,
    /// Outcome of the provisioning step.
    pub status: EventStatus,
    /// Free-text detail, empty by default.
    pub message: String,
}

/// One stored role-provisioning log row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHierarchyLogEntry {
    /// Sequence-assigned log id, strictly increasing in write order.
    pub log_id: i64,
    /// Write time.
    pub event_time: DateTime<Utc>,
    /// Linked audit trail entry, when one exists.
    pub audit_event_id: Option<i64>,
    /// Acting principal.
    pub invoked_by: String,
    /// Deployment environment the role is scoped to.
    pub environment_name: String,
    /// The provisioned role.
    pub created_role_name: String,
    /// Stored role type value.
    pub created_role_type: String,
    /// Database-level role the new role maps to.
    pub mapped_database_role: String,
    /// Account-level role the new role hangs under.
    pub parent_account_role: String,
    /// CREATE ROLE statement, verbatim.
    pub sql_command_create_role: String,
    /// Database-role grant statement, verbatim.
    pub sql_command_grant_db_role: String,
    /// Ownership grant statement, verbatim.
    pub sql_command_grant_ownership: String,
    /// Stored outcome value.
    pub status: String,
    /// Free-text detail.
    pub message: String,
}
