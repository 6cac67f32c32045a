use std::str::FromStr;

use grantline_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit event tags emitted by administrative actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventKind {
    /// Emitted when a database is created from scratch.
    CreateDatabase,
    /// Emitted when a database is created as a clone.
    CloneDatabase,
    /// Emitted when a database is dropped.
    DeleteDatabase,
    /// Emitted when a warehouse is created.
    CreateWarehouse,
    /// Emitted when an account role is created.
    CreateRole,
    /// Emitted for each role granted to a target role.
    AssignRoles,
    /// Emitted when database access is granted to a role.
    AssignDatabaseRoles,
    /// Emitted for each role revoked from a target role.
    RevokeRoles,
    /// Emitted when an environment-scoped role is provisioned.
    CreateEnvironmentRoles,
    /// Emitted when role metadata is updated.
    ManageMetadata,
}

impl AuditEventKind {
    /// Returns the stable storage value for this event kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateDatabase => "CREATE_DATABASE",
            Self::CloneDatabase => "CLONE_DATABASE",
            Self::DeleteDatabase => "DELETE_DATABASE",
            Self::CreateWarehouse => "CREATE_WAREHOUSE",
            Self::CreateRole => "CREATE_ROLE",
            Self::AssignRoles => "ASSIGN_ROLES",
            Self::AssignDatabaseRoles => "ASSIGN_DATABASE_ROLES",
            Self::RevokeRoles => "REVOKE_ROLES",
            Self::CreateEnvironmentRoles => "CREATE_ENVIRONMENT_ROLES",
            Self::ManageMetadata => "MANAGE_METADATA",
        }
    }

    /// Returns all known event kinds.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditEventKind] = &[
            AuditEventKind::CreateDatabase,
            AuditEventKind::CloneDatabase,
            AuditEventKind::DeleteDatabase,
            AuditEventKind::CreateWarehouse,
            AuditEventKind::CreateRole,
            AuditEventKind::AssignRoles,
            AuditEventKind::AssignDatabaseRoles,
            AuditEventKind::RevokeRoles,
            AuditEventKind::CreateEnvironmentRoles,
            AuditEventKind::ManageMetadata,
        ];

        ALL
    }
}

impl FromStr for AuditEventKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CREATE_DATABASE" => Ok(Self::CreateDatabase),
            "CLONE_DATABASE" => Ok(Self::CloneDatabase),
            "DELETE_DATABASE" => Ok(Self::DeleteDatabase),
            "CREATE_WAREHOUSE" => Ok(Self::CreateWarehouse),
            "CREATE_ROLE" => Ok(Self::CreateRole),
            "ASSIGN_ROLES" => Ok(Self::AssignRoles),
            "ASSIGN_DATABASE_ROLES" => Ok(Self::AssignDatabaseRoles),
            "REVOKE_ROLES" => Ok(Self::RevokeRoles),
            "CREATE_ENVIRONMENT_ROLES" => Ok(Self::CreateEnvironmentRoles),
            "MANAGE_METADATA" => Ok(Self::ManageMetadata),
            _ => Err(AppError::Validation(format!(
                "unknown audit event kind '{value}'"
            ))),
        }
    }
}

/// Terminal status recorded with every audit or hierarchy log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// The administrative statement completed.
    Success,
    /// The administrative statement failed.
    Failure,
}

impl EventStatus {
    /// Returns the stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl FromStr for EventStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "SUCCESS" => Ok(Self::Success),
            "FAILURE" => Ok(Self::Failure),
            _ => Err(AppError::Validation(format!(
                "unknown event status '{value}'"
            ))),
        }
    }
}
