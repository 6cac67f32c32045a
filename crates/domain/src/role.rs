use std::str::FromStr;

use grantline_core::{AppError, AppResult, SqlIdentifier};
use serde::{Deserialize, Serialize};

/// Functional/technical classification for managed roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleType {
    /// Business-facing role grouping access by job function.
    Functional,
    /// Platform-facing role grouping access by technical concern.
    Technical,
}

impl RoleType {
    /// Returns the stable storage value for this role type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Functional => "FUNCTIONAL",
            Self::Technical => "TECHNICAL",
        }
    }

    /// Returns the naming-convention suffix used in the catalog.
    #[must_use]
    pub fn catalog_suffix(&self) -> &'static str {
        match self {
            Self::Functional => "_FR",
            Self::Technical => "_TR",
        }
    }

    /// Returns all known role types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RoleType] = &[RoleType::Functional, RoleType::Technical];

        ALL
    }
}

impl FromStr for RoleType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FUNCTIONAL" => Ok(Self::Functional),
            "TECHNICAL" => Ok(Self::Technical),
            _ => Err(AppError::Validation(format!(
                "unknown role type '{value}'"
            ))),
        }
    }
}

/// Database access levels offered to operators.
///
/// Each level maps to a database-role suffix; granting access means granting
/// the database role `<DATABASE>.<suffix>` to the target account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// SELECT-style access on database objects.
    ReadOnly,
    /// SELECT, INSERT, UPDATE and DELETE on database objects.
    ReadWrite,
    /// All privileges on database objects.
    Full,
    /// Ownership and grant management on the database.
    DbAdmin,
}

impl AccessLevel {
    /// Returns the database-role suffix this level maps to.
    #[must_use]
    pub fn database_role_suffix(&self) -> &'static str {
        match self {
            Self::ReadOnly => "RO_AR",
            Self::ReadWrite => "RW_AR",
            Self::Full => "FULL_AR",
            Self::DbAdmin => "DBA_AR",
        }
    }

    /// Returns the operator-facing description of this level.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ReadOnly => "Read-Only (e.g., SELECT on tables)",
            Self::ReadWrite => "Read-Write (e.g., SELECT, INSERT, UPDATE, DELETE)",
            Self::Full => "Full Access (e.g., ALL PRIVILEGES on objects)",
            Self::DbAdmin => "DB Admin (e.g., OWNERSHIP or MANAGE GRANTS on DB)",
        }
    }

    /// Returns all known access levels.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AccessLevel] = &[
            AccessLevel::ReadOnly,
            AccessLevel::ReadWrite,
            AccessLevel::Full,
            AccessLevel::DbAdmin,
        ];

        ALL
    }
}

impl FromStr for AccessLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "RO_AR" => Ok(Self::ReadOnly),
            "RW_AR" => Ok(Self::ReadWrite),
            "FULL_AR" => Ok(Self::Full),
            "DBA_AR" => Ok(Self::DbAdmin),
            _ => Err(AppError::Validation(format!(
                "unknown access level '{value}'"
            ))),
        }
    }
}

/// Derives the environment-scoped role name `<BASE>_<ENVIRONMENT>`.
pub fn environment_role_name(
    base_role: &SqlIdentifier,
    environment: &SqlIdentifier,
) -> AppResult<SqlIdentifier> {
    SqlIdentifier::new(format!("{}_{}", base_role.as_str(), environment.as_str()))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use grantline_core::SqlIdentifier;

    use super::{AccessLevel, RoleType, environment_role_name};

    #[test]
    fn access_level_suffixes_are_stable() {
        assert_eq!(AccessLevel::ReadOnly.database_role_suffix(), "RO_AR");
        assert_eq!(AccessLevel::DbAdmin.database_role_suffix(), "DBA_AR");
        assert_eq!(AccessLevel::from_str("RW_AR").ok(), Some(AccessLevel::ReadWrite));
    }

    #[test]
    fn role_type_suffix_matches_catalog_convention() {
        assert_eq!(RoleType::Functional.catalog_suffix(), "_FR");
        assert_eq!(RoleType::Technical.catalog_suffix(), "_TR");
    }

    #[test]
    fn environment_role_name_joins_base_and_environment() {
        let Ok(base) = SqlIdentifier::new("reporting_fr") else {
            panic!("expected a valid base role");
        };
        let Ok(environment) = SqlIdentifier::new("dev") else {
            panic!("expected a valid environment");
        };

        let Ok(name) = environment_role_name(&base, &environment) else {
            panic!("expected a valid environment role name");
        };
        assert_eq!(name.as_str(), "REPORTING_FR_DEV");
    }
}
