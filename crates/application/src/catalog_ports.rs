use async_trait::async_trait;
use grantline_core::AppResult;
use grantline_domain::{RoleGrant, RoleType};

/// Time-to-live for catalog listings (databases, roles, grants), in seconds.
pub const CATALOG_TTL_SECONDS: u32 = 300;

/// Time-to-live for slower-moving metadata listings (environments, function
/// names), in seconds.
pub const METADATA_TTL_SECONDS: u32 = 600;

/// Cached catalog data sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogScope {
    /// All database names in the account.
    Databases,
    /// All role names in the account.
    Roles,
    /// Distinct environment names from the environments table.
    Environments,
    /// Function names for one role type from the metadata table.
    FunctionNames(RoleType),
    /// Roles matching the functional/technical naming convention.
    FunctionalTechnicalRoles,
}

/// Port memoizing read-heavy catalog queries.
///
/// Entries expire on a fixed TTL; writers additionally invalidate the scopes
/// they touch, so staleness only affects catalog changes made outside this
/// service within the TTL window.
#[async_trait]
pub trait CatalogCache: Send + Sync {
    /// Returns a cached name listing, or `None` on miss or expiry.
    async fn get_names(&self, scope: &CatalogScope) -> AppResult<Option<Vec<String>>>;

    /// Stores a name listing; a zero TTL stores nothing.
    async fn set_names(
        &self,
        scope: CatalogScope,
        names: Vec<String>,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Returns cached outbound grants for a role, or `None` on miss.
    async fn get_role_grants(&self, role: &str) -> AppResult<Option<Vec<RoleGrant>>>;

    /// Stores a role's outbound grants; a zero TTL stores nothing.
    async fn set_role_grants(
        &self,
        role: &str,
        grants: Vec<RoleGrant>,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops one cached name listing.
    async fn invalidate_names(&self, scope: &CatalogScope) -> AppResult<()>;

    /// Drops all cached role grants.
    async fn invalidate_role_grants(&self) -> AppResult<()>;
}
