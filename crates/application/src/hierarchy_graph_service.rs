use grantline_core::AppResult;
use grantline_domain::{RoleHierarchy, RoleHierarchyEntry};

use crate::catalog_service::CatalogService;

/// Builds the role-grant graph from the live catalog.
///
/// Pure read-then-project pipeline: every invocation fetches the full role
/// list and each role's outbound grants, holds nothing afterwards, and makes
/// no attempt at cycle handling or edge dedup (the graph is a display
/// artifact).
#[derive(Clone)]
pub struct HierarchyGraphService {
    catalog: CatalogService,
}

impl HierarchyGraphService {
    /// Creates a service over the catalog reader.
    #[must_use]
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog }
    }

    /// Assembles the hierarchy: one entry per catalog role, grants in the
    /// catalog's newest-first order, empty list for grant-less roles.
    pub async fn build_hierarchy(&self) -> AppResult<RoleHierarchy> {
        let roles = self.catalog.list_roles().await?;

        let mut entries = Vec::with_capacity(roles.len());
        for role in roles {
            let grants = self.catalog.list_role_grants(role.as_str()).await?;
            entries.push(RoleHierarchyEntry {
                role,
                granted_roles: grants.into_iter().map(|grant| grant.granted_role).collect(),
            });
        }

        Ok(RoleHierarchy::from_entries(entries))
    }
}
