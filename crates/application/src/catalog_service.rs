use std::sync::Arc;

use grantline_core::AppResult;
use grantline_domain::{RoleGrant, RoleType};
use tracing::warn;

use crate::catalog_ports::{
    CATALOG_TTL_SECONDS, CatalogCache, CatalogScope, METADATA_TTL_SECONDS,
};
use crate::control_schema::ControlSchema;
use crate::warehouse_ports::{Statement, WarehouseClient};

/// Read side of the warehouse catalog, memoized through the cache port.
///
/// Listings are fetched whole (no pagination; the catalog is assumed to fit
/// in memory), sorted, and cached for a fixed TTL. Cache trouble is never a
/// reason to fail a read: a broken cache degrades to a fetch.
#[derive(Clone)]
pub struct CatalogService {
    client: Arc<dyn WarehouseClient>,
    cache: Arc<dyn CatalogCache>,
    schema: ControlSchema,
}

impl CatalogService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        client: Arc<dyn WarehouseClient>,
        cache: Arc<dyn CatalogCache>,
        schema: ControlSchema,
    ) -> Self {
        Self {
            client,
            cache,
            schema,
        }
    }

    /// Lists all database names in the account, sorted.
    pub async fn list_databases(&self) -> AppResult<Vec<String>> {
        if let Some(cached) = self.cached_names(&CatalogScope::Databases).await {
            return Ok(cached);
        }

        let names = self
            .fetch_names(Statement::new("SHOW DATABASES"), "NAME")
            .await?;
        self.store_names(CatalogScope::Databases, &names, CATALOG_TTL_SECONDS)
            .await;
        Ok(names)
    }

    /// Lists all role names in the account, sorted.
    pub async fn list_roles(&self) -> AppResult<Vec<String>> {
        if let Some(cached) = self.cached_names(&CatalogScope::Roles).await {
            return Ok(cached);
        }

        let names = self.fetch_names(Statement::new("SHOW ROLES"), "NAME").await?;
        self.store_names(CatalogScope::Roles, &names, CATALOG_TTL_SECONDS)
            .await;
        Ok(names)
    }

    /// Lists a role's outbound grants, newest grant first.
    ///
    /// The role name is matched as a bound value against the grants view,
    /// so any catalog-reported name works here, quoted or not.
    pub async fn list_role_grants(&self, role_name: &str) -> AppResult<Vec<RoleGrant>> {
        match self.cache.get_role_grants(role_name).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(error) => warn!(%error, role = role_name, "catalog cache read failed"),
        }

        let statement = Statement::new(format!(
            "SELECT NAME AS GRANTED_ROLE, GRANTEE_NAME AS GRANTED_TO_ROLE, \
             CREATED_ON AS GRANTED_AT FROM {} \
             WHERE GRANTEE_NAME = ? AND PRIVILEGE = 'USAGE' AND GRANTED_ON = 'ROLE' \
             AND DELETED_ON IS NULL ORDER BY CREATED_ON DESC",
            self.schema.usage_view("GRANTS_TO_ROLES")
        ))
        .bind(role_name);

        let rows = self.client.execute(statement).await?;
        let mut grants = Vec::with_capacity(rows.len());
        for row in rows {
            grants.push(RoleGrant {
                granted_role: row.text("GRANTED_ROLE")?,
                granted_to_role: row.text("GRANTED_TO_ROLE")?,
                granted_at: row.optional_timestamp("GRANTED_AT")?,
            });
        }

        if let Err(error) = self
            .cache
            .set_role_grants(role_name, grants.clone(), CATALOG_TTL_SECONDS)
            .await
        {
            warn!(%error, role = role_name, "catalog cache write failed");
        }
        Ok(grants)
    }

    /// Lists roles matching the functional/technical naming convention.
    pub async fn list_functional_technical_roles(&self) -> AppResult<Vec<String>> {
        if let Some(cached) = self
            .cached_names(&CatalogScope::FunctionalTechnicalRoles)
            .await
        {
            return Ok(cached);
        }

        let statement = Statement::new(format!(
            "SELECT DISTINCT NAME AS ROLE_NAME FROM {} \
             WHERE (NAME LIKE ? OR NAME LIKE ?) AND DELETED_ON IS NULL ORDER BY NAME",
            self.schema.usage_view("ROLES")
        ))
        .bind(format!("%{}", RoleType::Functional.catalog_suffix()))
        .bind(format!("%{}", RoleType::Technical.catalog_suffix()));

        let names = self.fetch_names(statement, "ROLE_NAME").await?;
        self.store_names(
            CatalogScope::FunctionalTechnicalRoles,
            &names,
            CATALOG_TTL_SECONDS,
        )
        .await;
        Ok(names)
    }

    /// Lists the known deployment environments.
    pub async fn list_environments(&self) -> AppResult<Vec<String>> {
        if let Some(cached) = self.cached_names(&CatalogScope::Environments).await {
            return Ok(cached);
        }

        let statement = Statement::new(format!(
            "SELECT DISTINCT ENVIRONMENT_NAME FROM {} ORDER BY ENVIRONMENT_NAME",
            self.schema.environments_table()
        ));
        let names = self.fetch_names(statement, "ENVIRONMENT_NAME").await?;
        self.store_names(CatalogScope::Environments, &names, METADATA_TTL_SECONDS)
            .await;
        Ok(names)
    }

    /// Lists function names registered for one role type.
    pub async fn list_function_names(&self, role_type: RoleType) -> AppResult<Vec<String>> {
        let scope = CatalogScope::FunctionNames(role_type);
        if let Some(cached) = self.cached_names(&scope).await {
            return Ok(cached);
        }

        let statement = Statement::new(format!(
            "SELECT DISTINCT FUNCTION_NAME FROM {} WHERE ROLE_TYPE = ? \
             ORDER BY FUNCTION_NAME",
            self.schema.role_metadata_table()
        ))
        .bind(role_type.as_str());

        let names = self.fetch_names(statement, "FUNCTION_NAME").await?;
        self.store_names(scope, &names, METADATA_TTL_SECONDS).await;
        Ok(names)
    }

    /// Drops cached database listings after a successful database mutation.
    pub async fn invalidate_databases(&self) {
        if let Err(error) = self.cache.invalidate_names(&CatalogScope::Databases).await {
            warn!(%error, "catalog cache invalidation failed");
        }
    }

    /// Drops cached role listings and grants after a successful role
    /// mutation.
    pub async fn invalidate_roles(&self) {
        for scope in [
            CatalogScope::Roles,
            CatalogScope::FunctionalTechnicalRoles,
        ] {
            if let Err(error) = self.cache.invalidate_names(&scope).await {
                warn!(%error, "catalog cache invalidation failed");
            }
        }
        if let Err(error) = self.cache.invalidate_role_grants().await {
            warn!(%error, "catalog cache invalidation failed");
        }
    }

    /// Drops cached function-name listings after a metadata mutation.
    pub async fn invalidate_function_names(&self) {
        for role_type in RoleType::all() {
            let scope = CatalogScope::FunctionNames(*role_type);
            if let Err(error) = self.cache.invalidate_names(&scope).await {
                warn!(%error, "catalog cache invalidation failed");
            }
        }
    }

    async fn cached_names(&self, scope: &CatalogScope) -> Option<Vec<String>> {
        match self.cache.get_names(scope).await {
            Ok(cached) => cached,
            Err(error) => {
                warn!(%error, ?scope, "catalog cache read failed");
                None
            }
        }
    }

    async fn store_names(&self, scope: CatalogScope, names: &[String], ttl_seconds: u32) {
        if let Err(error) = self
            .cache
            .set_names(scope, names.to_vec(), ttl_seconds)
            .await
        {
            warn!(%error, "catalog cache write failed");
        }
    }

    async fn fetch_names(&self, statement: Statement, column: &str) -> AppResult<Vec<String>> {
        let rows = self.client.execute(statement).await?;
        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(name) = row.optional_text(column)? {
                if !name.is_empty() {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
