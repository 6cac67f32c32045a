use std::sync::Arc;

use grantline_core::{AppError, AppResult, SqlIdentifier};
use grantline_domain::{
    AccessLevel, AuditEventKind, EventStatus, RoleType, environment_role_name,
};

use crate::audit_log_service::AuditLogService;
use crate::audit_ports::AuditEventDraft;
use crate::catalog_service::CatalogService;
use crate::hierarchy_log_service::RoleHierarchyLogService;
use crate::hierarchy_ports::RoleHierarchyEventDraft;
use crate::session_service::SessionService;
use crate::warehouse_ports::{Statement, WarehouseClient};

/// Parameters for provisioning one environment-scoped role.
#[derive(Debug, Clone)]
pub struct ProvisionEnvironmentRoleInput {
    /// Deployment environment the role is scoped to.
    pub environment: SqlIdentifier,
    /// Base role the environment role is derived from.
    pub base_role: SqlIdentifier,
    /// Functional/technical classification of the base role.
    pub role_type: RoleType,
    /// Database whose database-level role is mapped in.
    pub database: SqlIdentifier,
    /// Access level selecting the mapped database role.
    pub access_level: AccessLevel,
    /// Account role receiving ownership of the new role.
    pub parent_role: SqlIdentifier,
}

/// Role administration: creation, membership grants/revokes, database
/// access, environment-role provisioning.
///
/// Multi-role actions issue one statement per role, sequentially and outside
/// any transaction; a failure partway through leaves the earlier grants in
/// place, each with its own audit row.
#[derive(Clone)]
pub struct RoleAdminService {
    client: Arc<dyn WarehouseClient>,
    audit: AuditLogService,
    hierarchy_log: RoleHierarchyLogService,
    catalog: CatalogService,
    session: SessionService,
}

impl RoleAdminService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        client: Arc<dyn WarehouseClient>,
        audit: AuditLogService,
        hierarchy_log: RoleHierarchyLogService,
        catalog: CatalogService,
        session: SessionService,
    ) -> Self {
        Self {
            client,
            audit,
            hierarchy_log,
            catalog,
            session,
        }
    }

    /// Creates an account role.
    pub async fn create_role(&self, name: &SqlIdentifier, role_type: RoleType) -> AppResult<()> {
        let sql = format!("CREATE ROLE {name}");

        match self.client.execute(Statement::new(sql.clone())).await {
            Ok(_) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::CreateRole,
                            name.as_str(),
                            sql,
                            EventStatus::Success,
                        )
                        .with_message(format!(
                            "Created {} role {name}",
                            role_type.as_str().to_ascii_lowercase()
                        )),
                    )
                    .await;
                self.catalog.invalidate_roles().await;
                Ok(())
            }
            Err(error) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::CreateRole,
                            name.as_str(),
                            sql,
                            EventStatus::Failure,
                        )
                        .with_message(error.to_string()),
                    )
                    .await;
                Err(error)
            }
        }
    }

    /// Grants each listed role to the target, one statement at a time.
    pub async fn grant_roles(
        &self,
        target: &SqlIdentifier,
        roles: &[SqlIdentifier],
    ) -> AppResult<()> {
        if roles.is_empty() {
            return Err(AppError::Validation(
                "select at least one role to grant".to_owned(),
            ));
        }

        for role in roles {
            let sql = format!("GRANT ROLE {role} TO ROLE {target}");
            match self.client.execute(Statement::new(sql.clone())).await {
                Ok(_) => {
                    self.audit
                        .record_event(
                            AuditEventDraft::new(
                                AuditEventKind::AssignRoles,
                                target.as_str(),
                                sql,
                                EventStatus::Success,
                            )
                            .with_message(format!("Granted role {role} to {target}")),
                        )
                        .await;
                }
                Err(error) => {
                    self.audit
                        .record_event(
                            AuditEventDraft::new(
                                AuditEventKind::AssignRoles,
                                target.as_str(),
                                sql,
                                EventStatus::Failure,
                            )
                            .with_message(error.to_string()),
                        )
                        .await;
                    self.catalog.invalidate_roles().await;
                    return Err(error);
                }
            }
        }

        self.catalog.invalidate_roles().await;
        Ok(())
    }

    /// Revokes each listed role from the target, one statement at a time.
    pub async fn revoke_roles(
        &self,
        target: &SqlIdentifier,
        roles: &[SqlIdentifier],
    ) -> AppResult<()> {
        if roles.is_empty() {
            return Err(AppError::Validation(
                "select at least one role to revoke".to_owned(),
            ));
        }

        for role in roles {
            let sql = format!("REVOKE ROLE {role} FROM ROLE {target}");
            match self.client.execute(Statement::new(sql.clone())).await {
                Ok(_) => {
                    self.audit
                        .record_event(
                            AuditEventDraft::new(
                                AuditEventKind::RevokeRoles,
                                target.as_str(),
                                sql,
                                EventStatus::Success,
                            )
                            .with_message(format!("Revoked role {role} from {target}")),
                        )
                        .await;
                }
                Err(error) => {
                    self.audit
                        .record_event(
                            AuditEventDraft::new(
                                AuditEventKind::RevokeRoles,
                                target.as_str(),
                                sql,
                                EventStatus::Failure,
                            )
                            .with_message(error.to_string()),
                        )
                        .await;
                    self.catalog.invalidate_roles().await;
                    return Err(error);
                }
            }
        }

        self.catalog.invalidate_roles().await;
        Ok(())
    }

    /// Grants database access to a role through the level's database role.
    pub async fn grant_database_access(
        &self,
        database: &SqlIdentifier,
        target: &SqlIdentifier,
        level: AccessLevel,
    ) -> AppResult<()> {
        let database_role = format!("{database}.{}", level.database_role_suffix());
        let sql = format!("GRANT DATABASE ROLE {database_role} TO ROLE {target}");

        match self.client.execute(Statement::new(sql.clone())).await {
            Ok(_) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::AssignDatabaseRoles,
                            database.as_str(),
                            sql,
                            EventStatus::Success,
                        )
                        .with_message(format!(
                            "Granted {} on {database} to role {target}",
                            level.description()
                        )),
                    )
                    .await;
                self.catalog.invalidate_roles().await;
                Ok(())
            }
            Err(error) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::AssignDatabaseRoles,
                            database.as_str(),
                            sql,
                            EventStatus::Failure,
                        )
                        .with_message(error.to_string()),
                    )
                    .await;
                Err(error)
            }
        }
    }

    /// Provisions an environment-scoped role: creates it, maps the
    /// database-level role in, and hands ownership to the parent account
    /// role. All three statements land verbatim in the hierarchy log,
    /// cross-referenced to the audit entry when one was written.
    pub async fn provision_environment_role(
        &self,
        input: ProvisionEnvironmentRoleInput,
    ) -> AppResult<SqlIdentifier> {
        let env_role = environment_role_name(&input.base_role, &input.environment)?;
        let mapped_database_role =
            format!("{}.{}", input.database, input.access_level.database_role_suffix());

        let create_sql = format!("CREATE ROLE {env_role}");
        let grant_db_sql =
            format!("GRANT DATABASE ROLE {mapped_database_role} TO ROLE {env_role}");
        let grant_ownership_sql = format!(
            "GRANT OWNERSHIP ON ROLE {env_role} TO ROLE {} COPY CURRENT GRANTS",
            input.parent_role
        );

        let invoked_by = self.session.current_identity().await;
        let combined_sql = format!("{create_sql}; {grant_db_sql}; {grant_ownership_sql}");

        let steps = [
            create_sql.as_str(),
            grant_db_sql.as_str(),
            grant_ownership_sql.as_str(),
        ];
        for step in steps {
            if let Err(error) = self.client.execute(Statement::new(step)).await {
                let audit_outcome = self
                    .audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::CreateEnvironmentRoles,
                            env_role.as_str(),
                            combined_sql.clone(),
                            EventStatus::Failure,
                        )
                        .with_message(error.to_string())
                        .with_identity(invoked_by.clone()),
                    )
                    .await;
                self.hierarchy_log
                    .record_provisioning(RoleHierarchyEventDraft {
                        audit_event_id: audit_outcome.event_id(),
                        invoked_by: invoked_by.user().to_owned(),
                        environment_name: input.environment.as_str().to_owned(),
                        created_role_name: env_role.as_str().to_owned(),
                        created_role_type: input.role_type,
                        mapped_database_role: mapped_database_role.clone(),
                        parent_account_role: input.parent_role.as_str().to_owned(),
                        sql_command_create_role: create_sql.clone(),
                        sql_command_grant_db_role: grant_db_sql.clone(),
                        sql_command_grant_ownership: grant_ownership_sql.clone(),
                        status: EventStatus::Failure,
                        message: error.to_string(),
                    })
                    .await;
                self.catalog.invalidate_roles().await;
                return Err(error);
            }
        }

        let audit_outcome = self
            .audit
            .record_event(
                AuditEventDraft::new(
                    AuditEventKind::CreateEnvironmentRoles,
                    env_role.as_str(),
                    combined_sql,
                    EventStatus::Success,
                )
                .with_message(format!(
                    "Created environment role {env_role} from {} for {}",
                    input.base_role, input.environment
                ))
                .with_identity(invoked_by.clone()),
            )
            .await;

        self.hierarchy_log
            .record_provisioning(RoleHierarchyEventDraft {
                audit_event_id: audit_outcome.event_id(),
                invoked_by: invoked_by.user().to_owned(),
                environment_name: input.environment.as_str().to_owned(),
                created_role_name: env_role.as_str().to_owned(),
                created_role_type: input.role_type,
                mapped_database_role,
                parent_account_role: input.parent_role.as_str().to_owned(),
                sql_command_create_role: create_sql,
                sql_command_grant_db_role: grant_db_sql,
                sql_command_grant_ownership: grant_ownership_sql,
                status: EventStatus::Success,
                message: String::new(),
            })
            .await;

        self.catalog.invalidate_roles().await;
        Ok(env_role)
    }
}
