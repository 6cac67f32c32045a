use std::sync::Arc;

use grantline_core::{AppError, AppResult, SqlIdentifier};
use grantline_domain::{AuditEventKind, EventStatus};

use crate::audit_log_service::AuditLogService;
use crate::audit_ports::AuditEventDraft;
use crate::catalog_service::CatalogService;
use crate::warehouse_ports::{Statement, WarehouseClient};

/// Database lifecycle actions: create, create-as-clone, drop.
#[derive(Clone)]
pub struct DatabaseAdminService {
    client: Arc<dyn WarehouseClient>,
    audit: AuditLogService,
    catalog: CatalogService,
}

impl DatabaseAdminService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        client: Arc<dyn WarehouseClient>,
        audit: AuditLogService,
        catalog: CatalogService,
    ) -> Self {
        Self {
            client,
            audit,
            catalog,
        }
    }

    /// Creates a database, optionally as a clone of an existing one.
    pub async fn create_database(
        &self,
        name: &SqlIdentifier,
        clone_from: Option<&SqlIdentifier>,
    ) -> AppResult<()> {
        let (kind, sql, message) = match clone_from {
            Some(source) => (
                AuditEventKind::CloneDatabase,
                format!("CREATE DATABASE {name} CLONE {source}"),
                format!("Created database {name} by cloning {source}"),
            ),
            None => (
                AuditEventKind::CreateDatabase,
                format!("CREATE DATABASE {name}"),
                format!("Created database {name}"),
            ),
        };

        match self.client.execute(Statement::new(sql.clone())).await {
            Ok(_) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(kind, name.as_str(), sql, EventStatus::Success)
                            .with_message(message),
                    )
                    .await;
                self.catalog.invalidate_databases().await;
                Ok(())
            }
            Err(error) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(kind, name.as_str(), sql, EventStatus::Failure)
                            .with_message(error.to_string()),
                    )
                    .await;
                Err(error)
            }
        }
    }

    /// Drops a database. Refuses without explicit confirmation; the refusal
    /// issues no SQL.
    pub async fn drop_database(&self, name: &SqlIdentifier, confirmed: bool) -> AppResult<()> {
        if !confirmed {
            return Err(AppError::Validation(
                "dropping a database requires explicit confirmation".to_owned(),
            ));
        }

        let sql = format!("DROP DATABASE {name}");
        match self.client.execute(Statement::new(sql.clone())).await {
            Ok(_) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::DeleteDatabase,
                            name.as_str(),
                            sql,
                            EventStatus::Success,
                        )
                        .with_message(format!("Deleted database {name}")),
                    )
                    .await;
                self.catalog.invalidate_databases().await;
                Ok(())
            }
            Err(error) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::DeleteDatabase,
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
}
