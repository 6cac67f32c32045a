use std::sync::Arc;

use grantline_core::{AppResult, SqlIdentifier};
use grantline_domain::{AuditEventKind, EventStatus, WarehouseFunction, WarehouseSpec};

use crate::audit_log_service::AuditLogService;
use crate::audit_ports::AuditEventDraft;
use crate::warehouse_ports::{Statement, WarehouseClient};

/// Warehouse provisioning.
#[derive(Clone)]
pub struct WarehouseAdminService {
    client: Arc<dyn WarehouseClient>,
    audit: AuditLogService,
}

impl WarehouseAdminService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(client: Arc<dyn WarehouseClient>, audit: AuditLogService) -> Self {
        Self { client, audit }
    }

    /// Creates a warehouse from a validated spec. The declared function is
    /// recorded in the audit trail only; it is not part of the statement.
    pub async fn create_warehouse(
        &self,
        name: &SqlIdentifier,
        spec: &WarehouseSpec,
        function: WarehouseFunction,
    ) -> AppResult<()> {
        spec.validate()?;

        let sql = format!(
            "CREATE WAREHOUSE {name} WITH WAREHOUSE_SIZE = {} AUTO_SUSPEND = {} \
             AUTO_RESUME = {} MIN_CLUSTER_COUNT = {} MAX_CLUSTER_COUNT = {} \
             SCALING_POLICY = {}",
            spec.size.as_str(),
            spec.auto_suspend_seconds,
            if spec.auto_resume { "TRUE" } else { "FALSE" },
            spec.min_cluster_count,
            spec.max_cluster_count,
            spec.scaling_policy.as_str(),
        );

        match self.client.execute(Statement::new(sql.clone())).await {
            Ok(_) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::CreateWarehouse,
                            name.as_str(),
                            sql,
                            EventStatus::Success,
                        )
                        .with_message(format!(
                            "Created warehouse {name} with size {} and function {}",
                            spec.size.as_str(),
                            function.as_str(),
                        )),
                    )
                    .await;
                Ok(())
            }
            Err(error) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::CreateWarehouse,
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
