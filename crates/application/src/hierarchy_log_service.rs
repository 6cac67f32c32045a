use std::sync::Arc;

use grantline_core::AppResult;
use tracing::warn;

use crate::audit_ports::LogOutcome;
use crate::control_schema::ControlSchema;
use crate::hierarchy_ports::{RoleHierarchyEventDraft, RoleHierarchyLogEntry};
use crate::warehouse_ports::{SequenceAllocator, Statement, WarehouseClient};

const LIST_LIMIT_MAX: usize = 1_000;
const LIST_LIMIT_DEFAULT: usize = 200;

/// Writer and reader for the append-only role-provisioning log.
///
/// Same best-effort contract as the audit trail: failures are warnings and
/// never reach the caller of the provisioning action. Rows cross-reference
/// the audit trail through a nullable event id.
#[derive(Clone)]
pub struct RoleHierarchyLogService {
    client: Arc<dyn WarehouseClient>,
    allocator: Arc<dyn SequenceAllocator>,
    schema: ControlSchema,
}

impl RoleHierarchyLogService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        client: Arc<dyn WarehouseClient>,
        allocator: Arc<dyn SequenceAllocator>,
        schema: ControlSchema,
    ) -> Self {
        Self {
            client,
            allocator,
            schema,
        }
    }

    /// Appends one provisioning row and reports what actually happened.
    pub async fn record_provisioning(&self, draft: RoleHierarchyEventDraft) -> LogOutcome {
        let log_id = match self
            .allocator
            .next_value(self.schema.role_hierarchy_log_sequence().as_str())
            .await
        {
            Ok(log_id) => log_id,
            Err(error) => {
                warn!(
                    created_role = draft.created_role_name.as_str(),
                    %error,
                    "role hierarchy logging skipped: no log id allocated"
                );
                return LogOutcome::AllocationFailed;
            }
        };

        let statement = Statement::new(format!(
            "INSERT INTO {} (LOG_ID, EVENT_TIME, AUDIT_EVENT_ID, INVOKED_BY, \
             ENVIRONMENT_NAME, CREATED_ROLE_NAME, CREATED_ROLE_TYPE, \
             MAPPED_DATABASE_ROLE, PARENT_ACCOUNT_ROLE, SQL_COMMAND_CREATE_ROLE, \
             SQL_COMMAND_GRANT_DB_ROLE, SQL_COMMAND_GRANT_OWNERSHIP, STATUS, MESSAGE) \
             VALUES (?, CURRENT_TIMESTAMP(), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.schema.role_hierarchy_log_table()
        ))
        .bind(log_id)
        .bind(draft.audit_event_id)
        .bind(draft.invoked_by)
        .bind(draft.environment_name)
        .bind(draft.created_role_name.clone())
        .bind(draft.created_role_type.as_str())
        .bind(draft.mapped_database_role)
        .bind(draft.parent_account_role)
        .bind(draft.sql_command_create_role)
        .bind(draft.sql_command_grant_db_role)
        .bind(draft.sql_command_grant_ownership)
        .bind(draft.status.as_str())
        .bind(draft.message);

        match self.client.execute(statement).await {
            Ok(_) => LogOutcome::Recorded { event_id: log_id },
            Err(error) => {
                warn!(
                    log_id,
                    created_role = draft.created_role_name.as_str(),
                    %error,
                    "role hierarchy row not persisted; log id is consumed"
                );
                LogOutcome::WriteFailed { event_id: log_id }
            }
        }
    }

    /// Returns the most recent provisioning rows, newest first.
    pub async fn list_recent(&self, limit: usize) -> AppResult<Vec<RoleHierarchyLogEntry>> {
        let limit = if limit == 0 {
            LIST_LIMIT_DEFAULT
        } else {
            limit.min(LIST_LIMIT_MAX)
        };

        let statement = Statement::new(format!(
            "SELECT LOG_ID, EVENT_TIME, AUDIT_EVENT_ID, INVOKED_BY, ENVIRONMENT_NAME, \
             CREATED_ROLE_NAME, CREATED_ROLE_TYPE, MAPPED_DATABASE_ROLE, \
             PARENT_ACCOUNT_ROLE, SQL_COMMAND_CREATE_ROLE, SQL_COMMAND_GRANT_DB_ROLE, \
             SQL_COMMAND_GRANT_OWNERSHIP, STATUS, MESSAGE FROM {} \
             ORDER BY LOG_ID DESC LIMIT ?",
            self.schema.role_hierarchy_log_table()
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX));

        let rows = self.client.execute(statement).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(RoleHierarchyLogEntry {
                log_id: row.integer("LOG_ID")?,
                event_time: row.timestamp("EVENT_TIME")?,
                audit_event_id: row.optional_integer("AUDIT_EVENT_ID")?,
                invoked_by: row.text("INVOKED_BY")?,
                environment_name: row.text("ENVIRONMENT_NAME")?,
                created_role_name: row.text("CREATED_ROLE_NAME")?,
                created_role_type: row.text("CREATED_ROLE_TYPE")?,
                mapped_database_role: row.text("MAPPED_DATABASE_ROLE")?,
                parent_account_role: row.text("PARENT_ACCOUNT_ROLE")?,
                sql_command_create_role: row
                    .optional_text("SQL_COMMAND_CREATE_ROLE")?
                    .unwrap_or_default(),
                sql_command_grant_db_role: row
                    .optional_text("SQL_COMMAND_GRANT_DB_ROLE")?
                    .unwrap_or_default(),
                sql_command_grant_ownership: row
                    .optional_text("SQL_COMMAND_GRANT_OWNERSHIP")?
                    .unwrap_or_default(),
                status: row.text("STATUS")?,
                message: row.optional_text("MESSAGE")?.unwrap_or_default(),
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use grantline_core::SqlIdentifier;
    use grantline_domain::{EventStatus, RoleType};

    use crate::audit_ports::LogOutcome;
    use crate::control_schema::ControlSchema;
    use crate::test_support::{FakeSequenceAllocator, FakeWarehouseClient};
    use crate::warehouse_ports::ScalarValue;

    use super::RoleHierarchyLogService;

    fn control_schema() -> ControlSchema {
        let Ok(database) = SqlIdentifier::new("SECURITY") else {
            panic!("expected a valid database identifier");
        };
        let Ok(schema) = SqlIdentifier::new("ACCESS_CONTROL") else {
            panic!("expected a valid schema identifier");
        };
        ControlSchema::new(database, schema)
    }

    fn draft(audit_event_id: Option<i64>) -> crate::RoleHierarchyEventDraft {
        crate::RoleHierarchyEventDraft {
            audit_event_id,
            invoked_by: "OPS".to_owned(),
            environment_name: "DEV".to_owned(),
            created_role_name: "REPORTING_FR_DEV".to_owned(),
            created_role_type: RoleType::Functional,
            mapped_database_role: "ANALYTICS.RO_AR".to_owned(),
            parent_account_role: "SYSADMIN".to_owned(),
            sql_command_create_role: "CREATE ROLE REPORTING_FR_DEV".to_owned(),
            sql_command_grant_db_role: "GRANT DATABASE ROLE ANALYTICS.RO_AR TO ROLE REPORTING_FR_DEV"
                .to_owned(),
            sql_command_grant_ownership:
                "GRANT OWNERSHIP ON ROLE REPORTING_FR_DEV TO ROLE SYSADMIN COPY CURRENT GRANTS"
                    .to_owned(),
            status: EventStatus::Success,
            message: String::new(),
        }
    }

    #[tokio::test]
    async fn missing_audit_reference_binds_null() {
        let client = Arc::new(FakeWarehouseClient::new());
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(0));
        let service = RoleHierarchyLogService::new(client.clone(), allocator, control_schema());

        let outcome = service.record_provisioning(draft(None)).await;

        assert!(outcome.is_recorded());
        let executed = client.executed().await;
        assert_eq!(executed[0].binds()[1], ScalarValue::Null);
    }

    #[tokio::test]
    async fn audit_reference_is_persisted_unchanged() {
        let client = Arc::new(FakeWarehouseClient::new());
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(0));
        let service = RoleHierarchyLogService::new(client.clone(), allocator, control_schema());

        let outcome = service.record_provisioning(draft(Some(4711))).await;

        assert_eq!(outcome, LogOutcome::Recorded { event_id: 1 });
        let executed = client.executed().await;
        assert_eq!(executed[0].binds()[1], ScalarValue::Integer(4711));
    }

    #[tokio::test]
    async fn allocation_failure_skips_the_insert_silently() {
        let client = Arc::new(FakeWarehouseClient::new());
        let allocator = Arc::new(FakeSequenceAllocator::failing());
        let service = RoleHierarchyLogService::new(client.clone(), allocator, control_schema());

        let outcome = service.record_provisioning(draft(None)).await;

        assert_eq!(outcome, LogOutcome::AllocationFailed);
        assert!(client.executed().await.is_empty());
    }

    #[tokio::test]
    async fn provisioning_log_uses_its_own_sequence() {
        let client = Arc::new(FakeWarehouseClient::new());
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(0));
        let service =
            RoleHierarchyLogService::new(client, allocator.clone(), control_schema());

        let _ = service.record_provisioning(draft(None)).await;

        assert_eq!(
            allocator.requested().await,
            vec!["SECURITY.ACCESS_CONTROL.SEQ_ROLE_HIERARCHY_LOG".to_owned()]
        );
    }
}
