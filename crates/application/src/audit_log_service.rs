use std::sync::Arc;

use grantline_core::AppResult;
use tracing::warn;

use crate::audit_ports::{AuditEventDraft, AuditLogEntry, AuditLogFilter, LogOutcome};
use crate::control_schema::ControlSchema;
use crate::session_service::SessionService;
use crate::warehouse_ports::{ScalarValue, SequenceAllocator, Statement, WarehouseClient};

const LIST_LIMIT_MAX: usize = 1_000;
const LIST_LIMIT_DEFAULT: usize = 200;

/// Writer and reader for the append-only audit trail.
///
/// Writes are best-effort and subordinate to the administrative action they
/// describe: `record_event` never fails the caller. Rows are immutable once
/// written; the service only appends and reads back.
#[derive(Clone)]
pub struct AuditLogService {
    client: Arc<dyn WarehouseClient>,
    allocator: Arc<dyn SequenceAllocator>,
    session: SessionService,
    schema: ControlSchema,
}

impl AuditLogService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        client: Arc<dyn WarehouseClient>,
        allocator: Arc<dyn SequenceAllocator>,
        session: SessionService,
        schema: ControlSchema,
    ) -> Self {
        Self {
            client,
            allocator,
            session,
            schema,
        }
    }

    /// Appends one audit row and reports what actually happened.
    ///
    /// A failed allocation skips the insert entirely; a failed insert burns
    /// the allocated id. Both are warnings, never errors: the primary action
    /// has already completed or failed on its own.
    pub async fn record_event(&self, draft: AuditEventDraft) -> LogOutcome {
        let identity = match draft.invoked_by {
            Some(identity) => identity,
            None => self.session.current_identity().await,
        };

        let event_id = match self
            .allocator
            .next_value(self.schema.audit_log_sequence().as_str())
            .await
        {
            Ok(event_id) => event_id,
            Err(error) => {
                warn!(
                    event_type = draft.kind.as_str(),
                    object_name = draft.object_name.as_str(),
                    %error,
                    "audit logging skipped: no event id allocated"
                );
                return LogOutcome::AllocationFailed;
            }
        };

        let statement = Statement::new(format!(
            "INSERT INTO {} (EVENT_ID, EVENT_TIME, INVOKED_BY, INVOKED_BY_ROLE, \
             EVENT_TYPE, OBJECT_NAME, SQL_COMMAND, STATUS, MESSAGE) \
             VALUES (?, CURRENT_TIMESTAMP(), ?, ?, ?, ?, ?, ?, ?)",
            self.schema.audit_log_table()
        ))
        .bind(event_id)
        .bind(identity.user())
        .bind(identity.role())
        .bind(draft.kind.as_str())
        .bind(draft.object_name)
        .bind(draft.sql_command)
        .bind(draft.status.as_str())
        .bind(draft.message);

        match self.client.execute(statement).await {
            Ok(_) => LogOutcome::Recorded { event_id },
            Err(error) => {
                warn!(
                    event_id,
                    event_type = draft.kind.as_str(),
                    %error,
                    "audit row not persisted; event id is consumed"
                );
                LogOutcome::WriteFailed { event_id }
            }
        }
    }

    /// Returns audit rows matching the filter, newest first.
    pub async fn list_events(&self, filter: AuditLogFilter) -> AppResult<Vec<AuditLogEntry>> {
        let mut text = format!(
            "SELECT EVENT_ID, EVENT_TIME, INVOKED_BY, INVOKED_BY_ROLE, EVENT_TYPE, \
             OBJECT_NAME, SQL_COMMAND, STATUS, MESSAGE FROM {} WHERE 1 = 1",
            self.schema.audit_log_table()
        );
        let mut statement_binds: Vec<ScalarValue> = Vec::new();

        if let Some(start_time) = filter.start_time {
            text.push_str(" AND EVENT_TIME >= ?");
            statement_binds.push(start_time.into());
        }
        if let Some(end_time) = filter.end_time {
            text.push_str(" AND EVENT_TIME <= ?");
            statement_binds.push(end_time.into());
        }
        if !filter.event_types.is_empty() {
            let placeholders = vec!["?"; filter.event_types.len()].join(", ");
            text.push_str(format!(" AND EVENT_TYPE IN ({placeholders})").as_str());
            for kind in &filter.event_types {
                statement_binds.push(kind.as_str().into());
            }
        }
        if let Some(object_name) = filter.object_name {
            text.push_str(" AND OBJECT_NAME = ?");
            statement_binds.push(object_name.into());
        }

        let limit = if filter.limit == 0 {
            LIST_LIMIT_DEFAULT
        } else {
            filter.limit.min(LIST_LIMIT_MAX)
        };
        text.push_str(" ORDER BY EVENT_TIME DESC LIMIT ?");
        statement_binds.push(i64::try_from(limit).unwrap_or(i64::MAX).into());

        let mut statement = Statement::new(text);
        for bind in statement_binds {
            statement = statement.bind(bind);
        }

        let rows = self.client.execute(statement).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(AuditLogEntry {
                event_id: row.integer("EVENT_ID")?,
                event_time: row.timestamp("EVENT_TIME")?,
                invoked_by_user: row.text("INVOKED_BY")?,
                invoked_by_role: row.text("INVOKED_BY_ROLE")?,
                event_type: row.text("EVENT_TYPE")?,
                object_name: row.text("OBJECT_NAME")?,
                sql_command: row.optional_text("SQL_COMMAND")?.unwrap_or_default(),
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

    use grantline_core::{AppError, SessionIdentity, SqlIdentifier};
    use grantline_domain::{AuditEventKind, EventStatus};

    use crate::audit_ports::{AuditEventDraft, AuditLogFilter, LogOutcome};
    use crate::control_schema::ControlSchema;
    use crate::session_service::SessionService;
    use crate::test_support::{FakeSequenceAllocator, FakeWarehouseClient, row};
    use crate::warehouse_ports::{ScalarValue, SequenceAllocator};

    use super::AuditLogService;

    fn control_schema() -> ControlSchema {
        let Ok(database) = SqlIdentifier::new("SECURITY") else {
            panic!("expected a valid database identifier");
        };
        let Ok(schema) = SqlIdentifier::new("ACCESS_CONTROL") else {
            panic!("expected a valid schema identifier");
        };
        ControlSchema::new(database, schema)
    }

    fn service(
        client: Arc<FakeWarehouseClient>,
        allocator: Arc<FakeSequenceAllocator>,
    ) -> AuditLogService {
        AuditLogService::new(
            client.clone(),
            allocator,
            SessionService::new(client),
            control_schema(),
        )
    }

    fn draft() -> AuditEventDraft {
        AuditEventDraft::new(
            AuditEventKind::CreateDatabase,
            "DB1",
            "CREATE DATABASE DB1",
            EventStatus::Success,
        )
        .with_identity(SessionIdentity::new("OPS", "SYSADMIN"))
    }

    #[tokio::test]
    async fn record_event_persists_one_row_with_fresh_id() {
        let client = Arc::new(FakeWarehouseClient::new());
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(100));
        let service = service(client.clone(), allocator.clone());

        let outcome = service.record_event(draft()).await;

        assert_eq!(outcome, LogOutcome::Recorded { event_id: 101 });

        let executed = client.executed().await;
        assert_eq!(executed.len(), 1);
        assert!(executed[0].text().starts_with("INSERT INTO SECURITY.ACCESS_CONTROL.AUDIT_LOG"));
        assert_eq!(executed[0].binds()[0], ScalarValue::Integer(101));
        assert_eq!(executed[0].binds()[4], ScalarValue::Text("DB1".to_owned()));
        assert_eq!(
            allocator.requested().await,
            vec!["SECURITY.ACCESS_CONTROL.SEQ_AUDIT_LOG".to_owned()]
        );
    }

    #[tokio::test]
    async fn record_event_never_errors_when_allocation_fails() {
        let client = Arc::new(FakeWarehouseClient::new());
        let allocator = Arc::new(FakeSequenceAllocator::failing());
        let service = service(client.clone(), allocator);

        let outcome = service.record_event(draft()).await;

        assert_eq!(outcome, LogOutcome::AllocationFailed);
        assert_eq!(outcome.event_id(), None);
        assert!(client.executed().await.is_empty());
    }

    #[tokio::test]
    async fn record_event_reports_burned_id_on_write_failure() {
        let client = Arc::new(FakeWarehouseClient::new());
        client
            .push_error(AppError::Query("insert rejected".to_owned()))
            .await;
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(7));
        let service = service(client, allocator);

        let outcome = service.record_event(draft()).await;

        assert_eq!(outcome, LogOutcome::WriteFailed { event_id: 8 });
        assert_eq!(outcome.event_id(), Some(8));
        assert!(!outcome.is_recorded());
    }

    #[tokio::test]
    async fn record_event_resolves_identity_when_not_supplied() {
        let client = Arc::new(FakeWarehouseClient::new());
        client
            .push_error(AppError::Query("session expired".to_owned()))
            .await;
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(0));
        let service = service(client.clone(), allocator);

        let anonymous = AuditEventDraft::new(
            AuditEventKind::CreateRole,
            "OPS_FR",
            "CREATE ROLE OPS_FR",
            EventStatus::Success,
        );
        let outcome = service.record_event(anonymous).await;

        assert!(outcome.is_recorded());

        let executed = client.executed().await;
        // First statement is the identity probe that failed; the insert
        // carries the sentinels.
        assert_eq!(executed.len(), 2);
        assert_eq!(
            executed[1].binds()[1],
            ScalarValue::Text("UNKNOWN_USER".to_owned())
        );
        assert_eq!(
            executed[1].binds()[2],
            ScalarValue::Text("UNKNOWN_ROLE".to_owned())
        );
    }

    #[tokio::test]
    async fn event_ids_are_strictly_increasing_across_writes() {
        let client = Arc::new(FakeWarehouseClient::new());
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(0));
        let service = service(client, allocator);

        let mut seen = Vec::new();
        for _ in 0..5 {
            if let Some(event_id) = service.record_event(draft()).await.event_id() {
                seen.push(event_id);
            }
        }

        assert_eq!(seen.len(), 5);
        assert!(seen.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[tokio::test]
    async fn concurrent_allocations_claim_each_value_once() {
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(100));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(async move {
                allocator.next_value("SEQ_AUDIT_LOG").await
            }));
        }

        let mut claimed = Vec::new();
        for handle in handles {
            let Ok(Ok(value)) = handle.await else {
                panic!("allocation task failed");
            };
            claimed.push(value);
        }

        claimed.sort_unstable();
        assert_eq!(claimed, vec![101, 102, 103]);
    }

    #[tokio::test]
    async fn list_events_binds_filters_and_parses_rows() {
        let client = Arc::new(FakeWarehouseClient::new());
        client
            .push_rows(vec![row(&[
                ("EVENT_ID", ScalarValue::Integer(42)),
                (
                    "EVENT_TIME",
                    ScalarValue::Text("2024-06-01T08:30:00+00:00".to_owned()),
                ),
                ("INVOKED_BY", ScalarValue::Text("OPS".to_owned())),
                ("INVOKED_BY_ROLE", ScalarValue::Text("SYSADMIN".to_owned())),
                ("EVENT_TYPE", ScalarValue::Text("CREATE_DATABASE".to_owned())),
                ("OBJECT_NAME", ScalarValue::Text("DB1".to_owned())),
                ("SQL_COMMAND", ScalarValue::Text("CREATE DATABASE DB1".to_owned())),
                ("STATUS", ScalarValue::Text("SUCCESS".to_owned())),
                ("MESSAGE", ScalarValue::Null),
            ])])
            .await;
        let allocator = Arc::new(FakeSequenceAllocator::starting_at(0));
        let service = service(client.clone(), allocator);

        let filter = AuditLogFilter {
            event_types: vec![AuditEventKind::CreateDatabase, AuditEventKind::DeleteDatabase],
            object_name: Some("DB1".to_owned()),
            ..AuditLogFilter::default()
        };
        let Ok(entries) = service.list_events(filter).await else {
            panic!("expected a listing");
        };

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_id, 42);
        assert_eq!(entries[0].object_name, "DB1");
        assert_eq!(entries[0].message, "");

        let executed = client.executed().await;
        assert!(executed[0].text().contains("EVENT_TYPE IN (?, ?)"));
        assert!(executed[0].text().ends_with("ORDER BY EVENT_TIME DESC LIMIT ?"));
        // Two event types, one object name, one limit.
        assert_eq!(executed[0].binds().len(), 4);
    }
}
