use std::sync::Arc;

use chrono::{DateTime, Utc};
use grantline_core::{AppError, AppResult};
use grantline_domain::{AuditEventKind, EventStatus, RoleType};

use crate::audit_log_service::AuditLogService;
use crate::audit_ports::AuditEventDraft;
use crate::catalog_service::CatalogService;
use crate::control_schema::ControlSchema;
use crate::warehouse_ports::{ScalarValue, Statement, WarehouseClient};

/// Fields for one role-metadata upsert.
#[derive(Debug, Clone)]
pub struct RoleMetadataDraft {
    /// Role the metadata describes; matched as a value, any catalog name
    /// works.
    pub role_name: String,
    /// Functional/technical classification.
    pub role_type: RoleType,
    /// Registered function name, for functional roles.
    pub function_name: Option<String>,
    /// Free-text description.
    pub description: String,
    /// Responsible owner.
    pub owner: String,
}

/// One stored role-metadata row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMetadataRecord {
    /// Role the metadata describes.
    pub role_name: String,
    /// Stored role type value.
    pub role_type: String,
    /// Registered function name, when present.
    pub function_name: Option<String>,
    /// Free-text description.
    pub description: String,
    /// Responsible owner.
    pub owner: String,
    /// First write time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

/// Free-text metadata about managed roles, kept in the control schema.
#[derive(Clone)]
pub struct MetadataService {
    client: Arc<dyn WarehouseClient>,
    audit: AuditLogService,
    catalog: CatalogService,
    schema: ControlSchema,
}

impl MetadataService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        client: Arc<dyn WarehouseClient>,
        audit: AuditLogService,
        catalog: CatalogService,
        schema: ControlSchema,
    ) -> Self {
        Self {
            client,
            audit,
            catalog,
            schema,
        }
    }

    /// Inserts or updates the metadata row for one role.
    pub async fn upsert_role_metadata(&self, draft: RoleMetadataDraft) -> AppResult<()> {
        if draft.role_name.trim().is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }

        let table = self.catalog_table();
        let sql = format!(
            "MERGE INTO {table} AS target \
             USING (SELECT ? AS ROLE_NAME) AS source \
             ON target.ROLE_NAME = source.ROLE_NAME \
             WHEN MATCHED THEN UPDATE SET ROLE_TYPE = ?, FUNCTION_NAME = ?, \
             DESCRIPTION = ?, OWNER = ?, UPDATED_AT = CURRENT_TIMESTAMP() \
             WHEN NOT MATCHED THEN INSERT (ROLE_NAME, ROLE_TYPE, FUNCTION_NAME, \
             DESCRIPTION, OWNER, CREATED_AT, UPDATED_AT) \
             VALUES (source.ROLE_NAME, ?, ?, ?, ?, CURRENT_TIMESTAMP(), \
             CURRENT_TIMESTAMP())"
        );

        let function_bind: ScalarValue = draft
            .function_name
            .clone()
            .map_or(ScalarValue::Null, ScalarValue::Text);

        let statement = Statement::new(sql.clone())
            .bind(draft.role_name.clone())
            .bind(draft.role_type.as_str())
            .bind(function_bind.clone())
            .bind(draft.description.clone())
            .bind(draft.owner.clone())
            .bind(draft.role_type.as_str())
            .bind(function_bind)
            .bind(draft.description.clone())
            .bind(draft.owner.clone());

        match self.client.execute(statement).await {
            Ok(_) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::ManageMetadata,
                            draft.role_name.clone(),
                            sql,
                            EventStatus::Success,
                        )
                        .with_message(format!("Updated metadata for role {}", draft.role_name)),
                    )
                    .await;
                self.catalog.invalidate_function_names().await;
                Ok(())
            }
            Err(error) => {
                self.audit
                    .record_event(
                        AuditEventDraft::new(
                            AuditEventKind::ManageMetadata,
                            draft.role_name,
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

    /// Returns all metadata rows, ordered by role name.
    pub async fn list_role_metadata(&self) -> AppResult<Vec<RoleMetadataRecord>> {
        let statement = Statement::new(format!(
            "SELECT ROLE_NAME, ROLE_TYPE, FUNCTION_NAME, DESCRIPTION, OWNER, \
             CREATED_AT, UPDATED_AT FROM {} ORDER BY ROLE_NAME",
            self.catalog_table()
        ));

        let rows = self.client.execute(statement).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(RoleMetadataRecord {
                role_name: row.text("ROLE_NAME")?,
                role_type: row.text("ROLE_TYPE")?,
                function_name: row.optional_text("FUNCTION_NAME")?,
                description: row.optional_text("DESCRIPTION")?.unwrap_or_default(),
                owner: row.optional_text("OWNER")?.unwrap_or_default(),
                created_at: row.timestamp("CREATED_AT")?,
                updated_at: row.timestamp("UPDATED_AT")?,
            });
        }

        Ok(records)
    }

    fn catalog_table(&self) -> String {
        self.schema.role_metadata_table()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use grantline_core::{AppError, SqlIdentifier};
    use grantline_domain::RoleType;

    use crate::audit_log_service::AuditLogService;
    use crate::catalog_service::CatalogService;
    use crate::control_schema::ControlSchema;
    use crate::session_service::SessionService;
    use crate::test_support::{
        FakeCatalogCache, FakeSequenceAllocator, FakeWarehouseClient, row,
    };
    use crate::warehouse_ports::ScalarValue;

    use super::{MetadataService, RoleMetadataDraft};

    fn control_schema() -> ControlSchema {
        let Ok(database) = SqlIdentifier::new("SECURITY") else {
            panic!("expected a valid database identifier");
        };
        let Ok(schema) = SqlIdentifier::new("ACCESS_CONTROL") else {
            panic!("expected a valid schema identifier");
        };
        ControlSchema::new(database, schema)
    }

    fn service(client: Arc<FakeWarehouseClient>) -> MetadataService {
        let schema = control_schema();
        let audit = AuditLogService::new(
            client.clone(),
            Arc::new(FakeSequenceAllocator::starting_at(0)),
            SessionService::new(client.clone()),
            schema.clone(),
        );
        let catalog = CatalogService::new(
            client.clone(),
            Arc::new(FakeCatalogCache::new()),
            schema.clone(),
        );
        MetadataService::new(client, audit, catalog, schema)
    }

    fn draft() -> RoleMetadataDraft {
        RoleMetadataDraft {
            role_name: "REPORTING_FR".to_owned(),
            role_type: RoleType::Functional,
            function_name: Some("FINANCE".to_owned()),
            description: "Finance reporting access".to_owned(),
            owner: "data-platform".to_owned(),
        }
    }

    #[tokio::test]
    async fn upsert_binds_values_for_both_merge_branches() {
        let client = Arc::new(FakeWarehouseClient::new());
        let service = service(client.clone());

        let result = service.upsert_role_metadata(draft()).await;

        assert!(result.is_ok());
        let executed = client.executed().await;
        assert!(executed[0].text().starts_with(
            "MERGE INTO SECURITY.ACCESS_CONTROL.FUNCTIONAL_TECHNICAL_ROLE_METADATA"
        ));
        // role name + 4 update values + 4 insert values.
        assert_eq!(executed[0].binds().len(), 9);
        assert_eq!(
            executed[0].binds()[0],
            ScalarValue::Text("REPORTING_FR".to_owned())
        );
        assert_eq!(executed[0].binds()[1], executed[0].binds()[5]);
    }

    #[tokio::test]
    async fn empty_role_name_is_rejected_before_any_sql() {
        let client = Arc::new(FakeWarehouseClient::new());
        let service = service(client.clone());

        let result = service
            .upsert_role_metadata(RoleMetadataDraft {
                role_name: "  ".to_owned(),
                ..draft()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(client.executed().await.is_empty());
    }

    #[tokio::test]
    async fn listing_parses_stored_rows() {
        let client = Arc::new(FakeWarehouseClient::new());
        client
            .push_rows(vec![row(&[
                ("ROLE_NAME", ScalarValue::Text("REPORTING_FR".to_owned())),
                ("ROLE_TYPE", ScalarValue::Text("FUNCTIONAL".to_owned())),
                ("FUNCTION_NAME", ScalarValue::Null),
                ("DESCRIPTION", ScalarValue::Text("desc".to_owned())),
                ("OWNER", ScalarValue::Text("ops".to_owned())),
                (
                    "CREATED_AT",
                    ScalarValue::Text("2024-01-01T00:00:00+00:00".to_owned()),
                ),
                (
                    "UPDATED_AT",
                    ScalarValue::Text("2024-02-01T00:00:00+00:00".to_owned()),
                ),
            ])])
            .await;
        let service = service(client);

        let Ok(records) = service.list_role_metadata().await else {
            panic!("expected a listing");
        };

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].role_name, "REPORTING_FR");
        assert_eq!(records[0].function_name, None);
    }
}
