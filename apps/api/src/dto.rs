use chrono::{DateTime, Utc};
use grantline_application::{
    AuditLogEntry, DatabaseStorageRow, QueryCostRow, RoleHierarchyLogEntry,
    RoleMetadataRecord, WarehouseMeteringRow,
};
use grantline_core::{AppError, SessionIdentity};
use grantline_domain::{HierarchyEdge, NodePosition, RoleHierarchy, RoleHierarchyEntry};
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Generic message response for mutating actions.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// API representation of the warehouse session principal.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: String,
    pub role: String,
}

impl From<SessionIdentity> for SessionResponse {
    fn from(value: SessionIdentity) -> Self {
        Self {
            user: value.user().to_owned(),
            role: value.role().to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDatabaseRequest {
    pub name: String,
    pub clone_from: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DropDatabaseQuery {
    pub confirm: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    pub size: String,
    pub auto_suspend_seconds: Option<u16>,
    pub auto_resume: Option<bool>,
    pub min_cluster_count: Option<u8>,
    pub max_cluster_count: Option<u8>,
    pub scaling_policy: Option<String>,
    pub function: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub role_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleListRequest {
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GrantDatabaseAccessRequest {
    pub database: String,
    pub access_level: String,
}

#[derive(Debug, Deserialize)]
pub struct ProvisionEnvironmentRoleRequest {
    pub environment: String,
    pub base_role: String,
    pub role_type: String,
    pub database: String,
    pub access_level: String,
    pub parent_role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertRoleMetadataRequest {
    pub role_name: String,
    pub role_type: String,
    pub function_name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleMetadataResponse {
    pub role_name: String,
    pub role_type: String,
    pub function_name: Option<String>,
    pub description: String,
    pub owner: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RoleMetadataRecord> for RoleMetadataResponse {
    fn from(value: RoleMetadataRecord) -> Self {
        Self {
            role_name: value.role_name,
            role_type: value.role_type,
            function_name: value.function_name,
            description: value.description,
            owner: value.owner,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQueryParams {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Comma-separated action tags.
    pub event_types: Option<String>,
    pub object_name: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogEntryResponse {
    pub event_id: i64,
    pub event_time: String,
    pub invoked_by_user: String,
    pub invoked_by_role: String,
    pub event_type: String,
    pub object_name: String,
    pub sql_command: String,
    pub status: String,
    pub message: String,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            event_time: value.event_time.to_rfc3339(),
            invoked_by_user: value.invoked_by_user,
            invoked_by_role: value.invoked_by_role,
            event_type: value.event_type,
            object_name: value.object_name,
            sql_command: value.sql_command,
            status: value.status,
            message: value.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HierarchyLogQueryParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RoleHierarchyLogEntryResponse {
    pub log_id: i64,
    pub event_time: String,
    pub audit_event_id: Option<i64>,
    pub invoked_by: String,
    pub environment_name: String,
    pub created_role_name: String,
    pub created_role_type: String,
    pub mapped_database_role: String,
    pub parent_account_role: String,
    pub sql_command_create_role: String,
    pub sql_command_grant_db_role: String,
    pub sql_command_grant_ownership: String,
    pub status: String,
    pub message: String,
}

impl From<RoleHierarchyLogEntry> for RoleHierarchyLogEntryResponse {
    fn from(value: RoleHierarchyLogEntry) -> Self {
        Self {
            log_id: value.log_id,
            event_time: value.event_time.to_rfc3339(),
            audit_event_id: value.audit_event_id,
            invoked_by: value.invoked_by,
            environment_name: value.environment_name,
            created_role_name: value.created_role_name,
            created_role_type: value.created_role_type,
            mapped_database_role: value.mapped_database_role,
            parent_account_role: value.parent_account_role,
            sql_command_create_role: value.sql_command_create_role,
            sql_command_grant_db_role: value.sql_command_grant_db_role,
            sql_command_grant_ownership: value.sql_command_grant_ownership,
            status: value.status,
            message: value.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HierarchyEntryResponse {
    pub role: String,
    pub granted_roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HierarchyEdgeResponse {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Serialize)]
pub struct NodePositionResponse {
    pub role: String,
    pub x: usize,
    pub y: usize,
}

/// The grant graph plus its tabular and plotted projections.
#[derive(Debug, Serialize)]
pub struct HierarchyResponse {
    pub entries: Vec<HierarchyEntryResponse>,
    pub edges: Vec<HierarchyEdgeResponse>,
    pub positions: Vec<NodePositionResponse>,
}

impl From<RoleHierarchy> for HierarchyResponse {
    fn from(value: RoleHierarchy) -> Self {
        let edges = value
            .edges()
            .into_iter()
            .map(|HierarchyEdge { parent, child }| HierarchyEdgeResponse { parent, child })
            .collect();
        let positions = value
            .layout()
            .into_iter()
            .map(|NodePosition { role, x, y }| NodePositionResponse { role, x, y })
            .collect();
        let entries = value
            .entries()
            .iter()
            .map(|RoleHierarchyEntry { role, granted_roles }| HierarchyEntryResponse {
                role: role.clone(),
                granted_roles: granted_roles.clone(),
            })
            .collect();

        Self {
            entries,
            edges,
            positions,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UsageWindowParams {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct WarehouseMeteringResponse {
    pub warehouse_name: String,
    pub hour: String,
    pub credits_used: f64,
    pub compute_credits: f64,
    pub cloud_services_credits: f64,
}

impl From<WarehouseMeteringRow> for WarehouseMeteringResponse {
    fn from(value: WarehouseMeteringRow) -> Self {
        Self {
            warehouse_name: value.warehouse_name,
            hour: value.hour.to_rfc3339(),
            credits_used: value.credits_used,
            compute_credits: value.compute_credits,
            cloud_services_credits: value.cloud_services_credits,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DatabaseStorageResponse {
    pub database_name: String,
    pub day: String,
    pub storage_bytes: f64,
    pub failsafe_bytes: f64,
}

impl From<DatabaseStorageRow> for DatabaseStorageResponse {
    fn from(value: DatabaseStorageRow) -> Self {
        Self {
            database_name: value.database_name,
            day: value.day.to_rfc3339(),
            storage_bytes: value.storage_bytes,
            failsafe_bytes: value.failsafe_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryCostResponse {
    pub warehouse_name: String,
    pub query_count: i64,
    pub total_elapsed_seconds: f64,
}

impl From<QueryCostRow> for QueryCostResponse {
    fn from(value: QueryCostRow) -> Self {
        Self {
            warehouse_name: value.warehouse_name,
            query_count: value.query_count,
            total_elapsed_seconds: value.total_elapsed_seconds,
        }
    }
}

/// Parses an RFC 3339 query-string timestamp.
pub fn parse_timestamp(name: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
}
