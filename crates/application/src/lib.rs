//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_log_service;
mod audit_ports;
mod catalog_ports;
mod catalog_service;
mod control_schema;
mod database_admin_service;
mod hierarchy_graph_service;
mod hierarchy_log_service;
mod hierarchy_ports;
mod metadata_service;
mod role_admin_service;
mod session_service;
mod usage_service;
mod warehouse_admin_service;
mod warehouse_ports;

#[cfg(test)]
mod test_support;

pub use audit_log_service::AuditLogService;
pub use audit_ports::{AuditEventDraft, AuditLogEntry, AuditLogFilter, LogOutcome};
pub use catalog_ports::{
    CATALOG_TTL_SECONDS, CatalogCache, CatalogScope, METADATA_TTL_SECONDS,
};
pub use catalog_service::CatalogService;
pub use control_schema::ControlSchema;
pub use database_admin_service::DatabaseAdminService;
pub use hierarchy_graph_service::HierarchyGraphService;
pub use hierarchy_log_service::RoleHierarchyLogService;
pub use hierarchy_ports::{RoleHierarchyEventDraft, RoleHierarchyLogEntry};
pub use metadata_service::{MetadataService, RoleMetadataDraft, RoleMetadataRecord};
pub use role_admin_service::{ProvisionEnvironmentRoleInput, RoleAdminService};
pub use session_service::SessionService;
pub use usage_service::{
    DatabaseStorageRow, QueryCostRow, UsageService, UsageWindow, WarehouseMeteringRow,
};
pub use warehouse_admin_service::WarehouseAdminService;
pub use warehouse_ports::{Row, ScalarValue, SequenceAllocator, Statement, WarehouseClient};
