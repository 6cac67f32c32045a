use grantline_application::{
    AuditLogService, CatalogService, DatabaseAdminService, HierarchyGraphService,
    MetadataService, RoleAdminService, RoleHierarchyLogService, SessionService,
    UsageService, WarehouseAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub session: SessionService,
    pub audit: AuditLogService,
    pub hierarchy_log: RoleHierarchyLogService,
    pub catalog: CatalogService,
    pub hierarchy_graph: HierarchyGraphService,
    pub databases: DatabaseAdminService,
    pub warehouses: WarehouseAdminService,
    pub roles: RoleAdminService,
    pub metadata: MetadataService,
    pub usage: UsageService,
}
