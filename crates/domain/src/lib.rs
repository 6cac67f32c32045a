//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod hierarchy;
mod role;
mod warehouse;

pub use audit::{AuditEventKind, EventStatus};
pub use hierarchy::{
    HierarchyEdge, NodePosition, RoleGrant, RoleHierarchy, RoleHierarchyEntry,
};
pub use role::{AccessLevel, RoleType, environment_role_name};
pub use warehouse::{
    AUTO_SUSPEND_MAX_SECONDS, CLUSTER_COUNT_MAX, ScalingPolicy, WarehouseFunction,
    WarehouseSize, WarehouseSpec,
};
