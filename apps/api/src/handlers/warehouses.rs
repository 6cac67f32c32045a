use super::*;

use std::str::FromStr;

use grantline_core::SqlIdentifier;
use grantline_domain::{ScalingPolicy, WarehouseFunction, WarehouseSize, WarehouseSpec};

pub async fn create_warehouse_handler(
    State(state): State<AppState>,
    Json(request): Json<dto::CreateWarehouseRequest>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let name = SqlIdentifier::new(request.name)?;
    let defaults = WarehouseSpec::default();

    let spec = WarehouseSpec {
        size: WarehouseSize::from_str(request.size.as_str())?,
        auto_suspend_seconds: request
            .auto_suspend_seconds
            .unwrap_or(defaults.auto_suspend_seconds),
        auto_resume: request.auto_resume.unwrap_or(defaults.auto_resume),
        min_cluster_count: request
            .min_cluster_count
            .unwrap_or(defaults.min_cluster_count),
        max_cluster_count: request
            .max_cluster_count
            .unwrap_or(defaults.max_cluster_count),
        scaling_policy: match request.scaling_policy {
            Some(policy) => ScalingPolicy::from_str(policy.as_str())?,
            None => defaults.scaling_policy,
        },
    };
    let function = match request.function {
        Some(function) => WarehouseFunction::from_str(function.as_str())?,
        None => WarehouseFunction::Gen,
    };

    state.warehouses.create_warehouse(&name, &spec, function).await?;

    Ok(Json(dto::MessageResponse {
        message: format!("warehouse {name} created"),
    }))
}
