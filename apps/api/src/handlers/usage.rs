use super::*;

use grantline_application::UsageWindow;

fn window(params: &dto::UsageWindowParams) -> Result<UsageWindow, crate::error::ApiError> {
    let start = dto::parse_timestamp("start", params.start.as_str())?;
    let end = dto::parse_timestamp("end", params.end.as_str())?;
    Ok(UsageWindow::new(start, end)?)
}

pub async fn warehouse_metering_handler(
    State(state): State<AppState>,
    Query(params): Query<dto::UsageWindowParams>,
) -> ApiResult<Json<Vec<dto::WarehouseMeteringResponse>>> {
    let rows = state
        .usage
        .warehouse_metering(window(&params)?)
        .await?
        .into_iter()
        .map(dto::WarehouseMeteringResponse::from)
        .collect();

    Ok(Json(rows))
}

pub async fn database_storage_handler(
    State(state): State<AppState>,
    Query(params): Query<dto::UsageWindowParams>,
) -> ApiResult<Json<Vec<dto::DatabaseStorageResponse>>> {
    let rows = state
        .usage
        .database_storage(window(&params)?)
        .await?
        .into_iter()
        .map(dto::DatabaseStorageResponse::from)
        .collect();

    Ok(Json(rows))
}

pub async fn query_costs_handler(
    State(state): State<AppState>,
    Query(params): Query<dto::UsageWindowParams>,
) -> ApiResult<Json<Vec<dto::QueryCostResponse>>> {
    let rows = state
        .usage
        .query_costs(window(&params)?)
        .await?
        .into_iter()
        .map(dto::QueryCostResponse::from)
        .collect();

    Ok(Json(rows))
}
