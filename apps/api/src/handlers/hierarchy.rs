use super::*;

pub async fn hierarchy_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<dto::HierarchyResponse>> {
    let hierarchy = state.hierarchy_graph.build_hierarchy().await?;
    Ok(Json(dto::HierarchyResponse::from(hierarchy)))
}

pub async fn hierarchy_log_handler(
    State(state): State<AppState>,
    Query(query): Query<dto::HierarchyLogQueryParams>,
) -> ApiResult<Json<Vec<dto::RoleHierarchyLogEntryResponse>>> {
    let entries = state
        .hierarchy_log
        .list_recent(query.limit.unwrap_or(0))
        .await?
        .into_iter()
        .map(dto::RoleHierarchyLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
