use super::*;

use std::str::FromStr;

use grantline_application::RoleMetadataDraft;
use grantline_domain::RoleType;

pub async fn list_role_metadata_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<dto::RoleMetadataResponse>>> {
    let records = state
        .metadata
        .list_role_metadata()
        .await?
        .into_iter()
        .map(dto::RoleMetadataResponse::from)
        .collect();

    Ok(Json(records))
}

pub async fn upsert_role_metadata_handler(
    State(state): State<AppState>,
    Json(request): Json<dto::UpsertRoleMetadataRequest>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let role_name = request.role_name.clone();
    state
        .metadata
        .upsert_role_metadata(RoleMetadataDraft {
            role_name: request.role_name,
            role_type: RoleType::from_str(request.role_type.as_str())?,
            function_name: request.function_name,
            description: request.description.unwrap_or_default(),
            owner: request.owner.unwrap_or_default(),
        })
        .await?;

    Ok(Json(dto::MessageResponse {
        message: format!("metadata updated for role {role_name}"),
    }))
}

pub async fn list_function_names_handler(
    State(state): State<AppState>,
    Path(role_type): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let role_type = RoleType::from_str(role_type.as_str())?;
    Ok(Json(state.catalog.list_function_names(role_type).await?))
}

pub async fn list_environments_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.list_environments().await?))
}
