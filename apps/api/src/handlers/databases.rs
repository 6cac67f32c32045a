use super::*;

use grantline_core::SqlIdentifier;

pub async fn list_databases_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.list_databases().await?))
}

pub async fn create_database_handler(
    State(state): State<AppState>,
    Json(request): Json<dto::CreateDatabaseRequest>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let name = SqlIdentifier::new(request.name)?;
    let clone_from = request
        .clone_from
        .map(SqlIdentifier::new)
        .transpose()?;

    state
        .databases
        .create_database(&name, clone_from.as_ref())
        .await?;

    Ok(Json(dto::MessageResponse {
        message: format!("database {name} created"),
    }))
}

pub async fn drop_database_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<dto::DropDatabaseQuery>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let name = SqlIdentifier::new(name)?;

    state
        .databases
        .drop_database(&name, query.confirm.unwrap_or(false))
        .await?;

    Ok(Json(dto::MessageResponse {
        message: format!("database {name} dropped"),
    }))
}
