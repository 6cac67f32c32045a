use super::*;

use std::str::FromStr;

use grantline_application::ProvisionEnvironmentRoleInput;
use grantline_core::{AppResult, SqlIdentifier};
use grantline_domain::{AccessLevel, RoleType};

fn identifiers(names: Vec<String>) -> AppResult<Vec<SqlIdentifier>> {
    names.into_iter().map(SqlIdentifier::new).collect()
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.list_roles().await?))
}

pub async fn list_functional_technical_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.list_functional_technical_roles().await?))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Json(request): Json<dto::CreateRoleRequest>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let name = SqlIdentifier::new(request.name)?;
    let role_type = RoleType::from_str(request.role_type.as_str())?;

    state.roles.create_role(&name, role_type).await?;

    Ok(Json(dto::MessageResponse {
        message: format!("role {name} created"),
    }))
}

pub async fn grant_roles_handler(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Json(request): Json<dto::RoleListRequest>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let target = SqlIdentifier::new(target)?;
    let roles = identifiers(request.roles)?;

    state.roles.grant_roles(&target, roles.as_slice()).await?;

    Ok(Json(dto::MessageResponse {
        message: format!("granted {} role(s) to {target}", roles.len()),
    }))
}

pub async fn revoke_roles_handler(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Json(request): Json<dto::RoleListRequest>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let target = SqlIdentifier::new(target)?;
    let roles = identifiers(request.roles)?;

    state.roles.revoke_roles(&target, roles.as_slice()).await?;

    Ok(Json(dto::MessageResponse {
        message: format!("revoked {} role(s) from {target}", roles.len()),
    }))
}

pub async fn grant_database_access_handler(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Json(request): Json<dto::GrantDatabaseAccessRequest>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let target = SqlIdentifier::new(target)?;
    let database = SqlIdentifier::new(request.database)?;
    let level = AccessLevel::from_str(request.access_level.as_str())?;

    state
        .roles
        .grant_database_access(&database, &target, level)
        .await?;

    Ok(Json(dto::MessageResponse {
        message: format!("granted {} on {database} to {target}", level.description()),
    }))
}

pub async fn provision_environment_role_handler(
    State(state): State<AppState>,
    Json(request): Json<dto::ProvisionEnvironmentRoleRequest>,
) -> ApiResult<Json<dto::MessageResponse>> {
    let input = ProvisionEnvironmentRoleInput {
        environment: SqlIdentifier::new(request.environment)?,
        base_role: SqlIdentifier::new(request.base_role)?,
        role_type: RoleType::from_str(request.role_type.as_str())?,
        database: SqlIdentifier::new(request.database)?,
        access_level: AccessLevel::from_str(request.access_level.as_str())?,
        parent_role: SqlIdentifier::new(request.parent_role)?,
    };

    let env_role = state.roles.provision_environment_role(input).await?;

    Ok(Json(dto::MessageResponse {
        message: format!("environment role {env_role} provisioned"),
    }))
}
