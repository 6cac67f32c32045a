use super::*;

pub async fn health_handler() -> Json<dto::HealthResponse> {
    Json(dto::HealthResponse { status: "ok" })
}

pub async fn session_handler(
    State(state): State<AppState>,
) -> Json<dto::SessionResponse> {
    Json(dto::SessionResponse::from(
        state.session.current_identity().await,
    ))
}
