use super::*;

use std::str::FromStr;

use grantline_application::AuditLogFilter;
use grantline_domain::AuditEventKind;

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Query(query): Query<dto::AuditLogQueryParams>,
) -> ApiResult<Json<Vec<dto::AuditLogEntryResponse>>> {
    let start_time = query
        .start_time
        .as_deref()
        .map(|value| dto::parse_timestamp("start_time", value))
        .transpose()?;
    let end_time = query
        .end_time
        .as_deref()
        .map(|value| dto::parse_timestamp("end_time", value))
        .transpose()?;

    let mut event_types = Vec::new();
    if let Some(tags) = query.event_types.as_deref() {
        for tag in tags.split(',').filter(|tag| !tag.trim().is_empty()) {
            event_types.push(AuditEventKind::from_str(tag.trim())?);
        }
    }

    let entries = state
        .audit
        .list_events(AuditLogFilter {
            start_time,
            end_time,
            event_types,
            object_name: query.object_name,
            limit: query.limit.unwrap_or(0),
        })
        .await?
        .into_iter()
        .map(dto::AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
