use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use url::Url;

use grantline_application::{Row, ScalarValue, Statement, WarehouseClient};
use grantline_core::{AppError, AppResult};

const STATEMENTS_PATH: &str = "api/v2/statements";

/// Warehouse client speaking the engine's SQL REST API.
///
/// One statement per request: the statement text plus positional bindings go
/// out as JSON, the row set comes back as stringly-typed cells described by
/// the result metadata. Statement failures surface as [`AppError::Query`]
/// with the engine's message.
pub struct HttpWarehouseClient {
    http: reqwest::Client,
    statements_url: Url,
    token: String,
}

impl HttpWarehouseClient {
    /// Creates a client against the warehouse account's API base URL.
    pub fn new(base_url: &Url, token: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build HTTP client: {error}"))
            })?;

        let statements_url = base_url.join(STATEMENTS_PATH).map_err(|error| {
            AppError::Internal(format!("invalid warehouse API base URL: {error}"))
        })?;

        Ok(Self {
            http,
            statements_url,
            token: token.into(),
        })
    }
}

#[async_trait]
impl WarehouseClient for HttpWarehouseClient {
    async fn execute(&self, statement: Statement) -> AppResult<Vec<Row>> {
        let body = json!({
            "statement": statement.text(),
            "bindings": bindings_payload(statement.binds()),
        });

        let response = self
            .http
            .post(self.statements_url.clone())
            .bearer_auth(self.token.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|error| AppError::Query(format!("statement request failed: {error}")))?;

        let status = response.status();
        let payload: StatementResponse = response.json().await.map_err(|error| {
            AppError::Query(format!("unreadable statement response: {error}"))
        })?;

        if !status.is_success() {
            let message = payload
                .message
                .unwrap_or_else(|| format!("statement rejected with HTTP {status}"));
            return Err(AppError::Query(message));
        }

        Ok(rows_from_response(&payload))
    }
}

/// Positional bindings, 1-based, in the API's `{type, value}` shape.
fn bindings_payload(binds: &[ScalarValue]) -> Value {
    let mut payload = Map::new();
    for (index, bind) in binds.iter().enumerate() {
        let (bind_type, value) = match bind {
            ScalarValue::Null => ("TEXT", Value::Null),
            ScalarValue::Bool(value) => ("BOOLEAN", Value::String(value.to_string())),
            ScalarValue::Integer(value) => ("FIXED", Value::String(value.to_string())),
            ScalarValue::Float(value) => ("REAL", Value::String(value.to_string())),
            ScalarValue::Text(value) => ("TEXT", Value::String(value.clone())),
            ScalarValue::Timestamp(value) => {
                ("TIMESTAMP_TZ", Value::String(value.to_rfc3339()))
            }
        };
        payload.insert(
            (index + 1).to_string(),
            json!({ "type": bind_type, "value": value }),
        );
    }

    Value::Object(payload)
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(rename = "resultSetMetaData")]
    result_set_meta_data: Option<ResultSetMetaData>,
    data: Option<Vec<Vec<Option<String>>>>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultSetMetaData {
    #[serde(rename = "rowType")]
    row_type: Vec<ColumnDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ColumnDescriptor {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
}

/// Decodes the stringly-typed result cells using the column metadata.
/// Cells that fail a typed parse fall back to text rather than failing the
/// whole row set.
fn rows_from_response(payload: &StatementResponse) -> Vec<Row> {
    let Some(meta) = payload.result_set_meta_data.as_ref() else {
        return Vec::new();
    };
    let Some(data) = payload.data.as_ref() else {
        return Vec::new();
    };

    data.iter()
        .map(|cells| {
            Row::from_pairs(meta.row_type.iter().zip(cells.iter()).map(
                |(descriptor, cell)| {
                    (descriptor.name.clone(), decode_cell(descriptor, cell.as_deref()))
                },
            ))
        })
        .collect()
}

fn decode_cell(descriptor: &ColumnDescriptor, cell: Option<&str>) -> ScalarValue {
    let Some(text) = cell else {
        return ScalarValue::Null;
    };

    match descriptor.column_type.to_ascii_lowercase().as_str() {
        "fixed" => text
            .parse::<i64>()
            .map(ScalarValue::Integer)
            .or_else(|_| text.parse::<f64>().map(ScalarValue::Float))
            .unwrap_or_else(|_| ScalarValue::Text(text.to_owned())),
        "real" => text
            .parse::<f64>()
            .map(ScalarValue::Float)
            .unwrap_or_else(|_| ScalarValue::Text(text.to_owned())),
        "boolean" => match text {
            "true" | "TRUE" | "1" => ScalarValue::Bool(true),
            "false" | "FALSE" | "0" => ScalarValue::Bool(false),
            other => ScalarValue::Text(other.to_owned()),
        },
        column_type if column_type.starts_with("timestamp") || column_type == "date" => {
            DateTime::parse_from_rfc3339(text)
                .map(|parsed| ScalarValue::Timestamp(parsed.with_timezone(&Utc)))
                .unwrap_or_else(|_| ScalarValue::Text(text.to_owned()))
        }
        _ => ScalarValue::Text(text.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use grantline_application::ScalarValue;
    use serde_json::json;

    use super::{StatementResponse, bindings_payload, rows_from_response};

    #[test]
    fn bindings_are_positional_and_one_based() {
        let payload = bindings_payload(&[
            ScalarValue::Integer(42),
            ScalarValue::Null,
            ScalarValue::Text("DB1".to_owned()),
        ]);

        assert_eq!(payload["1"]["type"], "FIXED");
        assert_eq!(payload["1"]["value"], "42");
        assert_eq!(payload["2"]["value"], serde_json::Value::Null);
        assert_eq!(payload["3"]["value"], "DB1");
    }

    #[test]
    fn result_cells_decode_by_column_metadata() {
        let body = json!({
            "resultSetMetaData": {
                "rowType": [
                    { "name": "EVENT_ID", "type": "fixed" },
                    { "name": "EVENT_TIME", "type": "timestamp_tz" },
                    { "name": "MESSAGE", "type": "text" },
                ],
            },
            "data": [
                ["42", "2024-06-01T08:30:00+00:00", null],
            ],
        });
        let Ok(payload) = serde_json::from_value::<StatementResponse>(body) else {
            panic!("expected a parsable response");
        };

        let rows = rows_from_response(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].integer("EVENT_ID").ok(), Some(42));
        assert!(rows[0].timestamp("EVENT_TIME").is_ok());
        assert_eq!(rows[0].get("MESSAGE"), Some(&ScalarValue::Null));
    }

    #[test]
    fn missing_result_set_means_no_rows() {
        let body = json!({ "message": "Statement executed successfully." });
        let Ok(payload) = serde_json::from_value::<StatementResponse>(body) else {
            panic!("expected a parsable response");
        };

        assert!(rows_from_response(&payload).is_empty());
    }

    #[test]
    fn unparsable_cells_fall_back_to_text() {
        let body = json!({
            "resultSetMetaData": {
                "rowType": [{ "name": "N", "type": "fixed" }],
            },
            "data": [["not-a-number"]],
        });
        let Ok(payload) = serde_json::from_value::<StatementResponse>(body) else {
            panic!("expected a parsable response");
        };

        let rows = rows_from_response(&payload);
        assert_eq!(
            rows[0].get("N"),
            Some(&ScalarValue::Text("not-a-number".to_owned()))
        );
    }
}
