use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row as _};

use grantline_application::{Row, ScalarValue, Statement, WarehouseClient};
use grantline_core::{AppError, AppResult};

/// PostgreSQL-backed warehouse client for development and integration
/// testing.
///
/// Rewrites the port's `?` placeholders to `$n` and decodes whatever columns
/// a statement produces into scalar rows. Not used against the managed
/// warehouse itself; the [`crate::HttpWarehouseClient`] is.
#[derive(Clone)]
pub struct PostgresWarehouseClient {
    pool: PgPool,
}

impl PostgresWarehouseClient {
    /// Creates a client with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarehouseClient for PostgresWarehouseClient {
    async fn execute(&self, statement: Statement) -> AppResult<Vec<Row>> {
        let text = rewrite_placeholders(statement.text());

        let mut query = sqlx::query(text.as_str());
        for bind in statement.binds() {
            query = match bind {
                ScalarValue::Null => query.bind(Option::<String>::None),
                ScalarValue::Bool(value) => query.bind(*value),
                ScalarValue::Integer(value) => query.bind(*value),
                ScalarValue::Float(value) => query.bind(*value),
                ScalarValue::Text(value) => query.bind(value.clone()),
                ScalarValue::Timestamp(value) => query.bind(*value),
            };
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Query(format!("statement failed: {error}")))?;

        rows.iter().map(decode_row).collect()
    }
}

/// Turns `?` placeholders into `$1..$n`, leaving quoted literals alone.
fn rewrite_placeholders(text: &str) -> String {
    let mut rewritten = String::with_capacity(text.len() + 8);
    let mut placeholder = 0_usize;
    let mut in_literal = false;

    for ch in text.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                rewritten.push(ch);
            }
            '?' if !in_literal => {
                placeholder += 1;
                rewritten.push('$');
                rewritten.push_str(placeholder.to_string().as_str());
            }
            _ => rewritten.push(ch),
        }
    }

    rewritten
}

fn decode_row(row: &PgRow) -> AppResult<Row> {
    let mut pairs = Vec::with_capacity(row.columns().len());
    for (index, column) in row.columns().iter().enumerate() {
        pairs.push((column.name().to_owned(), decode_column(row, index)?));
    }

    Ok(Row::from_pairs(pairs))
}

/// Probes the handful of scalar decodings the admin statements produce.
fn decode_column(row: &PgRow, index: usize) -> AppResult<ScalarValue> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, ScalarValue::Integer));
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, |value| {
            ScalarValue::Integer(i64::from(value))
        }));
    }
    if let Ok(value) = row.try_get::<Option<i16>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, |value| {
            ScalarValue::Integer(i64::from(value))
        }));
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, ScalarValue::Float));
    }
    if let Ok(value) = row.try_get::<Option<f32>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, |value| {
            ScalarValue::Float(f64::from(value))
        }));
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, ScalarValue::Bool));
    }
    if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, ScalarValue::Timestamp));
    }
    if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, |value| {
            ScalarValue::Timestamp(value.and_utc())
        }));
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return Ok(value.map_or(ScalarValue::Null, ScalarValue::Text));
    }

    Err(AppError::Query(format!(
        "unsupported column type at index {index}"
    )))
}
