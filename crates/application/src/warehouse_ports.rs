use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grantline_core::{AppError, AppResult};

/// A scalar cell value moving between the service and the warehouse.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Timestamp value in UTC.
    Timestamp(DateTime<Utc>),
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Option<i64>> for ScalarValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Integer)
    }
}

/// One SQL statement plus its ordered bind values.
///
/// Placeholders use `?` in statement order. Everything user-supplied is a
/// bind; object identifiers are templated into the text only after passing
/// through [`grantline_core::SqlIdentifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    binds: Vec<ScalarValue>,
}

impl Statement {
    /// Creates a statement without binds.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            binds: Vec::new(),
        }
    }

    /// Appends one bind value in placeholder order.
    #[must_use]
    pub fn bind(mut self, value: impl Into<ScalarValue>) -> Self {
        self.binds.push(value.into());
        self
    }

    /// Returns the statement text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Returns the bind values in placeholder order.
    #[must_use]
    pub fn binds(&self) -> &[ScalarValue] {
        self.binds.as_slice()
    }
}

/// One result row, keyed by upper-cased column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, ScalarValue>,
}

impl Row {
    /// Builds a row from column/value pairs; column names are normalized to
    /// upper case so lookups match however the engine reports them.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, ScalarValue)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(column, value)| (column.to_ascii_uppercase(), value))
                .collect(),
        }
    }

    /// Returns the raw value of a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.values.get(column.to_ascii_uppercase().as_str())
    }

    fn required(&self, column: &str) -> AppResult<&ScalarValue> {
        self.get(column).ok_or_else(|| {
            AppError::Query(format!("column '{column}' missing from result row"))
        })
    }

    /// Reads a column as text; numbers and booleans are stringified.
    pub fn text(&self, column: &str) -> AppResult<String> {
        self.optional_text(column)?.ok_or_else(|| {
            AppError::Query(format!("column '{column}' was unexpectedly NULL"))
        })
    }

    /// Reads a nullable column as text.
    pub fn optional_text(&self, column: &str) -> AppResult<Option<String>> {
        match self.required(column)? {
            ScalarValue::Null => Ok(None),
            ScalarValue::Text(value) => Ok(Some(value.clone())),
            ScalarValue::Bool(value) => Ok(Some(value.to_string())),
            ScalarValue::Integer(value) => Ok(Some(value.to_string())),
            ScalarValue::Float(value) => Ok(Some(value.to_string())),
            ScalarValue::Timestamp(value) => Ok(Some(value.to_rfc3339())),
        }
    }

    /// Reads a column as an integer; numeric text is parsed.
    pub fn integer(&self, column: &str) -> AppResult<i64> {
        self.optional_integer(column)?.ok_or_else(|| {
            AppError::Query(format!("column '{column}' was unexpectedly NULL"))
        })
    }

    /// Reads a nullable column as an integer.
    pub fn optional_integer(&self, column: &str) -> AppResult<Option<i64>> {
        match self.required(column)? {
            ScalarValue::Null => Ok(None),
            ScalarValue::Integer(value) => Ok(Some(*value)),
            ScalarValue::Text(value) => value.trim().parse::<i64>().map(Some).map_err(|_| {
                AppError::Query(format!("column '{column}' is not an integer: '{value}'"))
            }),
            other => Err(AppError::Query(format!(
                "column '{column}' is not an integer: {other:?}"
            ))),
        }
    }

    /// Reads a column as a float; integers and numeric text widen.
    pub fn float(&self, column: &str) -> AppResult<f64> {
        match self.required(column)? {
            ScalarValue::Float(value) => Ok(*value),
            #[allow(clippy::cast_precision_loss)]
            ScalarValue::Integer(value) => Ok(*value as f64),
            ScalarValue::Text(value) => value.trim().parse::<f64>().map_err(|_| {
                AppError::Query(format!("column '{column}' is not a number: '{value}'"))
            }),
            other => Err(AppError::Query(format!(
                "column '{column}' is not a number: {other:?}"
            ))),
        }
    }

    /// Reads a column as a UTC timestamp; RFC 3339 text is parsed.
    pub fn timestamp(&self, column: &str) -> AppResult<DateTime<Utc>> {
        self.optional_timestamp(column)?.ok_or_else(|| {
            AppError::Query(format!("column '{column}' was unexpectedly NULL"))
        })
    }

    /// Reads a nullable column as a UTC timestamp.
    pub fn optional_timestamp(&self, column: &str) -> AppResult<Option<DateTime<Utc>>> {
        match self.required(column)? {
            ScalarValue::Null => Ok(None),
            ScalarValue::Timestamp(value) => Ok(Some(*value)),
            ScalarValue::Text(value) => DateTime::parse_from_rfc3339(value.as_str())
                .map(|parsed| Some(parsed.with_timezone(&Utc)))
                .map_err(|_| {
                    AppError::Query(format!(
                        "column '{column}' is not a timestamp: '{value}'"
                    ))
                }),
            other => Err(AppError::Query(format!(
                "column '{column}' is not a timestamp: {other:?}"
            ))),
        }
    }
}

/// Port for submitting statements to the warehouse engine.
///
/// The engine owns all hard work: grant storage, role resolution, metering.
/// Callers assemble one statement, wait for its rows, and never hold state
/// beyond the current request.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Executes one statement and returns its rows in engine order.
    async fn execute(&self, statement: Statement) -> AppResult<Vec<Row>>;
}

/// Port for the warehouse's server-side sequence counters.
///
/// Values are unique and strictly increasing per sequence, even under
/// concurrent callers; a value fetched for a write that later fails is
/// consumed, not returned.
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    /// Fetches the next value of the named sequence.
    async fn next_value(&self, sequence: &str) -> AppResult<i64>;
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Row, ScalarValue, Statement};

    #[test]
    fn statement_keeps_binds_in_order() {
        let statement = Statement::new("SELECT ? , ?").bind(1_i64).bind("two");

        assert_eq!(
            statement.binds(),
            &[ScalarValue::Integer(1), ScalarValue::Text("two".to_owned())]
        );
    }

    #[test]
    fn optional_i64_binds_null() {
        let statement = Statement::new("INSERT ?").bind(None::<i64>);
        assert_eq!(statement.binds(), &[ScalarValue::Null]);
    }

    #[test]
    fn row_lookup_is_case_insensitive() {
        let row = Row::from_pairs([("name".to_owned(), ScalarValue::Text("X".to_owned()))]);
        assert_eq!(row.text("NAME").ok(), Some("X".to_owned()));
        assert_eq!(row.text("name").ok(), Some("X".to_owned()));
    }

    #[test]
    fn row_accessors_coerce_numeric_text() {
        let row = Row::from_pairs([
            ("ID".to_owned(), ScalarValue::Text("42".to_owned())),
            ("CREDITS".to_owned(), ScalarValue::Integer(3)),
        ]);

        assert_eq!(row.integer("ID").ok(), Some(42));
        assert_eq!(row.float("CREDITS").ok(), Some(3.0));
    }

    #[test]
    fn row_timestamp_parses_rfc3339_text() {
        let Some(expected) = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single() else {
            panic!("expected a valid timestamp");
        };
        let row = Row::from_pairs([(
            "EVENT_TIME".to_owned(),
            ScalarValue::Text("2024-05-01T12:00:00+00:00".to_owned()),
        )]);

        assert_eq!(row.timestamp("EVENT_TIME").ok(), Some(expected));
    }
}
