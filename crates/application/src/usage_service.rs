use std::sync::Arc;

use chrono::{DateTime, Utc};
use grantline_core::{AppError, AppResult};

use crate::control_schema::ControlSchema;
use crate::warehouse_ports::{Statement, WarehouseClient};

/// Inclusive time window for usage queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageWindow {
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
}

impl UsageWindow {
    /// Creates a validated window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if start > end {
            return Err(AppError::Validation(
                "usage window start is after its end".to_owned(),
            ));
        }

        Ok(Self { start, end })
    }
}

/// Hourly credit consumption for one warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseMeteringRow {
    /// Warehouse name.
    pub warehouse_name: String,
    /// Hour bucket.
    pub hour: DateTime<Utc>,
    /// Total credits consumed in the bucket.
    pub credits_used: f64,
    /// Compute share of the credits.
    pub compute_credits: f64,
    /// Cloud-services share of the credits.
    pub cloud_services_credits: f64,
}

/// Daily storage footprint for one database.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseStorageRow {
    /// Database name.
    pub database_name: String,
    /// Day bucket.
    pub day: DateTime<Utc>,
    /// Live storage bytes.
    pub storage_bytes: f64,
    /// Failsafe storage bytes.
    pub failsafe_bytes: f64,
}

/// Aggregate query activity for one warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCostRow {
    /// Warehouse name.
    pub warehouse_name: String,
    /// Number of queries in the window.
    pub query_count: i64,
    /// Total elapsed execution time, in seconds.
    pub total_elapsed_seconds: f64,
}

/// Read-only billing/usage metrics from the account-usage views.
#[derive(Clone)]
pub struct UsageService {
    client: Arc<dyn WarehouseClient>,
    schema: ControlSchema,
}

impl UsageService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(client: Arc<dyn WarehouseClient>, schema: ControlSchema) -> Self {
        Self { client, schema }
    }

    /// Hourly warehouse credit consumption inside the window.
    pub async fn warehouse_metering(
        &self,
        window: UsageWindow,
    ) -> AppResult<Vec<WarehouseMeteringRow>> {
        let statement = Statement::new(format!(
            "SELECT WAREHOUSE_NAME, DATE_TRUNC('HOUR', START_TIME) AS USAGE_HOUR, \
             SUM(CREDITS_USED) AS CREDITS_USED, \
             SUM(CREDITS_USED_COMPUTE) AS COMPUTE_CREDITS, \
             SUM(CREDITS_USED_CLOUD_SERVICES) AS CLOUD_SERVICES_CREDITS \
             FROM {} WHERE START_TIME >= ? AND START_TIME <= ? \
             GROUP BY WAREHOUSE_NAME, USAGE_HOUR ORDER BY USAGE_HOUR DESC",
            self.schema.usage_view("WAREHOUSE_METERING_HISTORY")
        ))
        .bind(window.start)
        .bind(window.end);

        let rows = self.client.execute(statement).await?;
        let mut metering = Vec::with_capacity(rows.len());
        for row in rows {
            metering.push(WarehouseMeteringRow {
                warehouse_name: row.text("WAREHOUSE_NAME")?,
                hour: row.timestamp("USAGE_HOUR")?,
                credits_used: row.float("CREDITS_USED")?,
                compute_credits: row.float("COMPUTE_CREDITS")?,
                cloud_services_credits: row.float("CLOUD_SERVICES_CREDITS")?,
            });
        }

        Ok(metering)
    }

    /// Daily database storage footprint inside the window.
    pub async fn database_storage(
        &self,
        window: UsageWindow,
    ) -> AppResult<Vec<DatabaseStorageRow>> {
        let statement = Statement::new(format!(
            "SELECT DATABASE_NAME, DATE_TRUNC('DAY', USAGE_DATE) AS USAGE_DAY, \
             SUM(AVERAGE_DATABASE_BYTES) AS STORAGE_BYTES, \
             SUM(AVERAGE_FAILSAFE_BYTES) AS FAILSAFE_BYTES \
             FROM {} WHERE USAGE_DATE >= ? AND USAGE_DATE <= ? \
             GROUP BY DATABASE_NAME, USAGE_DAY ORDER BY USAGE_DAY DESC",
            self.schema.usage_view("DATABASE_STORAGE_USAGE_HISTORY")
        ))
        .bind(window.start)
        .bind(window.end);

        let rows = self.client.execute(statement).await?;
        let mut storage = Vec::with_capacity(rows.len());
        for row in rows {
            storage.push(DatabaseStorageRow {
                database_name: row.text("DATABASE_NAME")?,
                day: row.timestamp("USAGE_DAY")?,
                storage_bytes: row.float("STORAGE_BYTES")?,
                failsafe_bytes: row.float("FAILSAFE_BYTES")?,
            });
        }

        Ok(storage)
    }

    /// Aggregate query activity per warehouse inside the window.
    pub async fn query_costs(&self, window: UsageWindow) -> AppResult<Vec<QueryCostRow>> {
        let statement = Statement::new(format!(
            "SELECT WAREHOUSE_NAME, COUNT(*) AS QUERY_COUNT, \
             SUM(TOTAL_ELAPSED_TIME) / 1000 AS TOTAL_ELAPSED_SECONDS \
             FROM {} WHERE START_TIME >= ? AND START_TIME <= ? \
             AND WAREHOUSE_NAME IS NOT NULL \
             GROUP BY WAREHOUSE_NAME ORDER BY QUERY_COUNT DESC",
            self.schema.usage_view("QUERY_HISTORY")
        ))
        .bind(window.start)
        .bind(window.end);

        let rows = self.client.execute(statement).await?;
        let mut costs = Vec::with_capacity(rows.len());
        for row in rows {
            costs.push(QueryCostRow {
                warehouse_name: row.text("WAREHOUSE_NAME")?,
                query_count: row.integer("QUERY_COUNT")?,
                total_elapsed_seconds: row.float("TOTAL_ELAPSED_SECONDS")?,
            });
        }

        Ok(costs)
    }
}
