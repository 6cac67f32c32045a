use std::sync::Arc;

use async_trait::async_trait;

use grantline_application::{SequenceAllocator, Statement, WarehouseClient};
use grantline_core::{AppError, AppResult};

/// Allocator backed by the warehouse's own sequence objects.
///
/// Delegates to the server-side atomic counter, so values are unique and
/// strictly increasing across concurrent callers with no client-side
/// coordination. An empty result or a failed statement is an
/// [`AppError::Allocation`]; ids fetched for writes that later fail are
/// consumed, never returned.
pub struct WarehouseSequenceAllocator {
    client: Arc<dyn WarehouseClient>,
}

impl WarehouseSequenceAllocator {
    /// Creates an allocator over the given client.
    #[must_use]
    pub fn new(client: Arc<dyn WarehouseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SequenceAllocator for WarehouseSequenceAllocator {
    async fn next_value(&self, sequence: &str) -> AppResult<i64> {
        let rows = self
            .client
            .execute(Statement::new(format!("SELECT {sequence}.NEXTVAL AS ID")))
            .await
            .map_err(|error| AppError::Allocation(error.to_string()))?;

        let row = rows.first().ok_or_else(|| {
            AppError::Allocation(format!("sequence '{sequence}' returned no rows"))
        })?;

        row.integer("ID")
            .map_err(|error| AppError::Allocation(error.to_string()))
    }
}
