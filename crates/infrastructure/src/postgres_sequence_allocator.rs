use async_trait::async_trait;
use sqlx::PgPool;

use grantline_application::SequenceAllocator;
use grantline_core::{AppError, AppResult};

/// Allocator over PostgreSQL sequences, paired with
/// [`crate::PostgresWarehouseClient`] in development setups.
#[derive(Clone)]
pub struct PostgresSequenceAllocator {
    pool: PgPool,
}

impl PostgresSequenceAllocator {
    /// Creates an allocator with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceAllocator for PostgresSequenceAllocator {
    async fn next_value(&self, sequence: &str) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT nextval($1::regclass)")
            .bind(sequence)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Allocation(format!("sequence '{sequence}' failed: {error}"))
            })
    }
}
