//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_warehouse_client;
mod in_memory_catalog_cache;
mod postgres_sequence_allocator;
mod postgres_warehouse_client;
mod warehouse_sequence_allocator;

pub use http_warehouse_client::HttpWarehouseClient;
pub use in_memory_catalog_cache::InMemoryCatalogCache;
pub use postgres_sequence_allocator::PostgresSequenceAllocator;
pub use postgres_warehouse_client::PostgresWarehouseClient;
pub use warehouse_sequence_allocator::WarehouseSequenceAllocator;
