//! Shared fakes for service tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use grantline_core::{AppError, AppResult};
use grantline_domain::RoleGrant;
use tokio::sync::Mutex;

use crate::catalog_ports::{CatalogCache, CatalogScope};
use crate::warehouse_ports::{Row, ScalarValue, SequenceAllocator, Statement, WarehouseClient};

/// Builds a row from column/value pairs.
pub(crate) fn row(pairs: &[(&str, ScalarValue)]) -> Row {
    Row::from_pairs(
        pairs
            .iter()
            .map(|(column, value)| ((*column).to_owned(), value.clone())),
    )
}

/// Scripted warehouse client: queued results pop in execution order, and
/// every executed statement is recorded. An empty queue answers with an
/// empty row set.
#[derive(Default)]
pub(crate) struct FakeWarehouseClient {
    results: Mutex<VecDeque<AppResult<Vec<Row>>>>,
    executed: Mutex<Vec<Statement>>,
}

impl FakeWarehouseClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn push_rows(&self, rows: Vec<Row>) {
        self.results.lock().await.push_back(Ok(rows));
    }

    pub(crate) async fn push_error(&self, error: AppError) {
        self.results.lock().await.push_back(Err(error));
    }

    pub(crate) async fn executed(&self) -> Vec<Statement> {
        self.executed.lock().await.clone()
    }
}

#[async_trait]
impl WarehouseClient for FakeWarehouseClient {
    async fn execute(&self, statement: Statement) -> AppResult<Vec<Row>> {
        self.executed.lock().await.push(statement);
        self.results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Counting allocator starting above `start`; flips to failing when asked.
pub(crate) struct FakeSequenceAllocator {
    next: AtomicI64,
    failing: AtomicBool,
    requested: Mutex<Vec<String>>,
}

impl FakeSequenceAllocator {
    pub(crate) fn starting_at(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
            failing: AtomicBool::new(false),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        let allocator = Self::starting_at(0);
        allocator.failing.store(true, Ordering::SeqCst);
        allocator
    }

    pub(crate) async fn requested(&self) -> Vec<String> {
        self.requested.lock().await.clone()
    }
}

#[async_trait]
impl SequenceAllocator for FakeSequenceAllocator {
    async fn next_value(&self, sequence: &str) -> AppResult<i64> {
        self.requested.lock().await.push(sequence.to_owned());
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Allocation("sequence returned no rows".to_owned()));
        }

        Ok(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Map-backed cache; TTLs are accepted and ignored.
#[derive(Default)]
pub(crate) struct FakeCatalogCache {
    names: Mutex<HashMap<CatalogScope, Vec<String>>>,
    grants: Mutex<HashMap<String, Vec<RoleGrant>>>,
}

impl FakeCatalogCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn seed_names(&self, scope: CatalogScope, names: Vec<String>) {
        self.names.lock().await.insert(scope, names);
    }

    pub(crate) async fn stored_names(&self, scope: &CatalogScope) -> Option<Vec<String>> {
        self.names.lock().await.get(scope).cloned()
    }
}

#[async_trait]
impl CatalogCache for FakeCatalogCache {
    async fn get_names(&self, scope: &CatalogScope) -> AppResult<Option<Vec<String>>> {
        Ok(self.names.lock().await.get(scope).cloned())
    }

    async fn set_names(
        &self,
        scope: CatalogScope,
        names: Vec<String>,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        self.names.lock().await.insert(scope, names);
        Ok(())
    }

    async fn get_role_grants(&self, role: &str) -> AppResult<Option<Vec<RoleGrant>>> {
        Ok(self.grants.lock().await.get(role).cloned())
    }

    async fn set_role_grants(
        &self,
        role: &str,
        grants: Vec<RoleGrant>,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        self.grants.lock().await.insert(role.to_owned(), grants);
        Ok(())
    }

    async fn invalidate_names(&self, scope: &CatalogScope) -> AppResult<()> {
        self.names.lock().await.remove(scope);
        Ok(())
    }

    async fn invalidate_role_grants(&self) -> AppResult<()> {
        self.grants.lock().await.clear();
        Ok(())
    }
}
