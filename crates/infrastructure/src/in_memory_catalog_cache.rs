use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use grantline_application::{CatalogCache, CatalogScope};
use grantline_core::AppResult;
use grantline_domain::RoleGrant;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn fresh(value: T, ttl_seconds: u32) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);
        Self { value, expires_at }
    }

    fn is_live(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// In-memory TTL cache for catalog listings and role grants.
///
/// Expired entries are dropped on the read that finds them; a zero TTL
/// stores nothing.
#[derive(Default)]
pub struct InMemoryCatalogCache {
    names: RwLock<HashMap<CatalogScope, CacheEntry<Vec<String>>>>,
    grants: RwLock<HashMap<String, CacheEntry<Vec<RoleGrant>>>>,
}

impl InMemoryCatalogCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogCache for InMemoryCatalogCache {
    async fn get_names(&self, scope: &CatalogScope) -> AppResult<Option<Vec<String>>> {
        {
            let names = self.names.read().await;
            match names.get(scope) {
                Some(entry) if entry.is_live() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut names = self.names.write().await;
        if names.get(scope).is_some_and(|entry| !entry.is_live()) {
            names.remove(scope);
        }

        Ok(None)
    }

    async fn set_names(
        &self,
        scope: CatalogScope,
        values: Vec<String>,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        self.names
            .write()
            .await
            .insert(scope, CacheEntry::fresh(values, ttl_seconds));
        Ok(())
    }

    async fn get_role_grants(&self, role: &str) -> AppResult<Option<Vec<RoleGrant>>> {
        {
            let grants = self.grants.read().await;
            match grants.get(role) {
                Some(entry) if entry.is_live() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut grants = self.grants.write().await;
        if grants.get(role).is_some_and(|entry| !entry.is_live()) {
            grants.remove(role);
        }

        Ok(None)
    }

    async fn set_role_grants(
        &self,
        role: &str,
        values: Vec<RoleGrant>,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        self.grants
            .write()
            .await
            .insert(role.to_owned(), CacheEntry::fresh(values, ttl_seconds));
        Ok(())
    }

    async fn invalidate_names(&self, scope: &CatalogScope) -> AppResult<()> {
        self.names.write().await.remove(scope);
        Ok(())
    }

    async fn invalidate_role_grants(&self) -> AppResult<()> {
        self.grants.write().await.clear();
        Ok(())
    }
}
