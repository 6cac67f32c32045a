//! Grantline API composition root.

#![forbid(unsafe_code)]

mod config;
mod dto;
mod error;
mod handlers;
mod state;

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post};
use grantline_application::{
    AuditLogService, CatalogService, DatabaseAdminService, HierarchyGraphService,
    MetadataService, RoleAdminService, RoleHierarchyLogService, SequenceAllocator,
    SessionService, UsageService, WarehouseAdminService, WarehouseClient,
};
use grantline_core::AppError;
use grantline_infrastructure::{
    HttpWarehouseClient, InMemoryCatalogCache, PostgresSequenceAllocator,
    PostgresWarehouseClient, WarehouseSequenceAllocator,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ApiConfig, WarehouseProviderConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let (client, allocator) = build_warehouse_backend(&config).await?;

    let session = SessionService::new(client.clone());
    // The process must not come up without a working warehouse session.
    let identity = session.probe().await?;
    info!(
        user = identity.user(),
        role = identity.role(),
        "warehouse session established"
    );

    let schema = config.control_schema();
    let audit = AuditLogService::new(
        client.clone(),
        allocator.clone(),
        session.clone(),
        schema.clone(),
    );
    let hierarchy_log =
        RoleHierarchyLogService::new(client.clone(), allocator, schema.clone());
    let catalog = CatalogService::new(
        client.clone(),
        Arc::new(InMemoryCatalogCache::new()),
        schema.clone(),
    );

    let state = AppState {
        session: session.clone(),
        audit: audit.clone(),
        hierarchy_log: hierarchy_log.clone(),
        catalog: catalog.clone(),
        hierarchy_graph: HierarchyGraphService::new(catalog.clone()),
        databases: DatabaseAdminService::new(client.clone(), audit.clone(), catalog.clone()),
        warehouses: WarehouseAdminService::new(client.clone(), audit.clone()),
        roles: RoleAdminService::new(
            client.clone(),
            audit.clone(),
            hierarchy_log,
            catalog.clone(),
            session,
        ),
        metadata: MetadataService::new(client.clone(), audit, catalog, schema.clone()),
        usage: UsageService::new(client, schema),
    };

    let app = api_router(state);

    let host = IpAddr::from_str(config.api_host.as_str())
        .map_err(|error| AppError::Validation(format!("invalid API_HOST: {error}")))?;
    let address = SocketAddr::new(host, config.api_port);
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "grantline-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

async fn build_warehouse_backend(
    config: &ApiConfig,
) -> Result<(Arc<dyn WarehouseClient>, Arc<dyn SequenceAllocator>), AppError> {
    match &config.warehouse_provider {
        WarehouseProviderConfig::Http(http) => {
            let client: Arc<dyn WarehouseClient> = Arc::new(HttpWarehouseClient::new(
                &http.base_url,
                http.token.clone(),
                Duration::from_secs(http.timeout_seconds),
            )?);
            let allocator: Arc<dyn SequenceAllocator> =
                Arc::new(WarehouseSequenceAllocator::new(client.clone()));
            Ok((client, allocator))
        }
        WarehouseProviderConfig::Postgres(postgres) => {
            let pool = PgPoolOptions::new()
                .max_connections(postgres.max_connections)
                .connect(postgres.database_url.as_str())
                .await
                .map_err(|error| {
                    AppError::SessionUnavailable(format!(
                        "failed to connect to DATABASE_URL: {error}"
                    ))
                })?;
            Ok((
                Arc::new(PostgresWarehouseClient::new(pool.clone())),
                Arc::new(PostgresSequenceAllocator::new(pool)),
            ))
        }
    }
}

fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/session", get(handlers::health::session_handler))
        .route(
            "/api/databases",
            get(handlers::databases::list_databases_handler)
                .post(handlers::databases::create_database_handler),
        )
        .route(
            "/api/databases/{name}",
            delete(handlers::databases::drop_database_handler),
        )
        .route(
            "/api/warehouses",
            post(handlers::warehouses::create_warehouse_handler),
        )
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler)
                .post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/roles/functional-technical",
            get(handlers::roles::list_functional_technical_roles_handler),
        )
        .route(
            "/api/roles/environment",
            post(handlers::roles::provision_environment_role_handler),
        )
        .route(
            "/api/roles/{target}/grants",
            post(handlers::roles::grant_roles_handler)
                .delete(handlers::roles::revoke_roles_handler),
        )
        .route(
            "/api/roles/{target}/database-grants",
            post(handlers::roles::grant_database_access_handler),
        )
        .route("/api/hierarchy", get(handlers::hierarchy::hierarchy_handler))
        .route(
            "/api/hierarchy/log",
            get(handlers::hierarchy::hierarchy_log_handler),
        )
        .route(
            "/api/metadata/roles",
            get(handlers::metadata::list_role_metadata_handler)
                .put(handlers::metadata::upsert_role_metadata_handler),
        )
        .route(
            "/api/metadata/functions/{role_type}",
            get(handlers::metadata::list_function_names_handler),
        )
        .route(
            "/api/metadata/environments",
            get(handlers::metadata::list_environments_handler),
        )
        .route("/api/audit", get(handlers::audit::list_audit_log_handler))
        .route(
            "/api/usage/warehouse-metering",
            get(handlers::usage::warehouse_metering_handler),
        )
        .route(
            "/api/usage/database-storage",
            get(handlers::usage::database_storage_handler),
        )
        .route(
            "/api/usage/query-costs",
            get(handlers::usage::query_costs_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
