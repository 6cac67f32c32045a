use std::env;

use grantline_application::ControlSchema;
use grantline_core::{AppError, SqlIdentifier};
use url::Url;

const DEFAULT_STATEMENT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone)]
pub struct HttpWarehouseConfig {
    pub base_url: Url,
    pub token: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct PostgresWarehouseConfig {
    pub database_url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub enum WarehouseProviderConfig {
    Http(HttpWarehouseConfig),
    Postgres(PostgresWarehouseConfig),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub warehouse_provider: WarehouseProviderConfig,
    pub control_database: SqlIdentifier,
    pub control_schema_name: SqlIdentifier,
    pub usage_namespace: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let control_database = SqlIdentifier::new(
            env::var("CONTROL_DATABASE").unwrap_or_else(|_| "SECURITY".to_owned()),
        )?;
        let control_schema_name = SqlIdentifier::new(
            env::var("CONTROL_SCHEMA").unwrap_or_else(|_| "ACCESS_CONTROL".to_owned()),
        )?;
        let usage_namespace = env::var("USAGE_NAMESPACE")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let warehouse_provider = match env::var("WAREHOUSE_PROVIDER")
            .unwrap_or_else(|_| "http".to_owned())
            .as_str()
        {
            "http" => {
                let base_url = Url::parse(required_env("WAREHOUSE_API_URL")?.as_str())
                    .map_err(|error| {
                        AppError::Validation(format!("invalid WAREHOUSE_API_URL: {error}"))
                    })?;
                let timeout_seconds = env::var("WAREHOUSE_STATEMENT_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_STATEMENT_TIMEOUT_SECONDS);
                WarehouseProviderConfig::Http(HttpWarehouseConfig {
                    base_url,
                    token: required_non_empty_env("WAREHOUSE_API_TOKEN")?,
                    timeout_seconds,
                })
            }
            "postgres" => {
                let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|value| value.parse::<u32>().ok())
                    .unwrap_or(5);
                WarehouseProviderConfig::Postgres(PostgresWarehouseConfig {
                    database_url: required_env("DATABASE_URL")?,
                    max_connections,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "WAREHOUSE_PROVIDER must be either 'http' or 'postgres', got '{other}'"
                )));
            }
        };

        Ok(Self {
            api_host,
            api_port,
            warehouse_provider,
            control_database,
            control_schema_name,
            usage_namespace,
        })
    }

    pub fn control_schema(&self) -> ControlSchema {
        let schema = ControlSchema::new(
            self.control_database.clone(),
            self.control_schema_name.clone(),
        );
        match &self.usage_namespace {
            Some(namespace) => schema.with_usage_namespace(namespace.clone()),
            None => schema,
        }
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
