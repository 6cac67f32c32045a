//! HTTP handlers, one module per administrative area.

pub mod audit;
pub mod databases;
pub mod health;
pub mod hierarchy;
pub mod metadata;
pub mod roles;
pub mod usage;
pub mod warehouses;

use axum::Json;
use axum::extract::{Path, Query, State};

use crate::dto;
use crate::error::ApiResult;
use crate::state::AppState;
