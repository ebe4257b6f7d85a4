//! menud-ri - Restaurant Import Microservice
//!
//! Ingests hierarchical restaurant/menu/menu-item JSON documents into a
//! normalized SQLite store with idempotent upsert semantics, and exposes
//! plain CRUD endpoints for the stored entities.
//!
//! Library interface exposes `AppState` and `build_router` for integration
//! testing.

pub mod api;
pub mod db;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::restaurant_routes())
        .merge(api::menu_routes())
        .merge(api::menu_item_routes())
        .merge(api::health_routes())
        .with_state(state)
}
