//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for the General Ledger and hierarchical financial reports
//! - CSV export of financial reports
//! - Mapping of report and repository errors to JSON error bodies

pub mod error;
pub mod routes;

use axum::Router;
use ledgerlens_shared::config::ReportConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Report rendering settings.
    pub report: Arc<ReportConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
