//! Stockroom API Library
//!
//! Inventory and sales management: catalog, stock, purchase transactions
//! against an append-only sale ledger, and aggregate dashboards.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

pub use handlers::AppServices;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: AppServices,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match db::check_connection(&state.db).await {
        Ok(()) => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Builds the complete application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "stockroom-api up" }))
        .route("/health", get(health))
        .nest("/api/v1", handlers::api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
