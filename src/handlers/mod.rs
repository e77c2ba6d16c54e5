//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod benchmarks;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/benchmarks", benchmarks::routes())
}
