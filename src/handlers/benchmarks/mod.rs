//! Benchmark handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Benchmark routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/languages", get(handler::list_languages))
        .route("/compare", post(handler::compare))
        .route("/run", post(handler::run))
        .route("/speedup", post(handler::speedup))
}
