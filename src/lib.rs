//! ForgeBench - Cross-language micro-benchmark engine
//!
//! Measures how much faster a candidate implementation is than a baseline.
//! Both snippets are wrapped in generated harness programs, run with the
//! language's own toolchain at several input sizes, and compared.
//!
//! # Features
//!
//! - Python, JavaScript, TypeScript, Go and Rust snippets
//! - Automatic entry-point discovery
//! - Deterministic synthetic inputs (arrays, random arrays, strings, maps)
//! - Per-run timing statistics and best-effort memory measurements
//! - Hard wall-clock limits with process-group cleanup
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Request resolution and validation
//! - **Benchmark**: Harness generation, execution and aggregation
//! - **Models**: Domain models

pub mod benchmark;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Build the application router with its middleware stack
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(constants::MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
