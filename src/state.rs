//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::{config::Config, services::BenchmarkService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Application configuration
    config: Config,

    /// Benchmark engine front-end
    benchmarks: BenchmarkService,
}

impl AppState {
    /// Create a new application state running benchmarks on this host
    pub fn new(config: Config) -> Self {
        let benchmarks = BenchmarkService::new(config.benchmark.clone());
        Self::with_service(config, benchmarks)
    }

    /// Create an application state around an existing service
    pub fn with_service(config: Config, benchmarks: BenchmarkService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, benchmarks }),
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the benchmark service
    pub fn benchmarks(&self) -> &BenchmarkService {
        &self.inner.benchmarks
    }
}
