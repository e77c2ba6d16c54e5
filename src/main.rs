//! ForgeBench - Application Entry Point
//!
//! This is the main entry point for the ForgeBench server.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use forgebench::{
    benchmark::toolchain,
    config::{Config, LogFormat},
    models::Language,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.rust_log));
    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting ForgeBench server...");
    tracing::info!(
        runs = config.benchmark.runs,
        timeout_secs = config.benchmark.timeout.as_secs_f64(),
        sizes = ?config.benchmark.default_input_sizes,
        "Benchmark defaults"
    );

    // Report which toolchains this host can run
    for language in Language::ALL {
        let program = config.benchmark.toolchains.program(language);
        match toolchain::find_executable(program) {
            Some(path) => tracing::info!(%language, path = %path.display(), "Toolchain available"),
            None => tracing::warn!(%language, program, "Toolchain not found on PATH"),
        }
    }

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state and router
    let state = AppState::new(config);
    let app = forgebench::app(state);

    // Start the server
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
