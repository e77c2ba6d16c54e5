//! Benchmark handler implementations

use axum::{extract::State, Json};
use validator::Validate;

use crate::{error::AppResult, models::ComparisonReport, state::AppState};

use super::{
    request::{CompareBenchmarkRequest, RunBenchmarkRequest, SpeedupRequest},
    response::{LanguagesResponse, RunBenchmarkResponse, SpeedupResponse},
};

/// List supported languages with toolchain availability
pub async fn list_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let languages = state.benchmarks().languages().await;
    Json(LanguagesResponse { languages })
}

/// Compare a baseline against a candidate.
///
/// Per-size failures are part of the report, so this answers 200 even when
/// nothing could be compared.
pub async fn compare(
    State(state): State<AppState>,
    Json(payload): Json<CompareBenchmarkRequest>,
) -> AppResult<Json<ComparisonReport>> {
    payload.validate()?;

    let report = state.benchmarks().compare(payload).await?;
    Ok(Json(report))
}

/// Measure a single snippet
pub async fn run(
    State(state): State<AppState>,
    Json(payload): Json<RunBenchmarkRequest>,
) -> AppResult<Json<RunBenchmarkResponse>> {
    payload.validate()?;

    let response = state.benchmarks().run(payload).await?;
    Ok(Json(response))
}

/// Average speedup over the default input sizes
pub async fn speedup(
    State(state): State<AppState>,
    Json(payload): Json<SpeedupRequest>,
) -> AppResult<Json<SpeedupResponse>> {
    payload.validate()?;

    let response = state.benchmarks().speedup(payload).await?;
    Ok(Json(response))
}
