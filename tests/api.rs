//! Router tests with a scripted executor in place of real toolchains.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use forgebench::{
    benchmark::{BenchmarkExecutor, RunRequest},
    config::Config,
    models::{BenchmarkResult, FailureKind},
    services::BenchmarkService,
    state::AppState,
};

/// Functions named `slow*` take 8ms, `broken*` fail, everything else 2ms.
/// `odd*` functions return a different value from the rest.
struct ScriptedExecutor;

#[async_trait]
impl BenchmarkExecutor for ScriptedExecutor {
    async fn execute(&self, request: &RunRequest) -> BenchmarkResult {
        if request.function_name.starts_with("broken") {
            return BenchmarkResult::failed(
                request.input_size,
                request.runs,
                FailureKind::Runtime,
                "NameError: name 'x' is not defined",
            );
        }
        let time = if request.function_name.starts_with("slow") { 8.0 } else { 2.0 };
        let digest = if request.function_name.starts_with("odd") { "b7" } else { "a1" };
        BenchmarkResult::measured(request.input_size, request.runs, time, Some(4096), None)
            .with_output_digest(Some(digest.to_string()))
    }
}

fn app() -> Router {
    let config = Config::default();
    let service = BenchmarkService::with_executor(config.benchmark.clone(), Arc::new(ScriptedExecutor));
    forgebench::app(AppState::with_service(config, service))
}

async fn send(method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(Method::GET, "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["defaultRuns"], 5);
}

#[tokio::test]
async fn test_languages_lists_every_language() {
    let (status, body) = send(Method::GET, "/api/v1/benchmarks/languages", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["languages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["language"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["python", "javascript", "typescript", "go", "rust"]);
    assert_eq!(body["languages"][4]["compiled"], true);
    assert!(body["languages"][0]["available"].is_boolean());
}

#[tokio::test]
async fn test_compare_returns_report() {
    let (status, body) = send(
        Method::POST,
        "/api/v1/benchmarks/compare",
        Some(json!({
            "language": "py",
            "baseline": { "code": "def slow_sum(xs):\n    return sum(xs)\n" },
            "candidate": { "code": "def fast_sum(xs):\n    return sum(xs)\n" },
            "inputSizes": [100, 1000],
            "inputType": "random_array",
            "runs": 3
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "python");
    assert_eq!(body["inputType"], "random_array");
    assert_eq!(body["runs"], 3);
    assert_eq!(body["success"], true);
    assert_eq!(body["averageSpeedup"], 4.0);
    assert_eq!(body["comparisons"][1]["inputSize"], 1000);
    assert_eq!(body["comparisons"][0]["memoryReduction"], 1.0);
    assert_eq!(body["comparisons"][0]["outputMatches"], true);
    assert_eq!(body["outputsMatch"], true);
    assert!(body["environment"]["cpuCount"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_compare_reports_output_mismatch() {
    let (status, body) = send(
        Method::POST,
        "/api/v1/benchmarks/compare",
        Some(json!({
            "language": "python",
            "baseline": { "code": "def slow_sum(xs):\n    return sum(xs)\n" },
            "candidate": { "code": "def odd_sum(xs):\n    return 0\n" },
            "inputSizes": [10]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["outputsMatch"], false);
    assert_eq!(body["comparisons"][0]["outputMatches"], false);
}

#[tokio::test]
async fn test_compare_failure_is_still_ok() {
    let (status, body) = send(
        Method::POST,
        "/api/v1/benchmarks/compare",
        Some(json!({
            "language": "python",
            "baseline": { "code": "def slow(xs): pass" },
            "candidate": { "code": "def broken(xs): x", "functionName": "broken" },
            "inputSizes": [10]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["averageSpeedup"].is_null());
    assert_eq!(body["failures"][0]["side"], "candidate");
    assert_eq!(body["failures"][0]["kind"], "runtime");
    assert!(body["error"].as_str().unwrap().contains("NameError"));
}

#[tokio::test]
async fn test_unsupported_language_is_bad_request() {
    let (status, body) = send(
        Method::POST,
        "/api/v1/benchmarks/compare",
        Some(json!({
            "language": "cobol",
            "baseline": { "code": "x" },
            "candidate": { "code": "y" }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_LANGUAGE");
}

#[tokio::test]
async fn test_validation_errors_are_bad_request() {
    let (status, body) = send(
        Method::POST,
        "/api/v1/benchmarks/compare",
        Some(json!({
            "language": "python",
            "baseline": { "code": "def slow(xs): pass" },
            "candidate": { "code": "def fast(xs): pass" },
            "runs": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        Method::POST,
        "/api/v1/benchmarks/run",
        Some(json!({
            "language": "python",
            "code": "def fast(xs): pass",
            "inputSizes": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_function_is_unprocessable() {
    let (status, body) = send(
        Method::POST,
        "/api/v1/benchmarks/speedup",
        Some(json!({
            "language": "go",
            "baselineCode": "var x = 1",
            "candidateCode": "func Fast(xs []int) {}"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "FUNCTION_NOT_FOUND");
    assert!(body["error"]["message"].as_str().unwrap().contains("baseline"));
}

#[tokio::test]
async fn test_speedup_over_default_sizes() {
    let (status, body) = send(
        Method::POST,
        "/api/v1/benchmarks/speedup",
        Some(json!({
            "language": "javascript",
            "baselineCode": "function slowSort(xs) { return xs; }",
            "candidateCode": "const fastSort = (xs) => xs;"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["speedup"], 4.0);
}

#[tokio::test]
async fn test_run_single_snippet() {
    let (status, body) = send(
        Method::POST,
        "/api/v1/benchmarks/run",
        Some(json!({
            "language": "rs",
            "code": "fn slow_len(xs: &[i32]) -> usize { xs.len() }",
            "inputSizes": [5, 50]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["functionName"], "slow_len");
    assert_eq!(body["success"], true);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["executionTimeMs"], 8.0);
    assert_eq!(body["results"][0]["memoryBytes"], 4096);
    assert_eq!(body["results"][0]["outputDigest"], "a1");
}
