//! End-to-end tests against the host toolchains.
//!
//! Each test skips itself when the toolchain it needs is not on PATH.

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use forgebench::{
    benchmark::{
        toolchain::find_executable, BenchmarkExecutor, BenchmarkRunner, ComparisonRequest,
        ProcessExecutor, RunRequest, Snippet,
    },
    config::{BenchmarkConfig, ToolchainConfig},
    models::{FailureKind, InputType, Language},
};

const QUADRATIC_DUPLICATES: &str = r#"
def find_duplicates(arr):
    duplicates = []
    for i in range(len(arr)):
        for j in range(i + 1, len(arr)):
            if arr[i] == arr[j] and arr[i] not in duplicates:
                duplicates.append(arr[i])
    return duplicates
"#;

const LINEAR_DUPLICATES: &str = r#"
def find_duplicates_fast(arr):
    seen = set()
    duplicates = set()
    for value in arr:
        if value in seen:
            duplicates.add(value)
        seen.add(value)
    return list(duplicates)
"#;

fn available(config: &BenchmarkConfig, language: Language) -> bool {
    let found = find_executable(config.toolchains.program(language)).is_some();
    if !found {
        eprintln!("skipping: no {} toolchain on PATH", language);
    }
    found
}

fn config_in(root: &Path) -> BenchmarkConfig {
    BenchmarkConfig {
        runs: 3,
        timeout: Duration::from_secs(60),
        temp_dir: Some(root.to_path_buf()),
        ..BenchmarkConfig::default()
    }
}

fn runner(config: &BenchmarkConfig) -> BenchmarkRunner<ProcessExecutor> {
    BenchmarkRunner::new(ProcessExecutor::new(config.clone()), config)
}

fn python_pair(sizes: Vec<usize>, candidate: &str) -> ComparisonRequest {
    ComparisonRequest {
        language: Language::Python,
        baseline: Snippet::resolve(QUADRATIC_DUPLICATES, None, Language::Python, "baseline").unwrap(),
        candidate: Snippet::resolve(candidate, None, Language::Python, "candidate").unwrap(),
        input_sizes: sizes,
        input_type: InputType::Array,
        runs: 3,
    }
}

fn scratch_entries(root: &Path) -> usize {
    std::fs::read_dir(root).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_python_quadratic_vs_linear() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    if !available(&config, Language::Python) {
        return;
    }

    let runner = runner(&config);
    let report = runner
        .run_comparison(&python_pair(vec![100, 1000], LINEAR_DUPLICATES))
        .await
        .unwrap();

    assert!(report.success, "{:?}", report.failures);
    assert_eq!(report.comparisons.len(), 2);
    assert_eq!(report.comparisons[0].input_size, 100);
    assert_eq!(report.comparisons[1].input_size, 1000);
    assert!(report.comparisons.iter().all(|c| c.speedup > 1.0));
    assert!(report.average_speedup.unwrap() > 1.0);
    assert!(report.comparisons.iter().all(|c| c.memory_baseline.is_some()));
    assert!(report.comparisons.iter().all(|c| c.output_matches == Some(true)));
    assert_eq!(report.outputs_match, Some(true));
    assert_eq!(scratch_entries(root.path()), 0);
}

#[tokio::test]
async fn test_different_return_values_are_flagged() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    if !available(&config, Language::Python) {
        return;
    }

    let off_by_one = "def find_duplicates_fast(arr):\n    return [len(arr)]\n";
    let report = runner(&config)
        .run_comparison(&python_pair(vec![100], off_by_one))
        .await
        .unwrap();

    assert!(report.success, "{:?}", report.failures);
    assert_eq!(report.comparisons[0].output_matches, Some(false));
    assert_eq!(report.outputs_match, Some(false));
}

#[tokio::test]
async fn test_noisy_function_still_measured() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    if !available(&config, Language::Python) {
        return;
    }

    // 2MB per call, well past the capture budget over all invocations
    let noisy = "def noisy(xs):\n    print('x' * 2 * 1024 * 1024)\n    return len(xs)\n";
    let snippet = Snippet::resolve(noisy, None, Language::Python, "submitted").unwrap();
    let result = ProcessExecutor::new(config)
        .execute(&RunRequest {
            language: Language::Python,
            code: snippet.code,
            function_name: snippet.function_name,
            input_size: 100,
            input_type: InputType::Array,
            runs: 5,
        })
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.timing.map(|t| t.samples), Some(5));
    assert!(result.memory_bytes.is_some());
    assert!(result.output_digest.is_some());
    assert_eq!(scratch_entries(root.path()), 0);
}

#[tokio::test]
async fn test_python_syntax_error_candidate() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    if !available(&config, Language::Python) {
        return;
    }

    let broken = "def find_duplicates_fast(arr)\n    return arr\n";
    let request = python_pair(vec![100, 1000], broken);
    let runner = runner(&config);

    let comparisons = runner.compare(&request).await.unwrap();
    assert!(comparisons.is_empty());

    let report = runner.run_comparison(&request).await.unwrap();
    assert_eq!(report.average_speedup, None);
    assert!(!report.success);
    assert_eq!(report.failures.len(), 2);
    for failure in &report.failures {
        assert_eq!(failure.kind, FailureKind::Runtime);
        assert!(failure.message.contains("SyntaxError"), "{}", failure.message);
    }
}

#[tokio::test]
async fn test_missing_rustc_fails_fast() {
    let root = tempfile::tempdir().unwrap();
    let config = BenchmarkConfig {
        toolchains: ToolchainConfig {
            rustc: "forgebench-no-such-rustc".to_string(),
            ..ToolchainConfig::default()
        },
        ..config_in(root.path())
    };

    let request = ComparisonRequest {
        language: Language::Rust,
        baseline: Snippet::new("fn slow(xs: &[i32]) -> usize { xs.len() }", "slow"),
        candidate: Snippet::new("fn fast(xs: &[i32]) -> usize { xs.len() }", "fast"),
        input_sizes: vec![100, 1000, 10000],
        input_type: InputType::Array,
        runs: 3,
    };

    let started = Instant::now();
    let report = runner(&config).run_comparison(&request).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(report.comparisons.is_empty());
    assert_eq!(report.average_speedup, None);
    assert_eq!(report.failures.len(), 6);
    assert!(report
        .failures
        .iter()
        .all(|f| f.kind == FailureKind::ToolchainUnavailable));
}

#[tokio::test]
async fn test_empty_sizes_is_not_an_error() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());

    let comparisons = runner(&config)
        .compare(&python_pair(vec![], LINEAR_DUPLICATES))
        .await
        .unwrap();

    assert!(comparisons.is_empty());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timeout_kills_process_and_cleans_up() {
    let root = tempfile::tempdir().unwrap();
    let config = BenchmarkConfig {
        timeout: Duration::from_secs(2),
        ..config_in(root.path())
    };
    if !available(&config, Language::Python) {
        return;
    }

    let pid_dir = tempfile::tempdir().unwrap();
    let pid_file = pid_dir.path().join("pid");
    let code = format!(
        "import os\nimport time\n\ndef stall(xs):\n    with open({:?}, 'w') as f:\n        f.write(str(os.getpid()))\n    time.sleep(60)\n",
        pid_file.display().to_string()
    );

    let started = Instant::now();
    let result = ProcessExecutor::new(config.clone())
        .execute(&RunRequest {
            language: Language::Python,
            code,
            function_name: "stall".to_string(),
            input_size: 10,
            input_type: InputType::Array,
            runs: 1,
        })
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!result.success);
    assert_eq!(result.failure, Some(FailureKind::Timeout));
    assert_eq!(result.error.as_deref(), Some("Execution timed out after 2s"));
    assert_eq!(scratch_entries(root.path()), 0);

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let stat = format!("/proc/{}/stat", pid.trim());
    let mut gone = false;
    for _ in 0..50 {
        let running = std::fs::read_to_string(&stat)
            .map(|s| !s.contains(") Z "))
            .unwrap_or(false);
        if !running {
            gone = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(gone, "benchmark process {} outlived its timeout", pid.trim());
}

#[tokio::test]
async fn test_repeated_comparisons_agree() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    if !available(&config, Language::Python) {
        return;
    }

    let runner = runner(&config);
    let request = python_pair(vec![1000], LINEAR_DUPLICATES);

    let first = runner.compare(&request).await.unwrap();
    let second = runner.compare(&request).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    // Timing noise is large; the direction has to hold and the magnitude roughly agree
    let (a, b) = (first[0].speedup, second[0].speedup);
    assert!(a > 1.0 && b > 1.0);
    assert!((a / b).max(b / a) < 2.0, "speedups {a} and {b} disagree");
}

#[tokio::test]
async fn test_rust_compile_error_is_reported() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    if !available(&config, Language::Rust) {
        return;
    }

    let request = ComparisonRequest {
        language: Language::Rust,
        baseline: Snippet::new("fn slow(xs: &[i32]) -> usize { xs.len() }", "slow"),
        candidate: Snippet::new("fn fast(xs: &[i32]) -> i32 { xs.len() }", "fast"),
        input_sizes: vec![10],
        input_type: InputType::Array,
        runs: 3,
    };
    let report = runner(&config).run_comparison(&request).await.unwrap();

    assert!(!report.success);
    assert!(report.comparisons.is_empty());
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.kind, FailureKind::Compilation);
    assert!(failure.message.starts_with("Compilation failed: "), "{}", failure.message);
    assert!(failure.message.contains("error"), "{}", failure.message);
    assert_eq!(scratch_entries(root.path()), 0);
}

fn go_build_dirs() -> HashSet<String> {
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with("go-build"))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(unix)]
#[tokio::test]
async fn test_go_timeout_leaves_no_build_dir() {
    let root = tempfile::tempdir().unwrap();
    let config = BenchmarkConfig {
        timeout: Duration::from_secs(15),
        ..config_in(root.path())
    };
    if !available(&config, Language::Go) {
        return;
    }

    let before = go_build_dirs();
    let code = "package main\n\nimport \"time\"\n\nfunc Stall(xs []int) int {\n\ttime.Sleep(time.Hour)\n\treturn len(xs)\n}\n";
    let result = ProcessExecutor::new(config)
        .execute(&RunRequest {
            language: Language::Go,
            code: code.to_string(),
            function_name: "Stall".to_string(),
            input_size: 10,
            input_type: InputType::Array,
            runs: 1,
        })
        .await;

    assert_eq!(result.failure, Some(FailureKind::Timeout), "{:?}", result.error);
    assert_eq!(scratch_entries(root.path()), 0);
    let leaked: Vec<_> = go_build_dirs().difference(&before).cloned().collect();
    assert!(leaked.is_empty(), "go left build dirs behind: {leaked:?}");
}

async fn smoke(language: Language, code: &str, input_type: InputType) {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    if !available(&config, language) {
        return;
    }

    let snippet = Snippet::resolve(code, None, language, "smoke").unwrap();
    let result = ProcessExecutor::new(config)
        .execute(&RunRequest {
            language,
            code: snippet.code,
            function_name: snippet.function_name,
            input_size: 100,
            input_type,
            runs: 3,
        })
        .await;

    assert!(result.success, "{language}: {:?}", result.error);
    assert!(result.execution_time_ms >= 0.0);
    assert_eq!(result.timing.map(|t| t.samples), Some(3));
    assert!(result.output_digest.is_some(), "{language}: no output digest");
    assert_eq!(scratch_entries(root.path()), 0);
}

#[tokio::test]
async fn test_javascript_harness_runs() {
    smoke(
        Language::JavaScript,
        "function sumAll(xs) { let total = 0; for (const x of xs) total += x; return total; }",
        InputType::RandomArray,
    )
    .await;
}

#[tokio::test]
async fn test_typescript_without_annotations_runs() {
    smoke(
        Language::TypeScript,
        "const countA = (s) => s.split('').filter((c) => c === 'a').length;",
        InputType::String,
    )
    .await;
}

#[tokio::test]
async fn test_go_harness_runs() {
    smoke(
        Language::Go,
        "package main\n\nfunc SumAll(xs []int) int {\n\ttotal := 0\n\tfor _, x := range xs {\n\t\ttotal += x\n\t}\n\treturn total\n}\n",
        InputType::Array,
    )
    .await;
}

#[tokio::test]
async fn test_rust_harness_runs() {
    smoke(
        Language::Rust,
        "use std::collections::HashMap;\n\nfn total(m: &HashMap<i32, i32>) -> i64 { m.values().map(|&v| v as i64).sum() }\n",
        InputType::Map,
    )
    .await;
}
