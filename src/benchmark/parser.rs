//! Marker protocol parser
//!
//! Turns harness stdout into a [`BenchmarkResult`]. Incidental output from
//! user code is ignored: only lines starting with a marker are read, and the
//! last `TIME:`/`MEMORY:`/`OUTPUT:` line wins.

use crate::{
    constants::markers,
    models::{BenchmarkResult, FailureKind, TimingStats},
};

/// Parse the captured output of one harness run
pub fn parse_output(input_size: usize, runs: u32, stdout: &str, stderr: &str) -> BenchmarkResult {
    if !has_success_marker(stdout) {
        return BenchmarkResult::failed(
            input_size,
            runs,
            FailureKind::Runtime,
            failure_message(stdout, stderr),
        );
    }

    match parse_markers(stdout) {
        Ok(parsed) => BenchmarkResult::measured(
            input_size,
            runs,
            parsed.time_ms,
            parsed.memory_bytes,
            TimingStats::from_samples(&parsed.samples),
        )
        .with_output_digest(parsed.output_digest),
        Err(message) => BenchmarkResult::failed(input_size, runs, FailureKind::Parse, message),
    }
}

#[derive(Debug)]
struct ParsedMarkers {
    time_ms: f64,
    memory_bytes: Option<u64>,
    samples: Vec<f64>,
    output_digest: Option<String>,
}

fn has_success_marker(stdout: &str) -> bool {
    stdout.lines().any(|line| line.trim() == markers::SUCCESS)
}

fn parse_markers(stdout: &str) -> Result<ParsedMarkers, String> {
    let mut time_ms = None;
    let mut memory_bytes = None;
    let mut samples = Vec::new();
    let mut output_digest = None;

    for line in stdout.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix(markers::TIME) {
            time_ms = Some(parse_millis(markers::TIME, value)?);
        } else if let Some(value) = line.strip_prefix(markers::MEMORY) {
            memory_bytes = Some(parse_bytes(value)?);
        } else if let Some(value) = line.strip_prefix(markers::SAMPLE) {
            samples.push(parse_millis(markers::SAMPLE, value)?);
        } else if let Some(value) = line.strip_prefix(markers::OUTPUT) {
            // An empty digest means the value could not be hashed
            output_digest = Some(value.trim()).filter(|d| !d.is_empty()).map(str::to_string);
        }
    }

    let time_ms = time_ms.ok_or_else(|| format!("Harness output has no {} marker", markers::TIME))?;

    Ok(ParsedMarkers {
        time_ms,
        memory_bytes,
        samples,
        output_digest,
    })
}

fn parse_millis(marker: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .ok_or_else(|| format!("Malformed {marker} value: {value:?}"))
}

/// Memory values may be printed as floats; they are truncated to bytes.
fn parse_bytes(value: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|bytes| bytes.is_finite() && *bytes >= 0.0)
        .map(|bytes| bytes as u64)
        .ok_or_else(|| format!("Malformed {} value: {value:?}", markers::MEMORY))
}

/// Error payload for a run that never reached `SUCCESS`
fn failure_message(stdout: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with(markers::ERROR))
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown error".to_string())
}
