//! Host environment captured alongside benchmark numbers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where and when a set of measurements was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    pub os: String,
    pub arch: String,
    pub cpu_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl EnvironmentInfo {
    /// Capture the current host
    pub fn capture() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            timestamp: Utc::now(),
        }
    }
}
