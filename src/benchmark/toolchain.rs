//! Toolchain discovery
//!
//! Availability is decided by a PATH lookup, so a missing interpreter or
//! compiler is reported without spawning anything.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;
use tokio::time::timeout;

use crate::{config::ToolchainConfig, models::Language};

/// A toolchain program resolved to an executable on this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub language: Language,
    pub program: String,
    pub path: PathBuf,
}

impl Toolchain {
    /// Locate the program configured for `language`
    pub fn locate(config: &ToolchainConfig, language: Language) -> Option<Self> {
        let program = config.program(language);
        find_executable(program).map(|path| Self {
            language,
            program: program.to_string(),
            path,
        })
    }
}

/// Capability report for one language
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainStatus {
    pub language: Language,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    pub program: String,
    pub available: bool,
    pub version: Option<String>,
    pub compiled: bool,
    pub memory_probe: &'static str,
}

/// Check a language's toolchain and ask it for its version.
///
/// The version command is bounded by `window`; a toolchain that does not
/// answer in time is reported as available with an unknown version.
pub async fn probe(config: &ToolchainConfig, language: Language, window: Duration) -> ToolchainStatus {
    let handler = language.handler();
    let toolchain = Toolchain::locate(config, language);

    let version = match &toolchain {
        Some(toolchain) => read_version(&toolchain.path, handler.version_args, window).await,
        None => None,
    };

    ToolchainStatus {
        language,
        display_name: handler.display_name,
        aliases: language.aliases(),
        program: config.program(language).to_string(),
        available: toolchain.is_some(),
        version,
        compiled: handler.requires_compilation(),
        memory_probe: handler.memory_probe,
    }
}

async fn read_version(path: &Path, args: &[&str], window: Duration) -> Option<String> {
    let output = Command::new(path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    match timeout(window, output).await {
        Ok(Ok(output)) if output.status.success() => {
            // Some toolchains print their version on stderr
            let text = if output.stdout.is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            String::from_utf8_lossy(&text)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
        }
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            tracing::debug!(program = %path.display(), error = %e, "Version probe failed");
            None
        }
        Err(_) => {
            tracing::warn!(program = %path.display(), "Version probe timed out");
            None
        }
    }
}

/// Resolve `program` to an executable file.
///
/// Names containing a path separator are checked directly; bare names are
/// searched on `PATH`.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .flat_map(|dir| executable_names(program).map(move |name| dir.join(name)))
        .find(|path| is_executable(path))
}

#[cfg(windows)]
fn executable_names(program: &str) -> impl Iterator<Item = String> + '_ {
    ["", ".exe", ".cmd"]
        .into_iter()
        .map(move |ext| format!("{program}{ext}"))
}

#[cfg(not(windows))]
fn executable_names(program: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(program.to_string())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
