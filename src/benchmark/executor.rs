//! Process runner for generated harnesses
//!
//! Every invocation gets its own scratch directory and its own process
//! group. Whatever happens to the run (success, failure, timeout or the
//! future being dropped) the directory is removed and the group is killed.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::{
    config::BenchmarkConfig,
    constants::{HARNESS_FILE_STEM, SCRATCH_DIR_PREFIX},
    models::{BenchmarkResult, FailureKind, InputType, Language},
    utils::time::format_seconds,
};

use super::{
    capture::{self, CapturedOutput},
    harness::{self, HarnessRequest, HarnessScript},
    languages::{Execution, LanguageHandler},
    parser,
    toolchain::Toolchain,
};

/// One measurement: a snippet at a single input size
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub language: Language,
    pub code: String,
    pub function_name: String,
    pub input_size: usize,
    pub input_type: InputType,
    pub runs: u32,
}

impl RunRequest {
    fn harness_request(&self) -> HarnessRequest<'_> {
        HarnessRequest {
            code: &self.code,
            function_name: &self.function_name,
            input_size: self.input_size,
            input_type: self.input_type,
            runs: self.runs,
        }
    }
}

/// Runs one measurement and reports it as a value.
///
/// Implementations never fail: problems are described by the returned
/// result's `failure` kind.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BenchmarkExecutor: Send + Sync {
    async fn execute(&self, request: &RunRequest) -> BenchmarkResult;
}

#[async_trait]
impl<T: BenchmarkExecutor + ?Sized> BenchmarkExecutor for Arc<T> {
    async fn execute(&self, request: &RunRequest) -> BenchmarkResult {
        (**self).execute(request).await
    }
}

/// Errors that stop a harness from producing output
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("{language} not installed ({program} not found on PATH)")]
    ToolchainUnavailable {
        language: &'static str,
        program: String,
    },

    #[error("Compilation failed: {0}")]
    CompilationFailed(String),

    #[error("Compilation timed out after {}", seconds(.0))]
    CompilationTimedOut(Duration),

    #[error("Execution timed out after {}", seconds(.0))]
    TimedOut(Duration),

    #[error("Failed to run benchmark process: {0}")]
    Io(#[from] io::Error),
}

fn seconds(limit: &Duration) -> String {
    format_seconds(*limit)
}

impl ExecutionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ToolchainUnavailable { .. } => FailureKind::ToolchainUnavailable,
            Self::CompilationFailed(_) => FailureKind::Compilation,
            Self::CompilationTimedOut(_) | Self::TimedOut(_) => FailureKind::Timeout,
            Self::Io(_) => FailureKind::Internal,
        }
    }
}

/// Executor that runs harnesses with the host's toolchains
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    config: BenchmarkConfig,
}

impl ProcessExecutor {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    async fn run(&self, request: &RunRequest) -> Result<BenchmarkResult, ExecutionError> {
        let handler = request.language.handler();
        let toolchain = Toolchain::locate(&self.config.toolchains, request.language).ok_or_else(
            || ExecutionError::ToolchainUnavailable {
                language: handler.display_name,
                program: self.config.toolchains.program(request.language).to_string(),
            },
        )?;

        let script = harness::generate(request.language, &request.harness_request());
        let scratch = ScratchDir::create(self.config.temp_dir.as_deref())?;
        let source = scratch.write(&script).await?;

        let output = match handler.execution {
            Execution::Interpret { args } => {
                let mut command = scratch.command(&toolchain.path, handler);
                command.args(args).arg(&source);
                tracing::debug!(program = %toolchain.program, source = %source.display(), "Running harness");
                run_process(command, self.config.timeout).await?
            }
            Execution::Compile { args } => {
                let binary = self.compile(&toolchain, handler, args, &source, &scratch).await?;
                let command = scratch.command(&binary, handler);
                tracing::debug!(binary = %binary.display(), "Running compiled harness");
                run_process(command, self.config.timeout).await?
            }
        };

        scratch.close();

        Ok(parser::parse_output(
            request.input_size,
            request.runs,
            &output.stdout,
            &output.stderr,
        ))
    }

    async fn compile(
        &self,
        toolchain: &Toolchain,
        handler: &LanguageHandler,
        args: &[&str],
        source: &Path,
        scratch: &ScratchDir,
    ) -> Result<PathBuf, ExecutionError> {
        let binary = scratch.binary_path();

        let mut command = scratch.command(&toolchain.path, handler);
        command.args(args).arg("-o").arg(&binary).arg(source);

        let started = Instant::now();
        let output = run_process(command, self.config.timeout)
            .await
            .map_err(|e| match e {
                ExecutionError::TimedOut(limit) => ExecutionError::CompilationTimedOut(limit),
                other => other,
            })?;
        tracing::debug!(
            program = %toolchain.program,
            elapsed_ms = started.elapsed().as_millis() as u64,
            success = output.status.success(),
            "Compiled harness"
        );

        if !output.status.success() {
            let stderr = output.stderr.trim();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", toolchain.program, output.status)
            } else {
                stderr.to_string()
            };
            return Err(ExecutionError::CompilationFailed(message));
        }

        Ok(binary)
    }
}

#[async_trait]
impl BenchmarkExecutor for ProcessExecutor {
    async fn execute(&self, request: &RunRequest) -> BenchmarkResult {
        let started = Instant::now();

        let result = self.run(request).await.unwrap_or_else(|e| {
            BenchmarkResult::failed(request.input_size, request.runs, e.kind(), e.to_string())
        });

        tracing::debug!(
            language = %request.language,
            input_size = request.input_size,
            success = result.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Measurement finished"
        );

        result
    }
}

/// Per-invocation temp directory holding the harness and any binary
struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    fn create(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_DIR_PREFIX);

        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A command running inside the directory, with the temp directories
    /// of the program (and of the toolchain) pointed into it
    fn command(&self, program: &Path, handler: &LanguageHandler) -> Command {
        let mut command = Command::new(program);
        command.current_dir(self.path()).env("TMPDIR", self.path());
        for var in handler.temp_dir_vars {
            command.env(var, self.path());
        }
        command
    }

    async fn write(&self, script: &HarnessScript) -> io::Result<PathBuf> {
        let path = self.path().join(script.file_name());
        tokio::fs::write(&path, &script.source).await?;
        Ok(path)
    }

    fn binary_path(&self) -> PathBuf {
        self.path().join(format!(
            "{}{}",
            HARNESS_FILE_STEM,
            std::env::consts::EXE_SUFFIX
        ))
    }

    /// Remove the directory now, reporting failures instead of ignoring them
    fn close(self) {
        let path = self.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch directory");
        }
    }
}

#[derive(Debug)]
struct ProcessOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

/// Spawn `command` in a fresh process group and wait at most `limit`
async fn run_process(mut command: Command, limit: Duration) -> Result<ProcessOutput, ExecutionError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn()?;
    let mut group = ProcessGroup::new(child.id());

    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let status = match timeout(limit, child.wait()).await {
        Ok(status) => {
            // Grandchildren may still hold the pipes open
            group.kill();
            status?
        }
        Err(_) => {
            group.kill();
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "Failed to reap timed out process");
            }
            stdout.abort();
            stderr.abort();
            return Err(ExecutionError::TimedOut(limit));
        }
    };

    Ok(ProcessOutput {
        status,
        stdout: collect(stdout).await?,
        stderr: collect(stderr).await?,
    })
}

/// Drain a pipe to the end so the child never blocks on it
fn spawn_reader<R>(pipe: Option<R>) -> JoinHandle<io::Result<CapturedOutput>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        match pipe {
            Some(pipe) => capture::capture(pipe).await,
            None => Ok(CapturedOutput::new()),
        }
    })
}

async fn collect(reader: JoinHandle<io::Result<CapturedOutput>>) -> Result<String, ExecutionError> {
    let output = reader.await.map_err(io::Error::other)??;
    if output.omitted() > 0 {
        tracing::debug!(omitted_bytes = output.omitted(), "Truncated harness output");
    }
    Ok(output.into_string())
}

/// Kills a child's process group once, at the latest when dropped
struct ProcessGroup {
    pid: Option<u32>,
}

impl ProcessGroup {
    fn new(pid: Option<u32>) -> Self {
        Self { pid }
    }

    fn kill(&mut self) {
        if let Some(pid) = self.pid.take() {
            kill_process_group(pid);
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };

    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => tracing::warn!(pid, error = %e, "Failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}
