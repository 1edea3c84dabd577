//! Sandboxed process execution.
//!
//! [`Sandbox`] runs an external command under a wall-clock timeout with a
//! bounded output buffer. Every way a run can go wrong (timeout, output
//! overflow, non-zero exit, spawn failure) is captured in [`ExecStatus`]
//! and rendered as text by [`Execution::into_text`], so a misbehaving
//! candidate is scored as a failed test instead of aborting the pass.
//!
//! [`CommandToolchain`] builds on it to provide a [`Compiler`] and an
//! [`Executor`] driven by command templates.

use super::collaborators::{Compiler, Executor};
use super::types::CodeCandidate;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How long output pipes may stay open after the child is gone. A
/// grandchild that inherited them would otherwise block collection.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Limits applied to every sandboxed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutorConfig {
    /// Wall-clock limit per run.
    pub timeout: Duration,
    /// Maximum bytes captured from stdout and from stderr.
    pub max_output_bytes: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_output_bytes: 1024,
        }
    }
}

impl ExecutorConfig {
    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the output cap.
    pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be positive".into()));
        }
        if self.max_output_bytes == 0 {
            return Err(Error::InvalidConfig(
                "max_output_bytes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// How a sandboxed run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecStatus {
    /// Exit code 0 within limits.
    Success,
    /// Non-zero exit code.
    ExitCode(i32),
    /// Killed after exceeding the timeout.
    TimedOut,
    /// Killed after exceeding the output cap.
    OutputTooLarge,
    /// Could not be run, or ended without an exit code.
    Failed(String),
}

/// Captured result of a sandboxed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// How the run ended.
    pub status: ExecStatus,
    /// Captured stdout (lossy UTF-8).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
}

impl Execution {
    /// Whether the run succeeded.
    pub fn succeeded(&self) -> bool {
        self.status == ExecStatus::Success
    }

    /// Renders the run as program output.
    ///
    /// Success yields stdout. Failures yield a `Failed...` line followed
    /// by stderr and stdout.
    pub fn into_text(self) -> String {
        let out = format!("{}\n{}", self.stderr, self.stdout);
        match self.status {
            ExecStatus::Success => self.stdout,
            ExecStatus::OutputTooLarge => format!("Failed stdout too large:\n{out}"),
            ExecStatus::TimedOut => format!("Failed timed out:\n{out}"),
            ExecStatus::ExitCode(code) => format!("Failed with exit code: {code}\n{out}"),
            ExecStatus::Failed(reason) => format!("Failed:\n{reason}\n{out}"),
        }
    }
}

/// Runs commands under time and output limits.
#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    config: ExecutorConfig,
}

impl Sandbox {
    /// Creates a sandbox.
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// The limits in use.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs `program` with `args`, feeding `stdin` if given.
    ///
    /// Never fails: every problem is reported through [`ExecStatus`].
    pub fn execute(&self, program: &str, args: &[String], stdin: Option<&str>) -> Execution {
        debug!("exec {program} {}", args.join(" "));
        let spawned = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("failed to spawn {program}: {e}");
                return Execution {
                    status: ExecStatus::Failed(e.to_string()),
                    stdout: String::new(),
                    stderr: String::new(),
                };
            }
        };

        // detached: a write stuck on a grandchild's pipe must not block us
        if let (Some(mut pipe), Some(input)) = (child.stdin.take(), stdin) {
            let data = input.to_owned();
            // a child that exits early closes the pipe; ignore EPIPE
            thread::spawn(move || {
                let _ = pipe.write_all(data.as_bytes());
            });
        }

        let overflow = Arc::new(AtomicBool::new(false));
        let limit = self.config.max_output_bytes;
        let stdout = child
            .stdout
            .take()
            .map(|pipe| capture(pipe, limit, Arc::clone(&overflow)));
        let stderr = child
            .stderr
            .take()
            .map(|pipe| capture(pipe, limit, Arc::clone(&overflow)));

        let mut status = wait_with_limits(&mut child, self.config.timeout, &overflow);

        let drain_deadline = Instant::now() + DRAIN_GRACE;
        let stdout = collect(stdout, drain_deadline);
        let stderr = collect(stderr, drain_deadline);

        // the cap may be hit between the last poll and exit, or the child
        // may die of a closed pipe after it
        if status != ExecStatus::TimedOut && overflow.load(Ordering::Relaxed) {
            status = ExecStatus::OutputTooLarge;
        }
        if status != ExecStatus::Success {
            warn!("{program} ended with {status:?}");
        }

        Execution {
            status,
            stdout,
            stderr,
        }
    }
}

/// Output collected by a reader thread.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

fn capture<R: Read + Send + 'static>(
    mut pipe: R,
    limit: usize,
    overflow: Arc<AtomicBool>,
) -> Capture {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (tx, done) = mpsc::channel();
    let shared = Arc::clone(&buf);
    thread::spawn(move || {
        let mut chunk = [0u8; 4096];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    let mut buf = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.len() > limit {
                        buf.truncate(limit);
                        overflow.store(true, Ordering::Relaxed);
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        let _ = tx.send(());
    });
    Capture { buf, done }
}

/// Waits for a reader until `deadline`, then takes whatever it has read.
fn collect(capture: Option<Capture>, deadline: Instant) -> String {
    let Some(capture) = capture else {
        return String::new();
    };
    let wait = deadline.saturating_duration_since(Instant::now());
    if capture.done.recv_timeout(wait).is_err() {
        debug!("output pipe still open after exit; keeping partial output");
    }
    let bytes = capture.buf.lock().unwrap_or_else(PoisonError::into_inner);
    String::from_utf8_lossy(&bytes).into_owned()
}

fn wait_with_limits(child: &mut Child, timeout: Duration, overflow: &AtomicBool) -> ExecStatus {
    let deadline = Instant::now() + timeout;
    loop {
        if overflow.load(Ordering::Relaxed) {
            kill(child);
            return ExecStatus::OutputTooLarge;
        }
        match child.try_wait() {
            Ok(Some(exit)) => {
                return match exit.code() {
                    Some(0) => ExecStatus::Success,
                    Some(code) => ExecStatus::ExitCode(code),
                    None => ExecStatus::Failed(format!("terminated: {exit}")),
                };
            }
            Ok(None) => {}
            Err(e) => {
                kill(child);
                return ExecStatus::Failed(e.to_string());
            }
        }
        if Instant::now() >= deadline {
            kill(child);
            return ExecStatus::TimedOut;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

// ============================================================================
// Command toolchain
// ============================================================================

/// A command line with placeholders.
///
/// `{source}`, `{artifact}` and `{seed}` in the arguments are replaced
/// with the candidate's source path, artifact path and unique seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    /// Program to run.
    pub program: String,
    /// Arguments, with placeholders.
    pub args: Vec<String>,
}

impl CommandTemplate {
    /// Creates a template.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn render(&self, source: &Path, artifact: &Path, seed: u32) -> Vec<String> {
        let source = source.to_string_lossy();
        let artifact = artifact.to_string_lossy();
        let seed = seed.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{source}", &source)
                    .replace("{artifact}", &artifact)
                    .replace("{seed}", &seed)
            })
            .collect()
    }
}

/// Compiles and runs candidates with external commands.
///
/// Each candidate's source is written to
/// `<work_dir>/<seed>_source.<extension>`; the compile command is expected
/// to produce `<work_dir>/<seed>_compiled`. Paths inside diagnostics are
/// shortened to the bare file name so prompts do not leak the work
/// directory.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    sandbox: Sandbox,
    work_dir: PathBuf,
    source_extension: String,
    compile: CommandTemplate,
    run: CommandTemplate,
}

impl CommandToolchain {
    /// Creates a toolchain.
    pub fn new(
        sandbox: Sandbox,
        work_dir: impl Into<PathBuf>,
        source_extension: impl Into<String>,
        compile: CommandTemplate,
        run: CommandTemplate,
    ) -> Self {
        Self {
            sandbox,
            work_dir: work_dir.into(),
            source_extension: source_extension.into(),
            compile,
            run,
        }
    }

    fn source_name(&self) -> String {
        format!("source.{}", self.source_extension)
    }

    fn source_path(&self, seed: u32) -> PathBuf {
        self.work_dir
            .join(format!("{seed}_source.{}", self.source_extension))
    }

    fn artifact_path(&self, seed: u32) -> PathBuf {
        self.work_dir.join(format!("{seed}_compiled"))
    }
}

impl Compiler for CommandToolchain {
    fn compile(&self, candidate: &CodeCandidate) -> Result<String> {
        let seed = candidate.unique_seed;
        let source = self.source_path(seed);
        let artifact = self.artifact_path(seed);
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::write(&source, &candidate.source)?;

        let args = self.compile.render(&source, &artifact, seed);
        let execution = self.sandbox.execute(&self.compile.program, &args, None);
        if execution.succeeded() {
            return Ok(String::new());
        }
        let text = execution.into_text();
        Ok(text.replace(source.to_string_lossy().as_ref(), &self.source_name()))
    }
}

impl Executor for CommandToolchain {
    fn run_compiled(&self, candidate: &CodeCandidate, input: &str) -> Result<String> {
        let seed = candidate.unique_seed;
        let args = self
            .run
            .render(&self.source_path(seed), &self.artifact_path(seed), seed);
        Ok(self
            .sandbox
            .execute(&self.run.program, &args, Some(input))
            .into_text())
    }
}
