//! External command execution.
//!
//! Every package manager, vendor script and service manager call goes
//! through [`CommandRunner`], so the pipeline can be driven by a real
//! process runner, a dry-run printer, or a recording mock in tests.

use crate::install::StructuredCommand;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal.
    pub exit_code: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed output with the given exit code and stderr.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with status 0.
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Reasons a command could not produce an exit status.
#[derive(Debug, Error)]
pub enum RunError {
    /// The program does not exist.
    #[error("{program}: command not found")]
    NotFound {
        /// The program that was looked up.
        program: String,
    },

    /// The program exists but could not be executed.
    #[error("{program}: permission denied")]
    PermissionDenied {
        /// The program that was executed.
        program: String,
    },

    /// The program did not finish in time and was killed.
    #[error("{program} timed out after {duration:?}")]
    Timeout {
        /// The program that was executed.
        program: String,
        /// The configured limit.
        duration: Duration,
    },

    /// Any other spawn or wait failure.
    #[error("{program}: {source}")]
    Io {
        /// The program that was executed.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Runs external commands on behalf of the installer.
///
/// Implementations only report what happened; interpreting exit codes is
/// up to the caller.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a command to completion and capture its output.
    async fn run(&self, command: &StructuredCommand) -> Result<CommandOutput, RunError>;

    /// Whether `program` can be found on this host.
    fn has_program(&self, program: &str) -> bool;
}

impl<R: CommandRunner> CommandRunner for &R {
    async fn run(&self, command: &StructuredCommand) -> Result<CommandOutput, RunError> {
        (**self).run(command).await
    }

    fn has_program(&self, program: &str) -> bool {
        (**self).has_program(program)
    }
}

/// Runs commands as real child processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    /// Create a runner that kills commands running longer than `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, cmd: &StructuredCommand) -> Result<CommandOutput, RunError> {
        tracing::debug!(command = %cmd, "running");

        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .envs(cmd.env_vars.iter().cloned())
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                let program = cmd.program.clone();
                return Err(match e.kind() {
                    std::io::ErrorKind::NotFound => RunError::NotFound { program },
                    std::io::ErrorKind::PermissionDenied => RunError::PermissionDenied { program },
                    _ => RunError::Io { program, source: e },
                });
            }
            Err(_) => {
                return Err(RunError::Timeout {
                    program: cmd.program.clone(),
                    duration: self.timeout,
                });
            }
        };

        let output = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        tracing::debug!(command = %cmd, exit_code = ?output.exit_code, "finished");
        Ok(output)
    }

    fn has_program(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Logs commands instead of running them and reports success.
///
/// Program lookups still consult the real `PATH` so service-manager
/// detection reflects the host.
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    async fn run(&self, cmd: &StructuredCommand) -> Result<CommandOutput, RunError> {
        tracing::info!(command = %cmd, "dry run, not executing");
        Ok(CommandOutput::success(""))
    }

    fn has_program(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
