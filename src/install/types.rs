//! Type definitions for install procedures.
//!
//! An [`InstallProcedure`] is a named, ordered list of [`InstallStep`]s, each
//! wrapping a [`StructuredCommand`] and a [`Severity`] that decides whether
//! its failure aborts the procedure.

use crate::AgentKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder for the private per-run work directory in command arguments.
///
/// Procedures are built without touching the filesystem; the executor
/// substitutes the real directory with [`StructuredCommand::in_work_dir`].
pub const WORK_DIR: &str = "${WORK_DIR}";

/// A structured command for programmatic execution.
///
/// # Example
///
/// ```rust
/// use fluent_installer::StructuredCommand;
///
/// let cmd = StructuredCommand::new("apt-get", ["install", "-y", "curl"]);
/// assert_eq!(cmd.program, "apt-get");
/// assert_eq!(cmd.to_string(), "apt-get install -y curl");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredCommand {
    /// The program to execute (e.g., "apt-get", "sh", "systemctl").
    pub program: String,

    /// Arguments to pass to the program.
    pub args: Vec<String>,

    /// Environment variables to set before execution (key, value pairs).
    pub env_vars: Vec<(String, String)>,
}

impl StructuredCommand {
    /// Build a command with no extra environment.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env_vars: Vec::new(),
        }
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Copy of this command with a leading [`WORK_DIR`] in each argument
    /// replaced by `dir`.
    pub fn in_work_dir(&self, dir: &Path) -> Self {
        let dir = dir.to_string_lossy();
        let args = self
            .args
            .iter()
            .map(|arg| match arg.strip_prefix(WORK_DIR) {
                Some(rest) => format!("{}{}", dir, rest),
                None => arg.clone(),
            })
            .collect();
        Self {
            program: self.program.clone(),
            args,
            env_vars: self.env_vars.clone(),
        }
    }
}

impl std::fmt::Display for StructuredCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in &self.env_vars {
            write!(f, "{}={} ", key, value)?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Whether a failing step aborts the procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Failure aborts the remaining steps.
    Fatal,
    /// Failure is reported as a warning and the next step runs.
    NonFatal,
}

/// One action inside an install procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStep {
    /// Short description shown while the step runs.
    pub description: String,

    /// The command to execute.
    pub command: StructuredCommand,

    /// Whether failure aborts the procedure.
    pub severity: Severity,
}

impl InstallStep {
    /// A step whose failure aborts the procedure.
    pub fn fatal(description: impl Into<String>, command: StructuredCommand) -> Self {
        Self {
            description: description.into(),
            command,
            severity: Severity::Fatal,
        }
    }

    /// A step whose failure is only a warning.
    pub fn non_fatal(description: impl Into<String>, command: StructuredCommand) -> Self {
        Self {
            description: description.into(),
            command,
            severity: Severity::NonFatal,
        }
    }
}

/// Identifies a procedure in the install tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProcedureId {
    /// Download and run a treasuredata.com toolbelt script.
    ToolbeltScript {
        /// The agent the script installs.
        agent: AgentKind,
        /// Script name, e.g. `install-ubuntu-jammy-td-agent4.sh`.
        script: &'static str,
    },
    /// Download and run the Fluent Bit install script.
    FluentBitScript,
    /// Install a package with the native package manager.
    NativePackage {
        /// The agent the package provides.
        agent: AgentKind,
        /// Package name.
        package: &'static str,
    },
}

impl ProcedureId {
    /// The agent this procedure installs.
    pub fn agent(&self) -> AgentKind {
        match self {
            Self::ToolbeltScript { agent, .. } | Self::NativePackage { agent, .. } => *agent,
            Self::FluentBitScript => AgentKind::FluentBit,
        }
    }
}

impl std::fmt::Display for ProcedureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolbeltScript { script, .. } => write!(f, "toolbelt script {}", script),
            Self::FluentBitScript => write!(f, "Fluent Bit install script"),
            Self::NativePackage { package, .. } => write!(f, "native package {}", package),
        }
    }
}

/// A fully built install procedure, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallProcedure {
    /// Which table entry produced this procedure.
    pub id: ProcedureId,

    /// The agent installed on success.
    pub agent: AgentKind,

    /// Steps, executed in order.
    pub steps: Vec<InstallStep>,
}

impl InstallProcedure {
    /// The remote script URL, for script-based procedures.
    pub fn script_url(&self) -> Option<&str> {
        self.steps
            .iter()
            .flat_map(|step| step.command.args.iter())
            .find(|arg| arg.starts_with("https://"))
            .map(String::as_str)
    }
}

/// Manual-installation guidance for an unsupported host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualInstall {
    /// Why automatic installation is not possible.
    pub reason: String,

    /// Suggested manual steps, in order.
    pub steps: Vec<String>,

    /// Where to read more.
    pub docs_url: String,
}
