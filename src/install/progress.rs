//! Progress reporting types for installation operations.
//!
//! The [`InstallProgress`] enum represents discrete stages of an install
//! procedure, reported through a callback as they happen.

use crate::AgentKind;

/// Progress stages during agent installation.
///
/// # Example
///
/// ```rust
/// use fluent_installer::InstallProgress;
///
/// fn on_progress(progress: InstallProgress) {
///     match &progress {
///         InstallProgress::StepStarted { index, total, description } => {
///             println!("[{}/{}] {}", index + 1, total, description);
///         }
///         InstallProgress::StepWarning { description, message } => {
///             println!("warning: {}: {}", description, message);
///         }
///         other => println!("{}", other.description()),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum InstallProgress {
    /// A procedure has started.
    Started {
        /// The agent being installed.
        agent: AgentKind,
    },

    /// A step is about to run.
    StepStarted {
        /// Zero-based step index.
        index: usize,
        /// Number of steps in the procedure.
        total: usize,
        /// Step description.
        description: String,
    },

    /// A step completed successfully.
    StepSucceeded {
        /// Step description.
        description: String,
    },

    /// A non-fatal step failed; the procedure continues.
    StepWarning {
        /// Step description.
        description: String,
        /// What went wrong.
        message: String,
    },

    /// The primary procedure failed and the fallback is starting.
    FallingBack {
        /// The agent the fallback installs.
        agent: AgentKind,
        /// Why the primary failed.
        reason: String,
    },

    /// A procedure completed successfully.
    Completed {
        /// The agent that was installed.
        agent: AgentKind,
    },
}

impl InstallProgress {
    /// Get a human-readable description of the current progress stage.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fluent_installer::{AgentKind, InstallProgress};
    ///
    /// let progress = InstallProgress::Started { agent: AgentKind::FluentBit };
    /// assert_eq!(progress.description(), "Starting installation");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::Started { .. } => "Starting installation",
            Self::StepStarted { .. } => "Running step",
            Self::StepSucceeded { .. } => "Step succeeded",
            Self::StepWarning { .. } => "Step failed, continuing",
            Self::FallingBack { .. } => "Falling back",
            Self::Completed { .. } => "Installation complete",
        }
    }
}
