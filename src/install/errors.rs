//! Error types for installation operations.
//!
//! Each error variant includes an actionable fix suggestion to help users
//! resolve the issue by hand.

use std::time::Duration;
use thiserror::Error;

/// Errors that abort an install procedure.
///
/// Each variant includes contextual information about what went wrong and
/// a `fix` field with an actionable suggestion for resolving the issue.
///
/// # Example
///
/// ```rust
/// use fluent_installer::InstallError;
///
/// fn handle_error(error: InstallError) {
///     eprintln!("Installation failed: {}", error);
///     eprintln!("To fix: {}", error.fix_suggestion());
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// A program the step needs is not installed.
    #[error("Required program not found: {program}")]
    ProgramMissing {
        /// The missing executable.
        program: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A download failed or stderr points at a connectivity problem.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
        /// Standard error output from the failed command, if available.
        stderr: Option<String>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// Permission was denied running a step.
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Description of what permission was denied.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A step did not complete within the configured timeout.
    #[error("Step timed out after {duration:?}")]
    Timeout {
        /// How long the step was allowed to run.
        duration: Duration,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A step exited unsuccessfully.
    #[error("Installation step failed: {message}")]
    InstallerFailed {
        /// Description of the failure.
        message: String,
        /// Exit code, if the process exited normally.
        exit_code: Option<i32>,
        /// Standard output, if captured.
        stdout: Option<String>,
        /// Standard error, if captured.
        stderr: Option<String>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The private download directory could not be created.
    #[error("Cannot create work directory: {message}")]
    WorkDir {
        /// Underlying I/O failure.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// Both the primary and the fallback procedure failed.
    #[error("Primary install failed ({primary}) and fallback failed ({fallback})")]
    FallbackFailed {
        /// Why the primary procedure failed.
        primary: Box<InstallError>,
        /// Why the fallback procedure failed.
        fallback: Box<InstallError>,
    },
}

impl InstallError {
    /// Get an actionable suggestion for fixing this error.
    ///
    /// For [`InstallError::FallbackFailed`] this is the primary failure's
    /// suggestion.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fluent_installer::InstallError;
    /// use std::time::Duration;
    ///
    /// let error = InstallError::Timeout {
    ///     duration: Duration::from_secs(600),
    ///     fix: "Try again with a longer --timeout or check network connectivity".to_string(),
    /// };
    /// assert!(error.fix_suggestion().contains("timeout"));
    /// ```
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::ProgramMissing { fix, .. } => fix,
            Self::Network { fix, .. } => fix,
            Self::PermissionDenied { fix, .. } => fix,
            Self::Timeout { fix, .. } => fix,
            Self::InstallerFailed { fix, .. } => fix,
            Self::WorkDir { fix, .. } => fix,
            Self::FallbackFailed { primary, .. } => primary.fix_suggestion(),
        }
    }
}
