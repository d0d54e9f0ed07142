//! Run options configuration.
//!
//! This module provides the [`RunOptions`] struct controlling one
//! installer run: which variant to install, command timeouts, cosmetic
//! pacing and where release files are read from.

use crate::InstallerVariant;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration options for an installer run.
///
/// # Default Behavior
///
/// The default variant is fluent-package 5 (LTS). Each external command
/// may run for up to 10 minutes, since vendor scripts download and install
/// whole package repositories. Release files are read from `/`.
///
/// # Example
///
/// ```rust
/// use fluent_installer::{InstallerVariant, RunOptions};
/// use std::time::Duration;
///
/// // Defaults: fluent-package5, 10 minute timeout, paced output
/// let opts = RunOptions::default();
///
/// // Fluent Bit without cosmetic delays
/// let opts = RunOptions {
///     variant: InstallerVariant::FluentBit,
///     pace: Duration::ZERO,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Which installer variant to run.
    ///
    /// Default: [`InstallerVariant::FluentPackage5`]
    pub variant: InstallerVariant,

    /// Limit for each external command.
    ///
    /// Default: 10 minutes
    pub timeout: Duration,

    /// Port checked after start-up instead of the agent's default.
    pub port: Option<u16>,

    /// Cosmetic delay between pipeline stages. Zero disables pacing.
    ///
    /// Default: 300 milliseconds
    pub pace: Duration,

    /// Print commands instead of running them.
    pub dry_run: bool,

    /// Directory release files and `run/systemd` are resolved against.
    ///
    /// Default: `/`
    pub root: PathBuf,

    /// Continue without root privileges.
    pub skip_root_check: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            variant: InstallerVariant::default(),
            timeout: Duration::from_secs(600),
            port: None,
            pace: Duration::from_millis(300),
            dry_run: false,
            root: PathBuf::from("/"),
            skip_root_check: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = RunOptions::default();
        assert_eq!(opts.variant, InstallerVariant::FluentPackage5);
        assert_eq!(opts.timeout, Duration::from_secs(600));
        assert_eq!(opts.root, PathBuf::from("/"));
        assert!(opts.port.is_none());
        assert!(!opts.dry_run);
        assert!(!opts.skip_root_check);
    }

    #[test]
    fn test_struct_update() {
        let opts = RunOptions {
            variant: InstallerVariant::TdAgent4,
            pace: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(opts.variant, InstallerVariant::TdAgent4);
        assert!(opts.pace.is_zero());
        assert_eq!(opts.timeout, Duration::from_secs(600));
    }
}
