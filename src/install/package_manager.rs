//! Native package manager commands.

use super::StructuredCommand;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Package managers the installer drives directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageManager {
    /// APT (Debian/Ubuntu)
    Apt,
    /// YUM (CentOS 7, Amazon Linux 2)
    Yum,
    /// DNF (Enterprise Linux 8+, Amazon Linux 2023)
    Dnf,
    /// APK (Alpine Linux)
    Apk,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl PackageManager {
    /// The executable name.
    pub fn program(&self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Yum => "yum",
            Self::Dnf => "dnf",
            Self::Apk => "apk",
        }
    }

    /// Refresh the package index.
    ///
    /// YUM and DNF refresh metadata with `makecache`; their `update`
    /// subcommand would upgrade every installed package.
    pub fn update_command(&self) -> StructuredCommand {
        match self {
            Self::Apt => StructuredCommand::new("apt-get", ["update"])
                .env("DEBIAN_FRONTEND", "noninteractive"),
            Self::Yum => StructuredCommand::new("yum", ["makecache"]),
            Self::Dnf => StructuredCommand::new("dnf", ["makecache"]),
            Self::Apk => StructuredCommand::new("apk", ["update"]),
        }
    }

    /// Install a package non-interactively.
    ///
    /// ```rust
    /// use fluent_installer::PackageManager;
    ///
    /// let cmd = PackageManager::Apk.install_command("fluent-bit");
    /// assert_eq!(cmd.to_string(), "apk add --no-cache fluent-bit");
    /// ```
    pub fn install_command(&self, package: &str) -> StructuredCommand {
        match self {
            Self::Apt => StructuredCommand::new("apt-get", ["install", "-y", package])
                .env("DEBIAN_FRONTEND", "noninteractive"),
            Self::Yum => StructuredCommand::new("yum", ["install", "-y", package]),
            Self::Dnf => StructuredCommand::new("dnf", ["install", "-y", package]),
            Self::Apk => StructuredCommand::new("apk", ["add", "--no-cache", package]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apt_commands_are_noninteractive() {
        let update = PackageManager::Apt.update_command();
        assert_eq!(update.program, "apt-get");
        assert_eq!(update.args, vec!["update"]);
        assert!(update
            .env_vars
            .contains(&("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())));

        let install = PackageManager::Apt.install_command("curl");
        assert_eq!(install.args, vec!["install", "-y", "curl"]);
    }

    #[test]
    fn test_yum_and_dnf_use_makecache() {
        assert_eq!(PackageManager::Yum.update_command().args, vec!["makecache"]);
        assert_eq!(PackageManager::Dnf.update_command().args, vec!["makecache"]);
        assert_eq!(
            PackageManager::Dnf.install_command("curl").to_string(),
            "dnf install -y curl"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PackageManager::Apt.to_string(), "apt-get");
        assert_eq!(PackageManager::Apk.to_string(), "apk");
    }
}
