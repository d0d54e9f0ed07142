//! Typed classification of supported distributions.

use crate::install::PackageManager;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Ubuntu LTS releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum UbuntuRelease {
    /// 18.04
    Bionic,
    /// 20.04
    Focal,
    /// 22.04
    Jammy,
    /// 24.04
    Noble,
}

impl UbuntuRelease {
    /// Lowercase codename as used in package repositories.
    pub fn codename(&self) -> &'static str {
        match self {
            Self::Bionic => "bionic",
            Self::Focal => "focal",
            Self::Jammy => "jammy",
            Self::Noble => "noble",
        }
    }
}

/// Debian stable releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum DebianRelease {
    /// Debian 10
    Buster,
    /// Debian 11
    Bullseye,
    /// Debian 12
    Bookworm,
}

impl DebianRelease {
    /// Lowercase codename as used in package repositories.
    pub fn codename(&self) -> &'static str {
        match self {
            Self::Buster => "buster",
            Self::Bullseye => "bullseye",
            Self::Bookworm => "bookworm",
        }
    }
}

/// Enterprise Linux major versions (RHEL, CentOS, Rocky, AlmaLinux).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum RedHatRelease {
    El7,
    El8,
    El9,
}

/// Amazon Linux generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum AmazonRelease {
    /// Amazon Linux 2
    V2,
    /// Amazon Linux 2023
    V2023,
}

/// A distribution release the installer knows about.
///
/// Whether a given installer variant actually supports a platform is
/// decided by that variant's procedure table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Ubuntu(UbuntuRelease),
    Debian(DebianRelease),
    RedHat(RedHatRelease),
    AmazonLinux(AmazonRelease),
    Alpine,
}

impl Platform {
    /// Every platform, for exhaustive table checks.
    pub fn all() -> impl Iterator<Item = Self> {
        UbuntuRelease::iter()
            .map(Self::Ubuntu)
            .chain(DebianRelease::iter().map(Self::Debian))
            .chain(RedHatRelease::iter().map(Self::RedHat))
            .chain(AmazonRelease::iter().map(Self::AmazonLinux))
            .chain(std::iter::once(Self::Alpine))
    }

    /// The native package manager on this platform.
    pub fn package_manager(&self) -> PackageManager {
        match self {
            Self::Ubuntu(_) | Self::Debian(_) => PackageManager::Apt,
            Self::RedHat(RedHatRelease::El7) | Self::AmazonLinux(AmazonRelease::V2) => {
                PackageManager::Yum
            }
            Self::RedHat(_) | Self::AmazonLinux(AmazonRelease::V2023) => PackageManager::Dnf,
            Self::Alpine => PackageManager::Apk,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ubuntu(r) => write!(f, "Ubuntu {}", r.codename()),
            Self::Debian(r) => write!(f, "Debian {}", r.codename()),
            Self::RedHat(RedHatRelease::El7) => write!(f, "Enterprise Linux 7"),
            Self::RedHat(RedHatRelease::El8) => write!(f, "Enterprise Linux 8"),
            Self::RedHat(RedHatRelease::El9) => write!(f, "Enterprise Linux 9"),
            Self::AmazonLinux(AmazonRelease::V2) => write!(f, "Amazon Linux 2"),
            Self::AmazonLinux(AmazonRelease::V2023) => write!(f, "Amazon Linux 2023"),
            Self::Alpine => write!(f, "Alpine Linux"),
        }
    }
}

/// CPU architectures with published agent packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    X86_64,
    Aarch64,
}

impl Architecture {
    /// Parse a `uname -m` / Debian-style architecture name.
    ///
    /// ```rust
    /// use fluent_installer::Architecture;
    ///
    /// assert_eq!(Architecture::parse("amd64"), Some(Architecture::X86_64));
    /// assert_eq!(Architecture::parse("arm64"), Some(Architecture::Aarch64));
    /// assert_eq!(Architecture::parse("s390x"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "x86_64" | "amd64" => Some(Self::X86_64),
            "aarch64" | "arm64" => Some(Self::Aarch64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_platforms_enumerated() {
        let all: Vec<_> = Platform::all().collect();
        assert_eq!(all.len(), 4 + 3 + 3 + 2 + 1);
        assert!(all.contains(&Platform::Ubuntu(UbuntuRelease::Jammy)));
        assert!(all.contains(&Platform::Alpine));
    }

    #[test]
    fn test_package_managers() {
        assert_eq!(
            Platform::Ubuntu(UbuntuRelease::Focal).package_manager(),
            PackageManager::Apt
        );
        assert_eq!(
            Platform::RedHat(RedHatRelease::El7).package_manager(),
            PackageManager::Yum
        );
        assert_eq!(
            Platform::RedHat(RedHatRelease::El9).package_manager(),
            PackageManager::Dnf
        );
        assert_eq!(
            Platform::AmazonLinux(AmazonRelease::V2).package_manager(),
            PackageManager::Yum
        );
        assert_eq!(
            Platform::AmazonLinux(AmazonRelease::V2023).package_manager(),
            PackageManager::Dnf
        );
        assert_eq!(Platform::Alpine.package_manager(), PackageManager::Apk);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Platform::Debian(DebianRelease::Bookworm).to_string(),
            "Debian bookworm"
        );
        assert_eq!(
            Platform::AmazonLinux(AmazonRelease::V2023).to_string(),
            "Amazon Linux 2023"
        );
    }
}
