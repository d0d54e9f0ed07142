//! Host profile describing the detected operating system.

use serde::{Deserialize, Serialize};

/// `os_id` of the sentinel profile returned when nothing was recognised.
pub const UNKNOWN_OS: &str = "unknown";

/// The detected operating system identity.
///
/// Built once by the [`Detector`](crate::Detector) and passed by reference
/// to every later stage. Identifiers are lowercased (`ubuntu`, `centos`,
/// `amzn`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfile {
    /// Distribution identifier, as in the `ID` field of os-release.
    pub os_id: String,

    /// Version string (`22.04`, `2023`, `3.19.1`). Empty when unknown.
    pub os_version: String,

    /// Release codename (`jammy`, `bookworm`). Empty when the distribution
    /// has none.
    pub codename: String,

    /// Machine architecture (`x86_64`, `aarch64`).
    pub architecture: String,

    /// Related distribution identifiers, from `ID_LIKE`.
    pub id_like: Vec<String>,
}

impl HostProfile {
    /// Build a profile from its parts, normalising case.
    pub fn new(
        os_id: impl Into<String>,
        os_version: impl Into<String>,
        codename: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            os_id: os_id.into().to_lowercase(),
            os_version: os_version.into(),
            codename: codename.into().to_lowercase(),
            architecture: architecture.into(),
            id_like: Vec::new(),
        }
    }

    /// Attach `ID_LIKE` identifiers.
    pub fn with_id_like<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_like = ids.into_iter().map(|s| s.into().to_lowercase()).collect();
        self
    }

    /// The sentinel profile for an unrecognised host.
    ///
    /// ```rust
    /// use fluent_installer::HostProfile;
    ///
    /// assert!(HostProfile::unknown().is_unknown());
    /// ```
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_OS, "", "", std::env::consts::ARCH)
    }

    /// Whether this is the unknown sentinel.
    pub fn is_unknown(&self) -> bool {
        self.os_id == UNKNOWN_OS
    }

    /// Major component of the version (`"7"` for `7.9.2009`).
    pub fn major_version(&self) -> &str {
        self.os_version.split('.').next().unwrap_or("")
    }
}

impl std::fmt::Display for HostProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.os_id)?;
        if !self.os_version.is_empty() {
            write!(f, " {}", self.os_version)?;
        }
        if !self.codename.is_empty() {
            write!(f, " ({})", self.codename)?;
        }
        write!(f, " [{}]", self.architecture)
    }
}
