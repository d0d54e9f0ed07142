//! Elevated-privilege check.

/// Environment variable that skips the root check (development only).
pub const SKIP_ROOT_CHECK_ENV: &str = "FLUENT_INSTALLER_SKIP_ROOT_CHECK";

/// The effective identity the installer runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Effective user id.
    pub euid: u32,
}

impl Identity {
    /// The identity of the current process.
    pub fn current() -> Self {
        Self {
            euid: nix::unistd::geteuid().as_raw(),
        }
    }

    /// The root identity.
    pub fn root() -> Self {
        Self { euid: 0 }
    }

    /// Whether package managers and service managers may be driven.
    pub fn is_elevated(&self) -> bool {
        self.euid == 0
    }
}

/// Whether [`SKIP_ROOT_CHECK_ENV`] asks for the check to be skipped.
pub fn should_skip_root_check() -> bool {
    std::env::var(SKIP_ROOT_CHECK_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_elevated() {
        assert!(Identity::root().is_elevated());
        assert!(!Identity { euid: 1000 }.is_elevated());
    }

    #[test]
    fn test_current_matches_nix() {
        assert_eq!(Identity::current().euid, nix::unistd::geteuid().as_raw());
    }
}
