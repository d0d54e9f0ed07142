//! Release-file based host detection with fallback sources.

use super::profile::HostProfile;
use super::release::{
    debian_codename, default_codename, parse_key_values, parse_redhat_release, ubuntu_codename,
};
use std::fs;
use std::path::{Path, PathBuf};

/// os-release locations, most specific first.
const OS_RELEASE_PATHS: &[&str] = &["etc/os-release", "usr/lib/os-release"];

/// Detects the host operating system from release files under a root.
///
/// Detection never fails: each source is tried in turn and a host with no
/// recognisable files yields [`HostProfile::unknown`].
///
/// # Example
///
/// ```rust,no_run
/// use fluent_installer::Detector;
///
/// let profile = Detector::new("/").detect();
/// println!("Detected {}", profile);
/// ```
#[derive(Debug, Clone)]
pub struct Detector {
    root: PathBuf,
    architecture: String,
}

impl Detector {
    /// Create a detector reading release files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            architecture: std::env::consts::ARCH.to_string(),
        }
    }

    /// Override the reported architecture.
    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = architecture.into();
        self
    }

    /// Produce the host profile.
    pub fn detect(&self) -> HostProfile {
        let profile = self
            .from_os_release()
            .or_else(|| self.from_lsb_release())
            .or_else(|| self.from_alpine_release())
            .or_else(|| self.from_redhat_release())
            .or_else(|| self.from_debian_version());

        match profile {
            Some(profile) => {
                let profile = fill_codename(profile);
                tracing::debug!(%profile, "host detected");
                profile
            }
            None => {
                tracing::warn!(root = %self.root.display(), "no recognisable release files");
                HostProfile::unknown()
            }
        }
    }

    fn read(&self, relative: &str) -> Option<String> {
        let path = self.root.join(relative);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "release file unavailable");
                None
            }
        }
    }

    fn from_os_release(&self) -> Option<HostProfile> {
        let content = OS_RELEASE_PATHS.iter().find_map(|p| self.read(p))?;
        let fields = parse_key_values(&content);
        let id = fields.get("ID").filter(|id| !id.is_empty())?;

        let version = fields.get("VERSION_ID").cloned().unwrap_or_default();
        let codename = fields
            .get("VERSION_CODENAME")
            .or_else(|| fields.get("UBUNTU_CODENAME"))
            .cloned()
            .unwrap_or_default();
        let id_like = fields
            .get("ID_LIKE")
            .map(|like| like.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();

        let profile = HostProfile::new(id.as_str(), version, codename, &self.architecture);
        Some(profile.with_id_like(id_like))
    }

    fn from_lsb_release(&self) -> Option<HostProfile> {
        let fields = parse_key_values(&self.read("etc/lsb-release")?);
        let id = fields.get("DISTRIB_ID").filter(|id| !id.is_empty())?;
        Some(HostProfile::new(
            id.as_str(),
            fields.get("DISTRIB_RELEASE").cloned().unwrap_or_default(),
            fields.get("DISTRIB_CODENAME").cloned().unwrap_or_default(),
            &self.architecture,
        ))
    }

    fn from_alpine_release(&self) -> Option<HostProfile> {
        let version = self.read("etc/alpine-release")?;
        Some(HostProfile::new("alpine", version.trim(), "", &self.architecture))
    }

    fn from_redhat_release(&self) -> Option<HostProfile> {
        let (id, version) = parse_redhat_release(&self.read("etc/redhat-release")?)?;
        Some(HostProfile::new(id, version, "", &self.architecture).with_id_like(["rhel"]))
    }

    fn from_debian_version(&self) -> Option<HostProfile> {
        let version = self.read("etc/debian_version")?;
        Some(HostProfile::new("debian", version.trim(), "", &self.architecture))
    }
}

/// Derive a missing Ubuntu/Debian codename from the version, falling back to
/// the distribution default.
fn fill_codename(mut profile: HostProfile) -> HostProfile {
    if !profile.codename.is_empty() {
        return profile;
    }

    let derived = match profile.os_id.as_str() {
        "ubuntu" => ubuntu_codename(&profile.os_version),
        "debian" => debian_codename(&profile.os_version),
        _ => return profile,
    };

    let codename = derived.or_else(|| default_codename(&profile.os_id));
    if derived.is_none() {
        tracing::warn!(
            os = %profile.os_id,
            version = %profile.os_version,
            "release not recognised, assuming default codename"
        );
    }
    if let Some(codename) = codename {
        profile.codename = codename.to_string();
    }
    profile
}

/// Detect the host from the real filesystem root.
pub fn detect_host() -> HostProfile {
    Detector::new(Path::new("/")).detect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &TempDir, relative: &str, content: &str) {
        let path = root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn detect(root: &TempDir) -> HostProfile {
        Detector::new(root.path()).with_architecture("x86_64").detect()
    }

    #[test]
    fn test_empty_root_is_unknown() {
        let root = TempDir::new().unwrap();
        assert!(detect(&root).is_unknown());
    }

    #[test]
    fn test_os_release_ubuntu() {
        let root = TempDir::new().unwrap();
        write(
            &root,
            "etc/os-release",
            "ID=ubuntu\nID_LIKE=debian\nVERSION_ID=\"22.04\"\nVERSION_CODENAME=jammy\n",
        );
        let profile = detect(&root);
        let expected =
            HostProfile::new("ubuntu", "22.04", "jammy", "x86_64").with_id_like(["debian"]);
        assert_eq!(profile, expected);
    }

    #[test]
    fn test_usr_lib_os_release_fallback() {
        let root = TempDir::new().unwrap();
        write(&root, "usr/lib/os-release", "ID=debian\nVERSION_ID=\"12\"\n");
        let profile = detect(&root);
        assert_eq!(profile.os_id, "debian");
        assert_eq!(profile.codename, "bookworm");
    }

    #[test]
    fn test_ubuntu_codename_from_ubuntu_codename_field() {
        let root = TempDir::new().unwrap();
        write(&root, "etc/os-release", "ID=ubuntu\nVERSION_ID=\"20.04\"\nUBUNTU_CODENAME=focal\n");
        assert_eq!(detect(&root).codename, "focal");
    }

    #[test]
    fn test_missing_codename_derived_from_version() {
        let root = TempDir::new().unwrap();
        write(&root, "etc/os-release", "ID=ubuntu\nVERSION_ID=\"24.04\"\n");
        assert_eq!(detect(&root).codename, "noble");
    }

    #[test]
    fn test_unrecognised_version_uses_default_codename() {
        let root = TempDir::new().unwrap();
        write(&root, "etc/os-release", "ID=ubuntu\n");
        assert_eq!(detect(&root).codename, "jammy");
    }

    #[test]
    fn test_lsb_release() {
        let root = TempDir::new().unwrap();
        write(
            &root,
            "etc/lsb-release",
            "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=18.04\nDISTRIB_CODENAME=bionic\n",
        );
        let profile = detect(&root);
        assert_eq!(profile.os_id, "ubuntu");
        assert_eq!(profile.os_version, "18.04");
        assert_eq!(profile.codename, "bionic");
    }

    #[test]
    fn test_alpine_release() {
        let root = TempDir::new().unwrap();
        write(&root, "etc/alpine-release", "3.19.1\n");
        let profile = detect(&root);
        assert_eq!(profile.os_id, "alpine");
        assert_eq!(profile.os_version, "3.19.1");
        assert!(profile.codename.is_empty());
    }

    #[test]
    fn test_redhat_release() {
        let root = TempDir::new().unwrap();
        write(&root, "etc/redhat-release", "CentOS Linux release 7.9.2009 (Core)\n");
        let profile = detect(&root);
        assert_eq!(profile.os_id, "centos");
        assert_eq!(profile.major_version(), "7");
        assert_eq!(profile.id_like, vec!["rhel".to_string()]);
    }

    #[test]
    fn test_debian_version() {
        let root = TempDir::new().unwrap();
        write(&root, "etc/debian_version", "11.8\n");
        let profile = detect(&root);
        assert_eq!(profile.os_id, "debian");
        assert_eq!(profile.codename, "bullseye");
    }

    #[test]
    fn test_os_release_without_id_falls_through() {
        let root = TempDir::new().unwrap();
        write(&root, "etc/os-release", "NAME=Something\n");
        write(&root, "etc/alpine-release", "3.18.0\n");
        assert_eq!(detect(&root).os_id, "alpine");
    }
}
