//! Static install mapping tables.
//!
//! Two layers: [`INSTALL_MAPPING`] turns the detected strings of a
//! [`HostProfile`] into a typed [`Platform`], then [`procedure_id`] picks the
//! variant-specific procedure with an exhaustive `match` over that platform.

use super::types::{InstallProcedure, InstallStep, ProcedureId, StructuredCommand, WORK_DIR};
use super::variant::{FallbackPolicy, InstallerVariant};
use crate::host::{
    AmazonRelease, DebianRelease, HostProfile, Platform, RedHatRelease, UbuntuRelease,
};
use crate::AgentKind;

/// Base URL of the treasuredata toolbelt install scripts.
pub const TOOLBELT_BASE_URL: &str = "https://toolbelt.treasuredata.com/sh";

/// Upstream Fluent Bit install script.
pub const FLUENT_BIT_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/fluent/fluent-bit/master/install.sh";

/// How an entry matches `os_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsMatch {
    /// `os_id` equals the value.
    Exact(&'static str),
    /// `os_id` starts with the value.
    Prefix(&'static str),
    /// The value appears in `ID_LIKE`.
    Like(&'static str),
}

impl OsMatch {
    fn matches(&self, profile: &HostProfile) -> bool {
        match self {
            Self::Exact(id) => profile.os_id == *id,
            Self::Prefix(id) => profile.os_id.starts_with(id),
            Self::Like(id) => profile.id_like.iter().any(|like| like == id),
        }
    }
}

/// How an entry refines on version or codename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMatch {
    /// Any release.
    Any,
    /// Codename equals the value.
    Codename(&'static str),
    /// Major version equals the value.
    Major(&'static str),
}

impl ReleaseMatch {
    fn matches(&self, profile: &HostProfile) -> bool {
        match self {
            Self::Any => true,
            Self::Codename(codename) => profile.codename == *codename,
            Self::Major(major) => profile.major_version() == *major,
        }
    }
}

/// One row of the install mapping.
#[derive(Debug, Clone, Copy)]
pub struct MappingEntry {
    /// Matches on `os_id`; any one suffices.
    pub os: &'static [OsMatch],
    /// Refinement on version or codename.
    pub release: ReleaseMatch,
    /// The platform selected on a match.
    pub platform: Platform,
}

impl MappingEntry {
    fn matches(&self, profile: &HostProfile) -> bool {
        self.os.iter().any(|os| os.matches(profile)) && self.release.matches(profile)
    }
}

const UBUNTU: &[OsMatch] = &[OsMatch::Exact("ubuntu")];
const DEBIAN: &[OsMatch] = &[OsMatch::Exact("debian")];
const ENTERPRISE_LINUX: &[OsMatch] = &[
    OsMatch::Prefix("rhel"),
    OsMatch::Prefix("centos"),
    OsMatch::Exact("rocky"),
    OsMatch::Exact("almalinux"),
    OsMatch::Exact("ol"),
    OsMatch::Like("rhel"),
];
const AMAZON: &[OsMatch] = &[OsMatch::Exact("amzn")];
const ALPINE: &[OsMatch] = &[OsMatch::Exact("alpine")];

/// Ordered host-to-platform table. The first matching row wins.
#[rustfmt::skip]
pub static INSTALL_MAPPING: &[MappingEntry] = &[
    MappingEntry { os: UBUNTU, release: ReleaseMatch::Codename("noble"), platform: Platform::Ubuntu(UbuntuRelease::Noble) },
    MappingEntry { os: UBUNTU, release: ReleaseMatch::Codename("jammy"), platform: Platform::Ubuntu(UbuntuRelease::Jammy) },
    MappingEntry { os: UBUNTU, release: ReleaseMatch::Codename("focal"), platform: Platform::Ubuntu(UbuntuRelease::Focal) },
    MappingEntry { os: UBUNTU, release: ReleaseMatch::Codename("bionic"), platform: Platform::Ubuntu(UbuntuRelease::Bionic) },
    MappingEntry { os: DEBIAN, release: ReleaseMatch::Codename("bookworm"), platform: Platform::Debian(DebianRelease::Bookworm) },
    MappingEntry { os: DEBIAN, release: ReleaseMatch::Codename("bullseye"), platform: Platform::Debian(DebianRelease::Bullseye) },
    MappingEntry { os: DEBIAN, release: ReleaseMatch::Codename("buster"), platform: Platform::Debian(DebianRelease::Buster) },
    MappingEntry { os: AMAZON, release: ReleaseMatch::Major("2023"), platform: Platform::AmazonLinux(AmazonRelease::V2023) },
    MappingEntry { os: AMAZON, release: ReleaseMatch::Major("2"), platform: Platform::AmazonLinux(AmazonRelease::V2) },
    MappingEntry { os: ENTERPRISE_LINUX, release: ReleaseMatch::Major("9"), platform: Platform::RedHat(RedHatRelease::El9) },
    MappingEntry { os: ENTERPRISE_LINUX, release: ReleaseMatch::Major("8"), platform: Platform::RedHat(RedHatRelease::El8) },
    MappingEntry { os: ENTERPRISE_LINUX, release: ReleaseMatch::Major("7"), platform: Platform::RedHat(RedHatRelease::El7) },
    MappingEntry { os: ALPINE, release: ReleaseMatch::Any, platform: Platform::Alpine },
];

/// Classify a host profile into a known platform.
pub fn classify(profile: &HostProfile) -> Option<Platform> {
    INSTALL_MAPPING
        .iter()
        .find(|entry| entry.matches(profile))
        .map(|entry| entry.platform)
}

/// The primary procedure for a variant on a platform, if supported.
pub fn procedure_id(variant: InstallerVariant, platform: Platform) -> Option<ProcedureId> {
    use AmazonRelease::*;
    use DebianRelease::*;
    use UbuntuRelease::*;

    let toolbelt = |agent, script| Some(ProcedureId::ToolbeltScript { agent, script });

    match variant {
        InstallerVariant::TdAgent4 => {
            let agent = AgentKind::TdAgent;
            match platform {
                Platform::Ubuntu(Bionic) => toolbelt(agent, "install-ubuntu-bionic-td-agent4.sh"),
                Platform::Ubuntu(Focal) => toolbelt(agent, "install-ubuntu-focal-td-agent4.sh"),
                Platform::Ubuntu(Jammy) => toolbelt(agent, "install-ubuntu-jammy-td-agent4.sh"),
                Platform::Ubuntu(Noble) => None,
                Platform::Debian(Buster) => toolbelt(agent, "install-debian-buster-td-agent4.sh"),
                Platform::Debian(Bullseye) => {
                    toolbelt(agent, "install-debian-bullseye-td-agent4.sh")
                }
                Platform::Debian(Bookworm) => None,
                Platform::RedHat(_) => toolbelt(agent, "install-redhat-td-agent4.sh"),
                Platform::AmazonLinux(V2) => toolbelt(agent, "install-amazon2-td-agent4.sh"),
                Platform::AmazonLinux(V2023) => None,
                Platform::Alpine => Some(ProcedureId::NativePackage { agent, package: "fluentd" }),
            }
        }
        InstallerVariant::FluentPackage5 => {
            let agent = AgentKind::FluentPackage;
            match platform {
                Platform::Ubuntu(Bionic) => None,
                Platform::Ubuntu(Focal) => {
                    toolbelt(agent, "install-ubuntu-focal-fluent-package5-lts.sh")
                }
                Platform::Ubuntu(Jammy) => {
                    toolbelt(agent, "install-ubuntu-jammy-fluent-package5-lts.sh")
                }
                Platform::Ubuntu(Noble) => {
                    toolbelt(agent, "install-ubuntu-noble-fluent-package5-lts.sh")
                }
                Platform::Debian(Buster) => None,
                Platform::Debian(Bullseye) => {
                    toolbelt(agent, "install-debian-bullseye-fluent-package5-lts.sh")
                }
                Platform::Debian(Bookworm) => {
                    toolbelt(agent, "install-debian-bookworm-fluent-package5-lts.sh")
                }
                Platform::RedHat(_) => toolbelt(agent, "install-redhat-fluent-package5-lts.sh"),
                Platform::AmazonLinux(V2) => {
                    toolbelt(agent, "install-amazon2-fluent-package5-lts.sh")
                }
                Platform::AmazonLinux(V2023) => {
                    toolbelt(agent, "install-amazon2023-fluent-package5-lts.sh")
                }
                Platform::Alpine => None,
            }
        }
        InstallerVariant::FluentBit => match platform {
            Platform::Alpine => Some(ProcedureId::NativePackage {
                agent: AgentKind::FluentBit,
                package: "fluent-bit",
            }),
            Platform::Ubuntu(_)
            | Platform::Debian(_)
            | Platform::RedHat(_)
            | Platform::AmazonLinux(_) => Some(ProcedureId::FluentBitScript),
        },
    }
}

/// The fallback procedure for a primary, per the variant's policy.
pub fn fallback_id(variant: InstallerVariant, primary: ProcedureId) -> Option<ProcedureId> {
    match (variant.fallback_policy(), primary) {
        (FallbackPolicy::None, _) => None,
        (FallbackPolicy::AlpineFluentBitPackage, ProcedureId::NativePackage { .. }) => {
            Some(ProcedureId::NativePackage {
                agent: AgentKind::FluentBit,
                package: "fluent-bit",
            })
        }
        (FallbackPolicy::AlpineFluentBitPackage, _) => None,
        (FallbackPolicy::FluentBitScript, ProcedureId::ToolbeltScript { .. }) => {
            Some(ProcedureId::FluentBitScript)
        }
        (FallbackPolicy::FluentBitScript, _) => None,
    }
}

/// Build the executable steps for a procedure on a platform.
pub fn build_procedure(id: ProcedureId, platform: Platform) -> InstallProcedure {
    let pm = platform.package_manager();

    let steps = match id {
        ProcedureId::ToolbeltScript { script, .. } => {
            script_steps(pm, script, &format!("{}/{}", TOOLBELT_BASE_URL, script))
        }
        ProcedureId::FluentBitScript => {
            script_steps(pm, "fluent-bit-install.sh", FLUENT_BIT_SCRIPT_URL)
        }
        ProcedureId::NativePackage { package, .. } => vec![
            InstallStep::non_fatal(
                format!("Refreshing {} package index", pm),
                pm.update_command(),
            ),
            InstallStep::fatal(
                format!("Installing package {}", package),
                pm.install_command(package),
            ),
        ],
    };

    InstallProcedure {
        id,
        agent: id.agent(),
        steps,
    }
}

/// Download into the executor's private work directory, then run.
fn script_steps(pm: super::PackageManager, script: &str, url: &str) -> Vec<InstallStep> {
    let target = format!("{}/{}", WORK_DIR, script);

    vec![
        InstallStep::non_fatal(format!("Refreshing {} package index", pm), pm.update_command()),
        InstallStep::non_fatal("Installing curl", pm.install_command("curl")),
        InstallStep::fatal(
            format!("Downloading {}", script),
            StructuredCommand::new("curl", ["-fsSL", "-o", target.as_str(), url]),
        ),
        InstallStep::fatal(
            format!("Running {}", script),
            StructuredCommand::new("sh", [target.as_str()]),
        ),
    ]
}
