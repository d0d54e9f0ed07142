//! Agent kind enum identifying the installable log agents.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// The log-collection agent being installed.
///
/// Fluentd ships under two package names depending on the release line
/// (`td-agent` 4 and `fluent-package` 5 LTS); they are modelled as separate
/// kinds because their service names, paths and tooling differ.
///
/// # Example
///
/// ```rust
/// use fluent_installer::AgentKind;
///
/// for kind in AgentKind::all() {
///     println!("{}: service {}", kind.display_name(), kind.service_name());
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
#[non_exhaustive]
pub enum AgentKind {
    /// Fluentd packaged as td-agent 4.
    TdAgent,
    /// Fluentd packaged as fluent-package 5 (LTS).
    FluentPackage,
    /// Fluent Bit.
    FluentBit,
}

impl AgentKind {
    /// The service unit / init script name.
    ///
    /// ```rust
    /// use fluent_installer::AgentKind;
    ///
    /// assert_eq!(AgentKind::TdAgent.service_name(), "td-agent");
    /// assert_eq!(AgentKind::FluentPackage.service_name(), "fluentd");
    /// ```
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::TdAgent => "td-agent",
            Self::FluentPackage => "fluentd",
            Self::FluentBit => "fluent-bit",
        }
    }

    /// Executables that answer `--version`, in lookup order.
    ///
    /// The packages install outside `PATH` on some platforms (the Fluent
    /// Bit script puts its binary under `/opt/fluent-bit/bin`), so the bare
    /// name is followed by the packaged locations.
    pub fn executable_candidates(&self) -> &'static [&'static str] {
        match self {
            Self::TdAgent => &["td-agent", "/usr/sbin/td-agent", "/opt/td-agent/bin/td-agent"],
            Self::FluentPackage => &["fluentd", "/usr/sbin/fluentd", "/opt/fluent/bin/fluentd"],
            Self::FluentBit => &["fluent-bit", "/opt/fluent-bit/bin/fluent-bit"],
        }
    }

    /// Human-readable display name for the agent.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TdAgent => "td-agent 4",
            Self::FluentPackage => "fluent-package 5 (LTS)",
            Self::FluentBit => "Fluent Bit",
        }
    }

    /// Main configuration file written by the package.
    pub fn config_path(&self) -> &'static str {
        match self {
            Self::TdAgent => "/etc/td-agent/td-agent.conf",
            Self::FluentPackage => "/etc/fluent/fluentd.conf",
            Self::FluentBit => "/etc/fluent-bit/fluent-bit.conf",
        }
    }

    /// The file the packaged agent logs to.
    ///
    /// `None` for Fluent Bit, which writes to stdout unless `Log_File` is
    /// set in its configuration.
    pub fn log_file(&self) -> Option<&'static str> {
        match self {
            Self::TdAgent => Some("/var/log/td-agent/td-agent.log"),
            Self::FluentPackage => Some("/var/log/fluent/fluentd.log"),
            Self::FluentBit => None,
        }
    }

    /// Command for installing additional plugins, when the agent has one.
    pub fn plugin_command(&self) -> Option<&'static str> {
        match self {
            Self::TdAgent => Some("td-agent-gem install <plugin>"),
            Self::FluentPackage => Some("fluent-gem install <plugin>"),
            Self::FluentBit => None,
        }
    }

    /// Port the stock configuration listens on.
    ///
    /// Fluentd's forward input uses 24224; Fluent Bit's HTTP monitoring
    /// server uses 2020.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::TdAgent | Self::FluentPackage => 24224,
            Self::FluentBit => 2020,
        }
    }

    /// Upstream documentation.
    pub fn docs_url(&self) -> &'static str {
        match self {
            Self::TdAgent => "https://docs.fluentd.org/installation",
            Self::FluentPackage => "https://docs.fluentd.org/installation",
            Self::FluentBit => "https://docs.fluentbit.io/manual/installation/linux",
        }
    }

    /// Iterator over all known agent kinds.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}
