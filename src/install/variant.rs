//! Installer variants and their fallback policies.

use crate::AgentKind;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Which agent release line to install.
///
/// Each variant carries its own support table and its own
/// [`FallbackPolicy`]; the two are never merged across variants.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum InstallerVariant {
    /// td-agent 4 from the treasuredata toolbelt; Alpine via `apk`.
    TdAgent4,
    /// fluent-package 5 LTS from the treasuredata toolbelt.
    #[default]
    FluentPackage5,
    /// Fluent Bit from its upstream install script; Alpine via `apk`.
    FluentBit,
}

/// What to try when the primary procedure fails fatally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FallbackPolicy {
    /// No fallback; a fatal failure ends the install.
    None,
    /// Native package installs fall back to the `fluent-bit` package.
    /// Script installs have no fallback.
    AlpineFluentBitPackage,
    /// Script installs fall back to the Fluent Bit install script.
    FluentBitScript,
}

impl InstallerVariant {
    /// Stable name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TdAgent4 => "td-agent4",
            Self::FluentPackage5 => "fluent-package5",
            Self::FluentBit => "fluent-bit",
        }
    }

    /// The agent this variant installs when nothing falls back.
    pub fn primary_agent(&self) -> AgentKind {
        match self {
            Self::TdAgent4 => AgentKind::TdAgent,
            Self::FluentPackage5 => AgentKind::FluentPackage,
            Self::FluentBit => AgentKind::FluentBit,
        }
    }

    /// The fallback policy bound to this variant.
    ///
    /// ```rust
    /// use fluent_installer::{FallbackPolicy, InstallerVariant};
    ///
    /// assert_eq!(
    ///     InstallerVariant::FluentPackage5.fallback_policy(),
    ///     FallbackPolicy::FluentBitScript
    /// );
    /// assert_eq!(InstallerVariant::FluentBit.fallback_policy(), FallbackPolicy::None);
    /// ```
    pub fn fallback_policy(&self) -> FallbackPolicy {
        match self {
            Self::TdAgent4 => FallbackPolicy::AlpineFluentBitPackage,
            Self::FluentPackage5 => FallbackPolicy::FluentBitScript,
            Self::FluentBit => FallbackPolicy::None,
        }
    }

    /// Iterator over all variants.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}

impl std::fmt::Display for InstallerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
