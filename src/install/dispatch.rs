//! Procedure selection for a detected host.

use super::mapping::{build_procedure, classify, fallback_id, procedure_id};
use super::{InstallProcedure, InstallerVariant, ManualInstall};
use crate::host::{Architecture, HostProfile, Platform};

/// Outcome of matching a host against a variant's install table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A procedure was selected.
    Selected {
        /// The classified platform.
        platform: Platform,
        /// The primary procedure.
        procedure: InstallProcedure,
        /// What to run if the primary fails, per the variant's policy.
        fallback: Option<InstallProcedure>,
    },
    /// No automatic install is possible; manual steps are suggested.
    Unsupported(ManualInstall),
}

impl Dispatch {
    /// Whether a procedure was selected.
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected { .. })
    }
}

/// Select an install procedure for `profile`.
///
/// Selection is pure: it never runs a command. Unknown hosts, unsupported
/// architectures and releases missing from the variant's table all yield
/// [`Dispatch::Unsupported`].
///
/// # Example
///
/// ```rust
/// use fluent_installer::{dispatch, HostProfile, InstallerVariant};
///
/// let host = HostProfile::new("ubuntu", "22.04", "jammy", "x86_64");
/// assert!(dispatch(&host, InstallerVariant::FluentPackage5).is_selected());
///
/// let host = HostProfile::new("alpine", "3.19.1", "", "x86_64");
/// assert!(!dispatch(&host, InstallerVariant::FluentPackage5).is_selected());
/// ```
pub fn dispatch(profile: &HostProfile, variant: InstallerVariant) -> Dispatch {
    let agent = variant.primary_agent();

    if profile.is_unknown() {
        return unsupported(
            variant,
            "the host operating system could not be identified".to_string(),
        );
    }

    if Architecture::parse(&profile.architecture).is_none() {
        return unsupported(
            variant,
            format!(
                "{} packages are not published for the {} architecture",
                agent.display_name(),
                profile.architecture
            ),
        );
    }

    let Some(platform) = classify(profile) else {
        return unsupported(variant, format!("{} is not a supported distribution release", profile));
    };

    let Some(id) = procedure_id(variant, platform) else {
        return unsupported(
            variant,
            format!("the {} installer does not support {}", variant, platform),
        );
    };

    let fallback = fallback_id(variant, id).map(|fallback| build_procedure(fallback, platform));
    tracing::info!(
        %platform,
        procedure = %id,
        has_fallback = fallback.is_some(),
        "procedure selected"
    );

    Dispatch::Selected {
        platform,
        procedure: build_procedure(id, platform),
        fallback,
    }
}

fn unsupported(variant: InstallerVariant, reason: String) -> Dispatch {
    tracing::warn!(%variant, %reason, "no install procedure");
    let agent = variant.primary_agent();

    let mut steps = vec![
        format!("Check the supported platforms at {}", agent.docs_url()),
        format!(
            "Install the {} package for your distribution by hand",
            agent.display_name()
        ),
    ];
    if variant != InstallerVariant::FluentBit {
        steps.push("Or re-run with --variant fluent-bit".to_string());
    }
    steps.push(format!(
        "Start it with your service manager (service name: {})",
        agent.service_name()
    ));

    Dispatch::Unsupported(ManualInstall {
        reason,
        steps,
        docs_url: agent.docs_url().to_string(),
    })
}
