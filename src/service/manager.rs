//! Service manager detection and service start-up.

use crate::install::StructuredCommand;
use crate::runner::CommandRunner;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A host facility that starts and enables daemons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceManager {
    /// systemd via `systemctl`.
    Systemd,
    /// OpenRC via `rc-service` / `rc-update`.
    OpenRc,
    /// SysV init via `service`.
    SysV,
}

impl ServiceManager {
    /// Find the service manager, preferring systemd over legacy init.
    ///
    /// systemd only counts when it is actually the running init
    /// (`<root>/run/systemd/system` exists), not merely installed.
    pub fn detect<R: CommandRunner>(runner: &R, root: &Path) -> Option<Self> {
        let systemd_running = root.join("run/systemd/system").is_dir();
        let manager = if runner.has_program("systemctl") && systemd_running {
            Some(Self::Systemd)
        } else if runner.has_program("rc-service") {
            Some(Self::OpenRc)
        } else if runner.has_program("service") {
            Some(Self::SysV)
        } else {
            None
        };
        tracing::debug!(?manager, "service manager detected");
        manager
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Systemd => "systemd",
            Self::OpenRc => "OpenRC",
            Self::SysV => "SysV init",
        }
    }

    /// Command starting `service`.
    pub fn start_command(&self, service: &str) -> StructuredCommand {
        match self {
            Self::Systemd => StructuredCommand::new("systemctl", ["start", service]),
            Self::OpenRc => StructuredCommand::new("rc-service", [service, "start"]),
            Self::SysV => StructuredCommand::new("service", [service, "start"]),
        }
    }

    /// Command enabling `service` at boot, if this host has a tool for it.
    pub fn enable_command<R: CommandRunner>(
        &self,
        runner: &R,
        service: &str,
    ) -> Option<StructuredCommand> {
        match self {
            Self::Systemd => Some(StructuredCommand::new("systemctl", ["enable", service])),
            Self::OpenRc => Some(StructuredCommand::new("rc-update", ["add", service, "default"])),
            Self::SysV if runner.has_program("chkconfig") => {
                Some(StructuredCommand::new("chkconfig", [service, "on"]))
            }
            Self::SysV if runner.has_program("update-rc.d") => {
                Some(StructuredCommand::new("update-rc.d", [service, "defaults"]))
            }
            Self::SysV => None,
        }
    }

    /// Command querying whether `service` is running.
    pub fn status_command(&self, service: &str) -> StructuredCommand {
        match self {
            Self::Systemd => StructuredCommand::new("systemctl", ["is-active", service]),
            Self::OpenRc => StructuredCommand::new("rc-service", [service, "status"]),
            Self::SysV => StructuredCommand::new("service", [service, "status"]),
        }
    }

    /// Commands an operator would use to control `service` by hand.
    pub fn control_commands(&self, service: &str) -> Vec<String> {
        ["start", "stop", "restart", "status"]
            .iter()
            .map(|action| match self {
                Self::Systemd => format!("systemctl {} {}", action, service),
                Self::OpenRc => format!("rc-service {} {}", service, action),
                Self::SysV => format!("service {} {}", service, action),
            })
            .collect()
    }

    /// How to read a service's captured output, when this manager keeps it.
    pub fn journal_command(&self, service: &str) -> Option<String> {
        match self {
            Self::Systemd => Some(format!("journalctl -u {}", service)),
            Self::OpenRc | Self::SysV => None,
        }
    }
}

impl std::fmt::Display for ServiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of starting the agent's service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStart {
    /// The service started.
    Started {
        /// The manager that started it.
        manager: ServiceManager,
        /// Whether enabling at boot also succeeded.
        enabled: bool,
    },
    /// The start command failed.
    Failed {
        /// The manager that was asked.
        manager: ServiceManager,
        /// What went wrong.
        message: String,
    },
    /// No supported service manager was found.
    NoManager,
}

impl ServiceStart {
    /// Whether the service was started.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

/// Start and enable `service` through `manager`.
///
/// No retries: a failed start is reported and left to the operator. A
/// failed enable only clears the `enabled` flag.
pub async fn start_service<R: CommandRunner>(
    runner: &R,
    manager: Option<ServiceManager>,
    service: &str,
) -> ServiceStart {
    let Some(manager) = manager else {
        tracing::warn!(service, "no service manager found");
        return ServiceStart::NoManager;
    };

    let start = manager.start_command(service);
    match runner.run(&start).await {
        Ok(output) if output.is_success() => {}
        Ok(output) => {
            let message = format!(
                "`{}` exited with code {:?}: {}",
                start,
                output.exit_code,
                output.stderr.trim()
            );
            tracing::error!(%message, "service start failed");
            return ServiceStart::Failed { manager, message };
        }
        Err(e) => {
            tracing::error!(error = %e, "service start failed");
            return ServiceStart::Failed {
                manager,
                message: e.to_string(),
            };
        }
    }

    let enabled = match manager.enable_command(runner, service) {
        Some(enable) => match runner.run(&enable).await {
            Ok(output) if output.is_success() => true,
            Ok(output) => {
                tracing::warn!(command = %enable, exit_code = ?output.exit_code, "enable failed");
                false
            }
            Err(e) => {
                tracing::warn!(command = %enable, error = %e, "enable failed");
                false
            }
        },
        None => {
            tracing::warn!(service, "no tool to enable service at boot");
            false
        }
    };

    tracing::info!(service, %manager, enabled, "service started");
    ServiceStart::Started { manager, enabled }
}
