//! Post-install status checks: service state, listening port, version.
//!
//! Every check here is read-only and degrades to an `Unknown` state rather
//! than failing.

use super::manager::ServiceManager;
use super::version::agent_version;
use crate::install::StructuredCommand;
use crate::runner::CommandRunner;
use crate::AgentKind;
use semver::Version;
use serde::Serialize;

/// Whether the agent's service is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceState {
    Running,
    Stopped,
    /// The state could not be queried.
    Unknown,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        })
    }
}

/// Whether something is listening on the agent's port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortState {
    Listening(u16),
    Closed(u16),
    /// Neither `ss` nor `netstat` could be used.
    Unknown(u16),
}

impl PortState {
    /// The checked port.
    pub fn port(&self) -> u16 {
        match self {
            Self::Listening(port) | Self::Closed(port) | Self::Unknown(port) => *port,
        }
    }
}

impl std::fmt::Display for PortState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listening(port) => write!(f, "listening on {}", port),
            Self::Closed(port) => write!(f, "nothing listening on {}", port),
            Self::Unknown(port) => write!(f, "port {} not checked", port),
        }
    }
}

/// Snapshot of the installed agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub agent: AgentKind,
    pub service: ServiceState,
    pub port: PortState,
    /// `None` when the version could not be determined.
    pub version: Option<Version>,
}

/// Query service state, port and version for `agent`.
///
/// `port` defaults to [`AgentKind::default_port`].
pub async fn report_status<R: CommandRunner>(
    runner: &R,
    manager: Option<ServiceManager>,
    agent: AgentKind,
    port: Option<u16>,
) -> StatusReport {
    let service = service_state(runner, manager, agent.service_name()).await;
    let port = port_state(runner, port.unwrap_or_else(|| agent.default_port())).await;
    let version = match agent_version(runner, agent).await {
        Ok(version) => Some(version),
        Err(e) => {
            tracing::warn!(agent = agent.display_name(), error = %e, "agent version unavailable");
            None
        }
    };

    StatusReport {
        agent,
        service,
        port,
        version,
    }
}

/// Ask the service manager whether `service` is running.
pub async fn service_state<R: CommandRunner>(
    runner: &R,
    manager: Option<ServiceManager>,
    service: &str,
) -> ServiceState {
    let Some(manager) = manager else {
        return ServiceState::Unknown;
    };

    match runner.run(&manager.status_command(service)).await {
        // `is-active` prints the state; its exit code is non-zero for
        // anything but active, so only stdout is consulted.
        Ok(output) if manager == ServiceManager::Systemd => {
            if output.stdout.trim() == "active" {
                ServiceState::Running
            } else {
                ServiceState::Stopped
            }
        }
        Ok(output) if output.is_success() => ServiceState::Running,
        Ok(_) => ServiceState::Stopped,
        Err(e) => {
            tracing::warn!(service, error = %e, "service status query failed");
            ServiceState::Unknown
        }
    }
}

/// Check whether a listening TCP socket exists on `port`.
pub async fn port_state<R: CommandRunner>(runner: &R, port: u16) -> PortState {
    for program in ["ss", "netstat"] {
        if !runner.has_program(program) {
            continue;
        }
        let command = StructuredCommand::new(program, ["-ltn"]);
        match runner.run(&command).await {
            Ok(output) if output.is_success() => {
                return if is_listening(&output.stdout, port) {
                    PortState::Listening(port)
                } else {
                    PortState::Closed(port)
                };
            }
            Ok(output) => {
                tracing::debug!(program, exit_code = ?output.exit_code, "socket listing failed");
            }
            Err(e) => tracing::debug!(program, error = %e, "socket listing failed"),
        }
    }
    tracing::warn!(port, "neither ss nor netstat is usable");
    PortState::Unknown(port)
}

/// Whether a local address column in `listing` ends in `:<port>`.
fn is_listening(listing: &str, port: u16) -> bool {
    let suffix = format!(":{}", port);
    listing
        .lines()
        .flat_map(str::split_whitespace)
        .any(|field| field.ends_with(&suffix))
}
