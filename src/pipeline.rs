//! The installer pipeline.
//!
//! `CheckPrivileges -> Detect -> Dispatch -> Install -> StartService ->
//! Report -> Info`. Stages run strictly in sequence and each one is
//! announced through a [`PipelineEvent`] callback, keeping all terminal
//! output out of this module.

use crate::host::{Detector, HostProfile, Platform};
use crate::install::{
    dispatch, execute, Dispatch, InstallProcedure, InstallProgress, ManualInstall,
};
use crate::privilege::Identity;
use crate::runner::CommandRunner;
use crate::service::{report_status, start_service, ServiceManager, ServiceStart, StatusReport};
use crate::{AgentKind, RunOptions};
use strum::IntoEnumIterator;
use thiserror::Error;

/// Conditions that end the pipeline before anything is installed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineError {
    /// Not running with root privileges.
    #[error("root privileges are required (effective uid {euid}); re-run with sudo")]
    NotElevated {
        /// The effective uid found.
        euid: u32,
    },

    /// The operating system could not be identified.
    #[error("unsupported host: the operating system could not be identified")]
    UnknownHost,

    /// The host is known but the variant has no procedure for it.
    #[error("manual installation required: {}", .0.reason)]
    Unsupported(ManualInstall),
}

impl PipelineError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotElevated { .. } | Self::UnknownHost | Self::Unsupported(_) => 1,
        }
    }
}

/// A pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter)]
pub enum Stage {
    CheckPrivileges,
    Detect,
    Dispatch,
    Install,
    StartService,
    Report,
}

impl Stage {
    /// One-based position of the stage.
    pub fn number(&self) -> usize {
        Self::iter().position(|s| s == *self).map_or(0, |i| i + 1)
    }

    /// Number of stages.
    pub fn count() -> usize {
        Self::iter().count()
    }

    /// Short label shown next to the progress bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CheckPrivileges => "Checking privileges",
            Self::Detect => "Detecting operating system",
            Self::Dispatch => "Selecting installer",
            Self::Install => "Installing",
            Self::StartService => "Starting service",
            Self::Report => "Checking status",
        }
    }
}

/// Something the pipeline wants shown to the operator.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A stage is starting.
    StageStarted(Stage),
    /// Root check was bypassed.
    PrivilegeCheckSkipped,
    /// The host was identified.
    HostDetected(HostProfile),
    /// A procedure was chosen.
    ProcedureSelected {
        platform: Platform,
        procedure: InstallProcedure,
        fallback: Option<InstallProcedure>,
    },
    /// Progress from the install executor.
    Install(InstallProgress),
    /// The install failed for good.
    InstallFailed {
        message: String,
        fix: String,
    },
    /// Service start-up finished (successfully or not).
    ServiceStarted(ServiceStart),
    /// Status checks finished.
    Status(StatusReport),
    /// Usage information for the installed agent is due.
    Info {
        agent: AgentKind,
        manager: Option<ServiceManager>,
        port: u16,
    },
}

/// What a completed pipeline produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The agent actually installed, `None` when installation failed.
    pub installed: Option<AgentKind>,
    /// Service start result, `None` when start-up was skipped.
    pub service: Option<ServiceStart>,
    /// Final status snapshot.
    pub status: StatusReport,
}

impl RunOutcome {
    /// Whether the agent was installed and its service started.
    pub fn is_healthy(&self) -> bool {
        self.installed.is_some() && self.service.as_ref().is_some_and(ServiceStart::is_started)
    }
}

/// Run the installer pipeline.
///
/// Returns `Err` only for the conditions that map to exit status 1:
/// missing privileges, an unidentified host, or no procedure for the
/// host. An install or service failure still completes the run; it is
/// reported through `on_event` and visible in the [`RunOutcome`].
pub async fn run<R, F>(
    runner: &R,
    identity: Identity,
    options: &RunOptions,
    on_event: F,
) -> Result<RunOutcome, PipelineError>
where
    R: CommandRunner,
    F: Fn(PipelineEvent),
{
    on_event(PipelineEvent::StageStarted(Stage::CheckPrivileges));
    if options.skip_root_check || options.dry_run {
        tracing::warn!(euid = identity.euid, "skipping root check");
        on_event(PipelineEvent::PrivilegeCheckSkipped);
    } else if !identity.is_elevated() {
        return Err(PipelineError::NotElevated {
            euid: identity.euid,
        });
    }
    pace(options).await;

    on_event(PipelineEvent::StageStarted(Stage::Detect));
    let host = Detector::new(&options.root).detect();
    tracing::info!(%host, "host detected");
    if host.is_unknown() {
        return Err(PipelineError::UnknownHost);
    }
    on_event(PipelineEvent::HostDetected(host.clone()));
    pace(options).await;

    on_event(PipelineEvent::StageStarted(Stage::Dispatch));
    let (platform, procedure, fallback) = match dispatch(&host, options.variant) {
        Dispatch::Selected {
            platform,
            procedure,
            fallback,
        } => (platform, procedure, fallback),
        Dispatch::Unsupported(manual) => return Err(PipelineError::Unsupported(manual)),
    };
    on_event(PipelineEvent::ProcedureSelected {
        platform,
        procedure: procedure.clone(),
        fallback: fallback.clone(),
    });
    pace(options).await;

    on_event(PipelineEvent::StageStarted(Stage::Install));
    let installed = match execute(runner, &procedure, fallback.as_ref(), |p| {
        on_event(PipelineEvent::Install(p))
    })
    .await
    {
        Ok(agent) => Some(agent),
        Err(e) => {
            tracing::error!(error = %e, "installation failed");
            on_event(PipelineEvent::InstallFailed {
                message: e.to_string(),
                fix: e.fix_suggestion().to_string(),
            });
            None
        }
    };
    pace(options).await;

    let manager = ServiceManager::detect(runner, &options.root);
    let service = match installed {
        Some(agent) => {
            on_event(PipelineEvent::StageStarted(Stage::StartService));
            let start = start_service(runner, manager, agent.service_name()).await;
            on_event(PipelineEvent::ServiceStarted(start.clone()));
            pace(options).await;
            Some(start)
        }
        None => None,
    };

    on_event(PipelineEvent::StageStarted(Stage::Report));
    let agent = installed.unwrap_or_else(|| options.variant.primary_agent());
    let status = report_status(runner, manager, agent, options.port).await;
    on_event(PipelineEvent::Status(status.clone()));

    on_event(PipelineEvent::Info {
        agent,
        manager,
        port: status.port.port(),
    });

    Ok(RunOutcome {
        installed,
        service,
        status,
    })
}

async fn pace(options: &RunOptions) {
    if !options.pace.is_zero() && !options.dry_run {
        tokio::time::sleep(options.pace).await;
    }
}
