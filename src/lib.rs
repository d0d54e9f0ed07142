//! # fluent-installer
//!
//! Installs a Fluentd-family log agent (td-agent 4, fluent-package 5 LTS or
//! Fluent Bit) on a Linux host, starts its service and reports its status.
//!
//! This crate provides the pieces the `fluent-installer` binary is built
//! from, usable on their own:
//!
//! ## Features
//!
//! - `Detector` / `HostProfile` for reading the host's release files
//! - `dispatch()` mapping a host and `InstallerVariant` to an install procedure
//! - `execute()` running a procedure with fallback through a `CommandRunner`
//! - `ServiceManager`, `start_service()` and `report_status()` for start-up
//!   and post-install checks
//! - `pipeline::run()` driving all of the above in order
//!
//! ## Example
//!
//! ```rust,no_run
//! use fluent_installer::{pipeline, Identity, RunOptions, SystemRunner};
//!
//! # async fn run() {
//! let options = RunOptions::default();
//! let runner = SystemRunner::new(options.timeout);
//!
//! let on_event = |event| println!("{:?}", event);
//! match pipeline::run(&runner, Identity::current(), &options, on_event).await {
//!     Ok(outcome) => println!("installed: {:?}", outcome.installed),
//!     Err(e) => eprintln!("{} (exit {})", e, e.exit_code()),
//! }
//! # }
//! ```

mod agent_kind;
mod host;
mod install;
mod options;
pub mod pipeline;
pub mod privilege;
pub mod report;
mod runner;
mod service;

pub use agent_kind::AgentKind;
pub use host::{
    detect_host, AmazonRelease, Architecture, DebianRelease, Detector, HostProfile, Platform,
    RedHatRelease, UbuntuRelease, UNKNOWN_OS,
};
pub use install::{
    build_procedure, classify, dispatch, execute, fallback_id, procedure_id, Dispatch,
    FallbackPolicy, InstallError, InstallProcedure, InstallProgress, InstallStep,
    InstallerVariant, ManualInstall, MappingEntry, OsMatch, PackageManager, ProcedureId,
    ReleaseMatch, Severity, StructuredCommand, FLUENT_BIT_SCRIPT_URL, INSTALL_MAPPING,
    TOOLBELT_BASE_URL, WORK_DIR,
};
pub use options::RunOptions;
pub use pipeline::{PipelineError, PipelineEvent, RunOutcome, Stage};
pub use privilege::Identity;
pub use runner::{CommandOutput, CommandRunner, DryRunRunner, RunError, SystemRunner};
pub use service::{
    agent_version, port_state, report_status, service_state, start_service, PortState,
    ServiceManager, ServiceStart, ServiceState, StatusReport, VersionError,
};
