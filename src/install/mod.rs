//! Agent installation.
//!
//! Selection and execution are separate: [`dispatch`] maps a
//! [`HostProfile`](crate::HostProfile) to an [`InstallProcedure`] without
//! side effects, and [`execute`] runs it through a
//! [`CommandRunner`](crate::CommandRunner).
//!
//! # Example
//!
//! ```rust,no_run
//! use fluent_installer::{dispatch, execute, Dispatch, Detector, InstallerVariant, SystemRunner};
//! use std::time::Duration;
//!
//! # async fn run() {
//! let host = Detector::new("/").detect();
//! match dispatch(&host, InstallerVariant::default()) {
//!     Dispatch::Selected { procedure, fallback, .. } => {
//!         let runner = SystemRunner::new(Duration::from_secs(600));
//!         let result = execute(&runner, &procedure, fallback.as_ref(), |_| {}).await;
//!         println!("{:?}", result.map(|agent| agent.service_name()));
//!     }
//!     Dispatch::Unsupported(manual) => println!("{}", manual.reason),
//! }
//! # }
//! ```

mod dispatch;
mod errors;
mod executor;
mod mapping;
mod package_manager;
mod progress;
mod types;
mod variant;

pub use dispatch::{dispatch, Dispatch};
pub use errors::InstallError;
pub use executor::execute;
pub use mapping::{
    build_procedure, classify, fallback_id, procedure_id, MappingEntry, OsMatch, ReleaseMatch,
    FLUENT_BIT_SCRIPT_URL, INSTALL_MAPPING, TOOLBELT_BASE_URL,
};
pub use package_manager::PackageManager;
pub use progress::InstallProgress;
pub use types::{
    InstallProcedure, InstallStep, ManualInstall, ProcedureId, Severity, StructuredCommand,
    WORK_DIR,
};
pub use variant::{FallbackPolicy, InstallerVariant};
