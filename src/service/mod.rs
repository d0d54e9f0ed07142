//! Service start-up and post-install status.

mod manager;
mod status;
mod version;

pub use manager::{start_service, ServiceManager, ServiceStart};
pub use status::{port_state, report_status, service_state, PortState, ServiceState, StatusReport};
pub use version::{agent_version, VersionError};
