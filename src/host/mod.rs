//! Host operating system detection.
//!
//! - `HostProfile`: the immutable detected OS identity
//! - `Detector`: release-file inspection with fallbacks
//! - `Platform`: typed classification of supported distributions

mod detector;
mod platform;
mod profile;
mod release;

pub use detector::{detect_host, Detector};
pub use platform::{
    AmazonRelease, Architecture, DebianRelease, Platform, RedHatRelease, UbuntuRelease,
};
pub use profile::{HostProfile, UNKNOWN_OS};
