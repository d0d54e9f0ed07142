//! Agent version lookup.

use crate::install::StructuredCommand;
use crate::runner::CommandRunner;
use crate::AgentKind;
use regex::Regex;
use semver::Version;
use thiserror::Error;

/// Reasons the installed agent's version could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The agent executable could not be run.
    #[error("failed to run `{command}`: {message}")]
    NotRunnable {
        /// The version command.
        command: String,
        /// Underlying failure.
        message: String,
    },

    /// The executable exited with a non-zero status.
    #[error("`{command}` exited with code {exit_code:?}")]
    ExitFailure {
        /// The version command.
        command: String,
        /// Exit code, if any.
        exit_code: Option<i32>,
    },

    /// No `major.minor.patch` triple was found in the output.
    #[error("no version number in output")]
    Unparseable,
}

/// Parse a semantic version from CLI output.
///
/// Handles the formats the agents print:
///
/// - `td-agent 4.5.2 fluentd 1.16.3 (d3cf2e0f95a0ad88b9897197db6c5152310f114f)` -> 4.5.2
/// - `fluentd 1.16.5` -> 1.16.5
/// - `Fluent Bit v3.0.4` -> 3.0.4
pub(crate) fn parse_version(output: &str) -> Result<Version, VersionError> {
    let re = Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("Invalid regex pattern");

    let caps = re.captures(output).ok_or(VersionError::Unparseable)?;
    let version_str = caps.get(0).map(|m| m.as_str()).ok_or(VersionError::Unparseable)?;
    Version::parse(version_str).map_err(|_| VersionError::Unparseable)
}

/// The first of the agent's executables the runner can find.
///
/// Falls back to the bare name so a missing agent still yields a
/// readable [`VersionError::NotRunnable`].
fn resolve_executable<R: CommandRunner>(runner: &R, agent: AgentKind) -> &'static str {
    let candidates = agent.executable_candidates();
    candidates
        .iter()
        .copied()
        .find(|candidate| runner.has_program(candidate))
        .unwrap_or(candidates[0])
}

/// Run `<executable> --version` for `agent` and parse the result.
pub async fn agent_version<R: CommandRunner>(
    runner: &R,
    agent: AgentKind,
) -> Result<Version, VersionError> {
    let executable = resolve_executable(runner, agent);
    tracing::debug!(agent = agent.display_name(), executable, "reading agent version");
    let command = StructuredCommand::new(executable, ["--version"]);
    let output = runner
        .run(&command)
        .await
        .map_err(|e| VersionError::NotRunnable {
            command: command.to_string(),
            message: e.to_string(),
        })?;

    if !output.is_success() {
        return Err(VersionError::ExitFailure {
            command: command.to_string(),
            exit_code: output.exit_code,
        });
    }

    // Some builds print the banner on stderr.
    parse_version(&output.stdout).or_else(|_| parse_version(&output.stderr))
}
