//! Install procedure execution.
//!
//! This module provides [`execute`], which runs a procedure step by step
//! through a [`CommandRunner`], tolerating non-fatal failures and switching
//! to the fallback procedure when a fatal step fails.

use super::{InstallError, InstallProcedure, InstallProgress, InstallStep, Severity};
use crate::runner::{CommandOutput, CommandRunner, RunError};
use crate::AgentKind;
use std::path::Path;
use tempfile::TempDir;

/// Run an install procedure, then its fallback if the primary fails.
///
/// Steps run strictly in order. A failing [`Severity::NonFatal`] step is
/// reported as [`InstallProgress::StepWarning`] and the next step runs; a
/// failing [`Severity::Fatal`] step aborts the procedure. When `fallback`
/// is given it runs after a primary failure, and an error is returned only
/// if both fail.
///
/// # Returns
///
/// The agent that ended up installed.
///
/// # Example
///
/// ```rust,no_run
/// use fluent_installer::{
///     build_procedure, execute, procedure_id, InstallerVariant, Platform, SystemRunner,
///     UbuntuRelease,
/// };
/// use std::time::Duration;
///
/// # async fn run() {
/// let platform = Platform::Ubuntu(UbuntuRelease::Jammy);
/// let id = procedure_id(InstallerVariant::FluentPackage5, platform).unwrap();
/// let procedure = build_procedure(id, platform);
/// let runner = SystemRunner::new(Duration::from_secs(600));
///
/// match execute(&runner, &procedure, None, |p| println!("{:?}", p)).await {
///     Ok(agent) => println!("{} installed", agent.display_name()),
///     Err(e) => println!("Failed: {}. Fix: {}", e, e.fix_suggestion()),
/// }
/// # }
/// ```
pub async fn execute<R, F>(
    runner: &R,
    procedure: &InstallProcedure,
    fallback: Option<&InstallProcedure>,
    on_progress: F,
) -> Result<AgentKind, InstallError>
where
    R: CommandRunner,
    F: Fn(InstallProgress),
{
    let work_dir = create_work_dir()?;
    tracing::debug!(work_dir = %work_dir.path().display(), "created work directory");

    let primary_error = match run_procedure(runner, procedure, work_dir.path(), &on_progress).await
    {
        Ok(()) => return Ok(procedure.agent),
        Err(e) => e,
    };

    let Some(fallback) = fallback else {
        return Err(primary_error);
    };

    tracing::warn!(
        error = %primary_error,
        fallback = %fallback.id,
        "primary install failed, trying fallback"
    );
    on_progress(InstallProgress::FallingBack {
        agent: fallback.agent,
        reason: primary_error.to_string(),
    });

    match run_procedure(runner, fallback, work_dir.path(), &on_progress).await {
        Ok(()) => Ok(fallback.agent),
        Err(fallback_error) => Err(InstallError::FallbackFailed {
            primary: Box::new(primary_error),
            fallback: Box::new(fallback_error),
        }),
    }
}

/// A fresh `0700` directory, removed when dropped, that downloads land in.
fn create_work_dir() -> Result<TempDir, InstallError> {
    tempfile::Builder::new()
        .prefix("fluent-installer-")
        .tempdir()
        .map_err(|e| InstallError::WorkDir {
            message: e.to_string(),
            fix: "Check that the temporary directory (TMPDIR) exists and is writable".to_string(),
        })
}

async fn run_procedure<R, F>(
    runner: &R,
    procedure: &InstallProcedure,
    work_dir: &Path,
    on_progress: &F,
) -> Result<(), InstallError>
where
    R: CommandRunner,
    F: Fn(InstallProgress),
{
    on_progress(InstallProgress::Started {
        agent: procedure.agent,
    });

    let total = procedure.steps.len();
    for (index, step) in procedure.steps.iter().enumerate() {
        on_progress(InstallProgress::StepStarted {
            index,
            total,
            description: step.description.clone(),
        });

        match run_step(runner, step, work_dir).await {
            Ok(()) => on_progress(InstallProgress::StepSucceeded {
                description: step.description.clone(),
            }),
            Err(e) if step.severity == Severity::NonFatal => {
                tracing::warn!(step = %step.description, error = %e, "non-fatal step failed");
                on_progress(InstallProgress::StepWarning {
                    description: step.description.clone(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(step = %step.description, error = %e, "install step failed");
                return Err(e);
            }
        }
    }

    on_progress(InstallProgress::Completed {
        agent: procedure.agent,
    });
    Ok(())
}

async fn run_step<R: CommandRunner>(
    runner: &R,
    step: &InstallStep,
    work_dir: &Path,
) -> Result<(), InstallError> {
    let output = runner
        .run(&step.command.in_work_dir(work_dir))
        .await
        .map_err(from_run_error)?;
    if output.is_success() {
        return Ok(());
    }
    Err(from_failed_output(step, output))
}

fn from_run_error(error: RunError) -> InstallError {
    match error {
        RunError::NotFound { program } => InstallError::ProgramMissing {
            fix: format!("Install {} with the system package manager and re-run", program),
            program,
        },
        RunError::PermissionDenied { program } => InstallError::PermissionDenied {
            message: format!("cannot execute {}", program),
            fix: "Re-run the installer as root (sudo)".to_string(),
        },
        RunError::Timeout { duration, .. } => InstallError::Timeout {
            duration,
            fix: format!(
                "Step timed out after {:?}. Try again with a longer --timeout or check network.",
                duration
            ),
        },
        RunError::Io { program, source } => InstallError::InstallerFailed {
            message: format!("{}: {}", program, source),
            exit_code: None,
            stdout: None,
            stderr: None,
            fix: "Check the command and try again".to_string(),
        },
    }
}

fn from_failed_output(step: &InstallStep, output: CommandOutput) -> InstallError {
    let stderr = output.stderr;

    // curl reports every fetch problem through its exit code
    let is_network = step.command.program == "curl"
        || stderr.contains("Could not resolve")
        || stderr.contains("Temporary failure resolving")
        || stderr.contains("Connection refused")
        || stderr.contains("Connection timed out")
        || stderr.contains("Network is unreachable");

    if is_network {
        return InstallError::Network {
            message: format!("{} failed (exit {:?})", step.description, output.exit_code),
            stderr: Some(stderr),
            fix: "Check internet access, proxy settings and that the download URL is reachable"
                .to_string(),
        };
    }

    InstallError::InstallerFailed {
        message: format!("{} exited with code {:?}", step.description, output.exit_code),
        exit_code: output.exit_code,
        stdout: Some(output.stdout),
        stderr: Some(stderr),
        fix: format!("Run `{}` by hand to see the full output", step.command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::{ProcedureId, StructuredCommand, WORK_DIR};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Returns canned results keyed by program and records every call.
    #[derive(Default)]
    struct ScriptedRunner {
        results: HashMap<String, CommandOutput>,
        missing: Vec<String>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        fn fail(mut self, command: &str, code: i32) -> Self {
            self.results
                .insert(command.to_string(), CommandOutput::failure(code, "boom"));
            self
        }

        fn missing(mut self, program: &str) -> Self {
            self.missing.push(program.to_string());
            self
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(&self, command: &StructuredCommand) -> Result<CommandOutput, RunError> {
            let line = command.to_string();
            self.calls.borrow_mut().push(line.clone());
            if self.missing.contains(&command.program) {
                return Err(RunError::NotFound {
                    program: command.program.clone(),
                });
            }
            Ok(self
                .results
                .get(&line)
                .cloned()
                .unwrap_or_else(|| CommandOutput::success("")))
        }

        fn has_program(&self, program: &str) -> bool {
            !self.missing.iter().any(|p| p == program)
        }
    }

    fn procedure(agent: AgentKind, steps: Vec<InstallStep>) -> InstallProcedure {
        InstallProcedure {
            id: ProcedureId::NativePackage {
                agent,
                package: "pkg",
            },
            agent,
            steps,
        }
    }

    fn step(severity: Severity, line: &str) -> InstallStep {
        let mut parts = line.split_whitespace();
        let program = parts.next().unwrap();
        let command = StructuredCommand::new(program, parts);
        match severity {
            Severity::Fatal => InstallStep::fatal(line, command),
            Severity::NonFatal => InstallStep::non_fatal(line, command),
        }
    }

    fn apk_add(agent: AgentKind, package: &str) -> InstallProcedure {
        let line = format!("apk add --no-cache {}", package);
        procedure(agent, vec![step(Severity::Fatal, &line)])
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let runner = ScriptedRunner::default();
        let proc = procedure(
            AgentKind::TdAgent,
            vec![
                step(Severity::NonFatal, "apk update"),
                step(Severity::Fatal, "apk add fluentd"),
            ],
        );
        let agent = execute(&runner, &proc, None, |_| {}).await.unwrap();
        assert_eq!(agent, AgentKind::TdAgent);
        assert_eq!(runner.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_non_fatal_failure_continues() {
        let runner = ScriptedRunner::default().fail("apt-get install -y curl", 100);
        let proc = procedure(
            AgentKind::FluentPackage,
            vec![
                step(Severity::NonFatal, "apt-get install -y curl"),
                step(Severity::Fatal, "sh /tmp/install.sh"),
            ],
        );
        let warnings = RefCell::new(0);
        let result = execute(&runner, &proc, None, |p| {
            if matches!(p, InstallProgress::StepWarning { .. }) {
                *warnings.borrow_mut() += 1;
            }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(*warnings.borrow(), 1);
        assert_eq!(runner.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_failure_aborts_remaining_steps() {
        let runner = ScriptedRunner::default()
            .fail("curl -fsSL -o /tmp/x.sh https://example.com/x.sh", 22);
        let proc = procedure(
            AgentKind::FluentPackage,
            vec![
                step(Severity::Fatal, "curl -fsSL -o /tmp/x.sh https://example.com/x.sh"),
                step(Severity::Fatal, "sh /tmp/x.sh"),
            ],
        );
        let result = execute(&runner, &proc, None, |_| {}).await;
        assert!(matches!(result, Err(InstallError::Network { .. })));
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_runs_after_primary_failure() {
        let runner = ScriptedRunner::default().fail("apk add --no-cache fluentd", 1);
        let primary = apk_add(AgentKind::TdAgent, "fluentd");
        let fallback = apk_add(AgentKind::FluentBit, "fluent-bit");

        let fell_back = RefCell::new(false);
        let agent = execute(&runner, &primary, Some(&fallback), |p| {
            if matches!(p, InstallProgress::FallingBack { .. }) {
                *fell_back.borrow_mut() = true;
            }
        })
        .await
        .unwrap();

        assert_eq!(agent, AgentKind::FluentBit);
        assert!(*fell_back.borrow());
    }

    #[tokio::test]
    async fn test_both_primary_and_fallback_fail() {
        let runner = ScriptedRunner::default()
            .fail("apk add --no-cache fluentd", 1)
            .fail("apk add --no-cache fluent-bit", 1);
        let primary = apk_add(AgentKind::TdAgent, "fluentd");
        let fallback = apk_add(AgentKind::FluentBit, "fluent-bit");

        let result = execute(&runner, &primary, Some(&fallback), |_| {}).await;
        assert!(matches!(result, Err(InstallError::FallbackFailed { .. })));
    }

    #[tokio::test]
    async fn test_fallback_not_used_on_success() {
        let runner = ScriptedRunner::default();
        let primary = apk_add(AgentKind::TdAgent, "fluentd");
        let fallback = apk_add(AgentKind::FluentBit, "fluent-bit");

        execute(&runner, &primary, Some(&fallback), |_| {}).await.unwrap();
        assert_eq!(*runner.calls.borrow(), vec!["apk add --no-cache fluentd".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_program_maps_to_program_missing() {
        let runner = ScriptedRunner::default().missing("curl");
        let proc = procedure(
            AgentKind::FluentBit,
            vec![step(Severity::Fatal, "curl -fsSL -o /tmp/x.sh https://example.com/x.sh")],
        );
        let result = execute(&runner, &proc, None, |_| {}).await;
        match result {
            Err(InstallError::ProgramMissing { program, fix }) => {
                assert_eq!(program, "curl");
                assert!(fix.contains("curl"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_progress_stage_order() {
        let runner = ScriptedRunner::default();
        let proc = apk_add(AgentKind::FluentBit, "fluent-bit");
        let stages = RefCell::new(Vec::new());
        execute(&runner, &proc, None, |p| stages.borrow_mut().push(p.description()))
            .await
            .unwrap();
        assert_eq!(
            *stages.borrow(),
            vec![
                "Starting installation",
                "Running step",
                "Step succeeded",
                "Installation complete"
            ]
        );
    }

    fn download_target(calls: &[String]) -> PathBuf {
        let line = calls
            .iter()
            .find(|c| c.starts_with("curl"))
            .expect("curl was called");
        let target = line.split_whitespace().nth(3).unwrap();
        PathBuf::from(target)
    }

    #[tokio::test]
    async fn test_downloads_go_to_private_directory_per_run() {
        let target = format!("{}/fluent-bit-install.sh", WORK_DIR);
        let proc = procedure(
            AgentKind::FluentBit,
            vec![
                step(Severity::Fatal, &format!("curl -fsSL -o {} https://x/i.sh", target)),
                step(Severity::Fatal, &format!("sh {}", target)),
            ],
        );

        let first = ScriptedRunner::default();
        execute(&first, &proc, None, |_| {}).await.unwrap();
        let second = ScriptedRunner::default();
        execute(&second, &proc, None, |_| {}).await.unwrap();

        let first_path = download_target(&first.calls.borrow());
        let second_path = download_target(&second.calls.borrow());
        assert_ne!(first_path, second_path);
        assert!(!first.calls.borrow().iter().any(|c| c.contains(WORK_DIR)));
        assert_eq!(first.calls.borrow()[1], format!("sh {}", first_path.display()));

        let dir = first_path.parent().unwrap();
        assert_ne!(dir, std::env::temp_dir());
        assert!(dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("fluent-installer-"));
        // Removed once the run is over.
        assert!(!dir.exists());
    }
}
