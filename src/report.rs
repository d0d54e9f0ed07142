//! Terminal output: stage progress, step lines, status and usage info.
//!
//! Rendering produces plain `String` lines so it can be checked without a
//! terminal; [`Terminal::print`] writes them to stdout.

use crate::install::{InstallProgress, ManualInstall, StructuredCommand};
use crate::pipeline::{PipelineError, PipelineEvent, Stage};
use crate::runner::{CommandOutput, CommandRunner, RunError};
use crate::service::{ServiceManager, ServiceStart, StatusReport};
use crate::AgentKind;
use crossterm::style::Stylize;
use futures::future::{select, Either};
use std::io::{IsTerminal, Write};
use std::pin::pin;
use std::time::Duration;

const BAR_WIDTH: usize = 24;
const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const SPINNER_LABEL_MAX: usize = 60;

/// `[############------------] 3/6`
pub fn progress_bar(done: usize, total: usize) -> String {
    let done = done.min(total);
    let filled = if total == 0 { BAR_WIDTH } else { BAR_WIDTH * done / total };
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        done,
        total
    )
}

/// Where to find and how to operate the installed agent.
pub fn info_lines(agent: AgentKind, manager: Option<ServiceManager>, port: u16) -> Vec<String> {
    let service = agent.service_name();
    let manager = manager.unwrap_or(ServiceManager::Systemd);
    let logs = match (agent.log_file(), manager.journal_command(service)) {
        (Some(file), _) => file.to_string(),
        (None, Some(journal)) => journal,
        (None, None) => format!("stdout only, set Log_File in {}", agent.config_path()),
    };
    let mut lines = vec![
        format!("{} usage", agent.display_name()),
        format!("  Service:       {}", service),
        format!("  Configuration: {}", agent.config_path()),
        format!("  Logs:          {}", logs),
    ];
    if let Some(plugin) = agent.plugin_command() {
        lines.push(format!("  Plugins:       {}", plugin));
    }
    lines.push(format!("  Port:          {}", port));
    lines.push("  Control:".to_string());
    lines.extend(
        manager
            .control_commands(service)
            .into_iter()
            .map(|command| format!("    {}", command)),
    );
    lines.push(format!("  Documentation: {}", agent.docs_url()));
    lines
}

/// Renders pipeline events for a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
    color: bool,
}

impl Terminal {
    /// Colored when stdout is a terminal and `NO_COLOR` is unset.
    pub fn from_env() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            color: !no_color && std::io::stdout().is_terminal(),
        }
    }

    /// Never colored.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Print the lines for `event` to stdout.
    pub fn print(&self, event: &PipelineEvent) {
        let mut out = std::io::stdout().lock();
        for line in self.render(event) {
            let _ = writeln!(out, "{}", line);
        }
    }

    /// Print the lines for a pipeline error about installing `agent`.
    pub fn print_error(&self, error: &PipelineError, agent: AgentKind) {
        let mut out = std::io::stdout().lock();
        for line in self.render_error(error, agent) {
            let _ = writeln!(out, "{}", line);
        }
    }

    /// Lines describing `event`.
    pub fn render(&self, event: &PipelineEvent) -> Vec<String> {
        match event {
            PipelineEvent::StageStarted(stage) => vec![format!(
                "{} {}",
                progress_bar(stage.number() - 1, Stage::count()),
                self.bold(stage.label())
            )],
            PipelineEvent::PrivilegeCheckSkipped => {
                vec![self.warn("root check skipped, commands may fail")]
            }
            PipelineEvent::HostDetected(host) => vec![self.ok(&format!("Detected {}", host))],
            PipelineEvent::ProcedureSelected {
                platform,
                procedure,
                fallback,
            } => {
                let mut lines = vec![self.ok(&format!("{}: {}", platform, procedure.id))];
                if let Some(url) = procedure.script_url() {
                    lines.push(format!("  script:   {}", url));
                }
                if let Some(fallback) = fallback {
                    lines.push(format!("  fallback: {}", fallback.id));
                }
                lines
            }
            PipelineEvent::Install(progress) => self.render_progress(progress),
            PipelineEvent::InstallFailed { message, fix } => vec![
                self.fail(&format!("Installation failed: {}", message)),
                format!("  Fix: {}", fix),
            ],
            PipelineEvent::ServiceStarted(start) => self.render_start(start),
            PipelineEvent::Status(report) => self.render_status(report),
            PipelineEvent::Info {
                agent,
                manager,
                port,
            } => {
                let bar = progress_bar(Stage::count(), Stage::count());
                let mut lines = vec![String::new(), format!("{} {}", bar, self.bold("Done"))];
                lines.extend(info_lines(*agent, *manager, *port));
                lines
            }
        }
    }

    /// Lines describing a pipeline error.
    ///
    /// A manual-install recommendation is followed by the usage info for
    /// `agent`, since the operator is about to install it by hand.
    pub fn render_error(&self, error: &PipelineError, agent: AgentKind) -> Vec<String> {
        match error {
            PipelineError::Unsupported(manual) => {
                let mut lines = self.render_manual(manual);
                lines.push(String::new());
                lines.extend(info_lines(agent, None, agent.default_port()));
                lines
            }
            other => vec![self.fail(&other.to_string())],
        }
    }

    fn render_manual(&self, manual: &ManualInstall) -> Vec<String> {
        let mut lines = vec![
            self.fail("Manual installation required"),
            format!("  {}", manual.reason),
        ];
        lines.extend(
            manual
                .steps
                .iter()
                .enumerate()
                .map(|(i, step)| format!("  {}. {}", i + 1, step)),
        );
        lines.push(format!("  Documentation: {}", manual.docs_url));
        lines
    }

    fn render_progress(&self, progress: &InstallProgress) -> Vec<String> {
        match progress {
            InstallProgress::Started { agent } => {
                vec![format!("  Installing {}", agent.display_name())]
            }
            InstallProgress::StepStarted {
                index,
                total,
                description,
            } => vec![format!("  [{}/{}] {}", index + 1, total, description)],
            InstallProgress::StepSucceeded { description } => {
                vec![format!("  {}", self.ok(description))]
            }
            InstallProgress::StepWarning {
                description,
                message,
            } => vec![format!("  {}", self.warn(&format!("{}: {}", description, message)))],
            InstallProgress::FallingBack { agent, reason } => vec![self.warn(&format!(
                "Falling back to {}: {}",
                agent.display_name(),
                reason
            ))],
            InstallProgress::Completed { agent } => {
                vec![self.ok(&format!("{} installed", agent.display_name()))]
            }
        }
    }

    fn render_start(&self, start: &ServiceStart) -> Vec<String> {
        match start {
            ServiceStart::Started { manager, enabled } => {
                let mut lines = vec![self.ok(&format!("Service started with {}", manager))];
                if !enabled {
                    lines.push(format!("  {}", self.warn("service is not enabled at boot")));
                }
                lines
            }
            ServiceStart::Failed { manager, message } => {
                vec![self.fail(&format!("{} could not start the service: {}", manager, message))]
            }
            ServiceStart::NoManager => {
                vec![self.warn("no service manager found, start the agent by hand")]
            }
        }
    }

    fn render_status(&self, report: &StatusReport) -> Vec<String> {
        let version = report
            .version
            .as_ref()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        vec![
            format!("  Service: {}", report.service),
            format!("  Port:    {}", report.port),
            format!("  Version: {}", version),
        ]
    }

    fn ok(&self, text: &str) -> String {
        if self.color {
            format!("{} {}", "✓".green(), text)
        } else {
            format!("✓ {}", text)
        }
    }

    fn warn(&self, text: &str) -> String {
        if self.color {
            format!("{} {}", "!".yellow(), text.yellow())
        } else {
            format!("! {}", text)
        }
    }

    fn fail(&self, text: &str) -> String {
        if self.color {
            format!("{} {}", "✗".red(), text.red())
        } else {
            format!("✗ {}", text)
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Shows a spinner on stderr while the wrapped runner executes a command.
#[derive(Debug, Clone)]
pub struct Spinning<R> {
    inner: R,
    enabled: bool,
}

impl<R> Spinning<R> {
    /// Spin only when stderr is a terminal.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            enabled: std::io::stderr().is_terminal(),
        }
    }
}

impl<R: CommandRunner> CommandRunner for Spinning<R> {
    async fn run(&self, command: &StructuredCommand) -> Result<CommandOutput, RunError> {
        if !self.enabled {
            return self.inner.run(command).await;
        }

        let mut label = command.to_string();
        if label.chars().count() > SPINNER_LABEL_MAX {
            label = label.chars().take(SPINNER_LABEL_MAX - 3).collect::<String>() + "...";
        }

        let work = pin!(self.inner.run(command));
        let spinner = pin!(spin(&label));
        let result = match select(work, spinner).await {
            Either::Left((result, _)) => result,
            Either::Right((never, _)) => match never {},
        };

        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}\r", " ".repeat(label.chars().count() + 2));
        let _ = err.flush();
        result
    }

    fn has_program(&self, program: &str) -> bool {
        self.inner.has_program(program)
    }
}

async fn spin(label: &str) -> std::convert::Infallible {
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let mut frames = SPINNER_FRAMES.iter().cycle();
    loop {
        ticker.tick().await;
        if let Some(frame) = frames.next() {
            let mut err = std::io::stderr().lock();
            let _ = write!(err, "\r{} {}", frame, label);
            let _ = err.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{PortState, ServiceState};
    use semver::Version;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(3, 6), format!("[{}{}] 3/6", "#".repeat(12), "-".repeat(12)));
        assert_eq!(progress_bar(0, 6), format!("[{}] 0/6", "-".repeat(24)));
        assert_eq!(progress_bar(9, 6), format!("[{}] 6/6", "#".repeat(24)));
    }

    #[test]
    fn test_info_lines_for_fluent_package() {
        let lines = info_lines(AgentKind::FluentPackage, Some(ServiceManager::Systemd), 24224);
        let text = lines.join("\n");
        assert!(text.contains("/etc/fluent/fluentd.conf"));
        assert!(text.contains("fluent-gem install <plugin>"));
        assert!(text.contains("systemctl restart fluentd"));
        assert!(text.contains("24224"));
        assert!(text.contains("https://docs.fluentd.org/installation"));
    }

    #[test]
    fn test_info_lines_fluent_bit_has_no_plugin_line() {
        let lines = info_lines(AgentKind::FluentBit, Some(ServiceManager::OpenRc), 2020);
        assert!(!lines.iter().any(|l| l.contains("Plugins")));
        assert!(lines.iter().any(|l| l.contains("rc-service fluent-bit start")));
    }

    #[test]
    fn test_fluent_bit_logs_follow_service_manager() {
        let logs = |manager| {
            info_lines(AgentKind::FluentBit, manager, 2020)
                .into_iter()
                .find(|l| l.contains("Logs:"))
                .unwrap()
        };
        assert!(logs(Some(ServiceManager::Systemd)).ends_with("journalctl -u fluent-bit"));
        for manager in [ServiceManager::OpenRc, ServiceManager::SysV] {
            let line = logs(Some(manager));
            assert!(!line.contains("journalctl"), "{}", line);
            assert!(line.contains("Log_File in /etc/fluent-bit/fluent-bit.conf"));
        }

        let fluentd = info_lines(AgentKind::FluentPackage, Some(ServiceManager::OpenRc), 24224);
        assert!(fluentd.iter().any(|l| l.ends_with("/var/log/fluent/fluentd.log")));
    }

    #[test]
    fn test_plain_rendering_has_no_escape_codes() {
        let term = Terminal::plain();
        let lines = term.render(&PipelineEvent::InstallFailed {
            message: "download failed".to_string(),
            fix: "Check network connectivity".to_string(),
        });
        assert_eq!(lines[0], "✗ Installation failed: download failed");
        assert!(lines.iter().all(|l| !l.contains('\u{1b}')));
    }

    #[test]
    fn test_render_manual_steps_numbered() {
        let manual = ManualInstall {
            reason: "the fluent-package5 installer does not support alpine".to_string(),
            steps: vec!["first".to_string(), "second".to_string()],
            docs_url: "https://docs.fluentd.org/installation".to_string(),
        };
        let lines = Terminal::plain()
            .render_error(&PipelineError::Unsupported(manual), AgentKind::FluentPackage);
        assert_eq!(lines[0], "✗ Manual installation required");
        assert_eq!(lines[2], "  1. first");
        assert_eq!(lines[3], "  2. second");
        assert!(lines[4].ends_with("https://docs.fluentd.org/installation"));
        assert!(lines.iter().any(|l| l.contains("/etc/fluent/fluentd.conf")));
    }

    #[test]
    fn test_render_not_elevated() {
        let lines = Terminal::plain()
            .render_error(&PipelineError::NotElevated { euid: 1000 }, AgentKind::FluentBit);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("re-run with sudo"));
    }

    #[test]
    fn test_render_status() {
        let report = StatusReport {
            agent: AgentKind::TdAgent,
            service: ServiceState::Running,
            port: PortState::Listening(24224),
            version: Some(Version::new(4, 5, 2)),
        };
        let lines = Terminal::plain().render(&PipelineEvent::Status(report));
        assert_eq!(lines[0], "  Service: running");
        assert_eq!(lines[1], "  Port:    listening on 24224");
        assert_eq!(lines[2], "  Version: 4.5.2");
    }

    #[test]
    fn test_render_stage_line() {
        let lines = Terminal::plain().render(&PipelineEvent::StageStarted(Stage::Detect));
        assert!(lines[0].ends_with("1/6 Detecting operating system"));
    }

    #[tokio::test]
    async fn test_spinning_delegates() {
        struct Echo;
        impl CommandRunner for Echo {
            async fn run(&self, _command: &StructuredCommand) -> Result<CommandOutput, RunError> {
                Ok(CommandOutput::success("ok"))
            }
            fn has_program(&self, program: &str) -> bool {
                program == "sh"
            }
        }

        let runner = Spinning {
            inner: Echo,
            enabled: true,
        };
        let output = runner
            .run(&StructuredCommand::new("sh", ["-c", "true"]))
            .await
            .unwrap();
        assert_eq!(output.stdout, "ok");
        assert!(runner.has_program("sh"));
        assert!(!runner.has_program("curl"));
    }
}
