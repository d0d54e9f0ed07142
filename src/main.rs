//! fluent-installer - installs a Fluentd or Fluent Bit agent and starts it.

mod cli;

use anyhow::Context;
use clap::Parser;
use fluent_installer::report::{Spinning, Terminal};
use fluent_installer::{
    pipeline, privilege, CommandRunner, DryRunRunner, Identity, RunOptions, SystemRunner,
};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

/// Log to stderr so it never interleaves with the step output on stdout.
fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fluent_installer={}", default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn drive<R: CommandRunner>(runner: R, options: &RunOptions, terminal: Terminal) -> ExitCode {
    let runner = Spinning::new(runner);
    match pipeline::run(&runner, Identity::current(), options, |event| terminal.print(&event)).await
    {
        Ok(outcome) => {
            tracing::info!(healthy = outcome.is_healthy(), "pipeline finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "pipeline stopped");
            terminal.print_error(&e, options.variant.primary_agent());
            ExitCode::from(e.exit_code())
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    let options = cli.options(privilege::should_skip_root_check());
    tracing::debug!(?options, "starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let terminal = Terminal::from_env();
    let code = if options.dry_run {
        runtime.block_on(drive(DryRunRunner, &options, terminal))
    } else {
        runtime.block_on(drive(SystemRunner::new(options.timeout), &options, terminal))
    };
    Ok(code)
}
