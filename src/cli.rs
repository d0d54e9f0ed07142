use clap::{Parser, ValueEnum};
use fluent_installer::{InstallerVariant, RunOptions};
use std::path::PathBuf;
use std::time::Duration;

/// Install and start a Fluentd or Fluent Bit log agent
#[derive(Parser, Debug)]
#[command(name = "fluent-installer")]
#[command(about = "Installs td-agent, fluent-package or Fluent Bit and starts its service")]
#[command(version)]
pub struct Cli {
    /// Which package line to install
    #[arg(long, value_enum, default_value_t = VariantArg::FluentPackage5)]
    pub variant: VariantArg,

    /// Print the commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Port to check after start-up (defaults to the agent's standard port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Seconds each external command may run before it is killed
    #[arg(long, value_name = "SECS", default_value_t = 600)]
    pub timeout: u64,

    /// Disable the cosmetic pause between stages
    #[arg(long)]
    pub no_pace: bool,

    /// Continue without root privileges (also FLUENT_INSTALLER_SKIP_ROOT_CHECK=1)
    #[arg(long)]
    pub skip_root_check: bool,

    /// Read release files relative to this directory
    #[arg(long, value_name = "DIR", default_value = "/")]
    pub root: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    /// td-agent 4
    #[value(name = "td-agent4")]
    TdAgent4,
    /// fluent-package 5 (LTS)
    #[value(name = "fluent-package5")]
    FluentPackage5,
    /// Fluent Bit
    #[value(name = "fluent-bit")]
    FluentBit,
}

impl From<VariantArg> for InstallerVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::TdAgent4 => InstallerVariant::TdAgent4,
            VariantArg::FluentPackage5 => InstallerVariant::FluentPackage5,
            VariantArg::FluentBit => InstallerVariant::FluentBit,
        }
    }
}

impl Cli {
    /// Build run options; `env_skip_root` comes from the environment.
    pub fn options(&self, env_skip_root: bool) -> RunOptions {
        let defaults = RunOptions::default();
        RunOptions {
            variant: self.variant.into(),
            timeout: Duration::from_secs(self.timeout),
            port: self.port,
            pace: if self.no_pace { Duration::ZERO } else { defaults.pace },
            dry_run: self.dry_run,
            root: self.root.clone(),
            skip_root_check: self.skip_root_check || env_skip_root,
        }
    }

    /// Default tracing directive for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
