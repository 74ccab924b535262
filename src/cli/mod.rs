//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `sshost scan <hosts>...` - Resolve hosts and probe them for host keys
//! - `sshost config <host>` - Show the effective SSH configuration
//! - `sshost resolve <host>` - Show resolved addresses
//! - `sshost probe <addr>...` - Run ssh-keyscan directly

mod config;
mod probe;
mod resolve;
mod scan;

pub use config::ConfigCommand;
pub use probe::ProbeCommand;
pub use resolve::ResolveCommand;
pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::types::AddressFamilyPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// sshost - find reachable SSH hosts and collect their host keys.
///
/// Hosts are resolved across IPv4 and IPv6, ports are taken from your SSH
/// client configuration via `ssh -G`, and every address is probed with
/// `ssh-keyscan`.
#[derive(Parser, Debug)]
#[command(name = "sshost")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve SSH hosts and probe them for host keys", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to an sshost settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

impl Cli {
    /// Load settings from `--settings` or the default location.
    pub fn load_settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.settings {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve hosts and probe every address for SSH host keys
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Show the effective SSH configuration for a host
    #[command(alias = "c")]
    Config(ConfigCommand),

    /// Resolve a host to addresses
    #[command(alias = "r")]
    Resolve(ResolveCommand),

    /// Run ssh-keyscan against addresses directly
    #[command(alias = "p")]
    Probe(ProbeCommand),
}

/// Address family selection shared by subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct FamilyArgs {
    /// Only resolve IPv4 addresses
    #[arg(short = '4', long = "ipv4", conflicts_with_all = ["ipv6", "any", "policy"])]
    pub ipv4: bool,

    /// Only resolve IPv6 addresses
    #[arg(short = '6', long = "ipv6", conflicts_with_all = ["any", "policy"])]
    pub ipv6: bool,

    /// Resolve both families but stop at the first live address per host
    #[arg(long, conflicts_with = "policy")]
    pub any: bool,

    /// Address family policy (ipv4, ipv6, both, any)
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<AddressFamilyPolicy>,
}

impl FamilyArgs {
    /// The selected policy, or `default` when nothing was given.
    pub fn policy_or(&self, default: AddressFamilyPolicy) -> AddressFamilyPolicy {
        if self.ipv4 {
            AddressFamilyPolicy::Ipv4
        } else if self.ipv6 {
            AddressFamilyPolicy::Ipv6
        } else if self.any {
            AddressFamilyPolicy::Any
        } else {
            self.policy.unwrap_or(default)
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_family_flags() {
        let cli = Cli::try_parse_from(["sshost", "scan", "-4", "example.com"]).unwrap();
        let Commands::Scan(cmd) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(cmd.family.policy_or(AddressFamilyPolicy::Both), AddressFamilyPolicy::Ipv4);

        let cli = Cli::try_parse_from(["sshost", "scan", "--policy", "any", "example.com"]).unwrap();
        let Commands::Scan(cmd) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(cmd.family.policy_or(AddressFamilyPolicy::Both), AddressFamilyPolicy::Any);

        assert!(Cli::try_parse_from(["sshost", "scan", "-4", "-6", "example.com"]).is_err());
    }

    #[test]
    fn test_default_policy_comes_from_caller() {
        let args = FamilyArgs::default();
        assert_eq!(args.policy_or(AddressFamilyPolicy::Ipv6), AddressFamilyPolicy::Ipv6);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
