//! Scan subcommand implementation.
//!
//! Handles the `sshost scan <hosts>...` command.

use super::{FamilyArgs, OutputFormat};
use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::scanner::{KeyScanner, ScanOptions, ScanReport};
use crate::ssh_config::ConfigSource;
use crate::types::{Port, ScanTarget};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Resolve hosts and probe every address for SSH host keys.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Hosts to scan (names or IP addresses)
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Read additional hosts from a file, one per line ('#' starts a comment)
    #[arg(short = 'f', long = "hosts-file", value_name = "FILE")]
    pub hosts_file: Option<PathBuf>,

    /// SSH config file for port lookup ('none' for no config file)
    #[arg(short = 'F', long = "ssh-config", value_name = "CONFIG")]
    pub ssh_config: Option<String>,

    /// Login user for the config lookup
    #[arg(short = 'l', long = "login", value_name = "USER")]
    pub user: Option<String>,

    /// Port for every host (skips the config lookup)
    #[arg(short, long)]
    pub port: Option<Port>,

    #[command(flatten)]
    pub family: FamilyArgs,

    /// Number of hosts scanned in parallel
    #[arg(short = 'j', long = "jobs")]
    pub concurrency: Option<usize>,

    /// Maximum probes launched per second (0 = unlimited)
    #[arg(long = "rate")]
    pub rate_limit: Option<u32>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Time limit per probe in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Connect timeout handed to ssh-keyscan, in seconds
    #[arg(short = 'T', long = "connect-timeout")]
    pub connect_timeout: Option<u32>,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, verbose: bool, quiet: bool) -> CliResult<()> {
        let targets = self.targets()?;
        let opts = self.scan_options(settings);
        let format = self.output_format(settings);

        let scanner = KeyScanner::system(settings.tool_paths())
            .with_rate_limit(self.rate_limit.unwrap_or(settings.rate_limit));

        if !quiet && format == OutputFormat::Plain {
            output::print_scan_header(
                targets.len(),
                &opts.policy.to_string(),
                opts.port.map(Port::as_u16),
            );
        }

        let progress = if verbose && !quiet {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
            {
                pb.set_style(style);
            }
            pb.set_message(format!("probing {} hosts", targets.len()));
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let report = ScanReport::new(opts.policy, &targets);
        let result = scanner.scan(&targets, &opts).await;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let report = report.finalize(result?);
        output::print_report(&report, format)?;

        if !quiet && format == OutputFormat::Plain {
            if report.alive > 0 {
                output::print_success(&report.summary());
            } else {
                output::print_info(&report.summary());
            }
        }

        Ok(())
    }

    /// Hosts from the command line followed by those from the hosts file.
    pub fn targets(&self) -> CliResult<Vec<ScanTarget>> {
        let mut targets: Vec<ScanTarget> = self
            .hosts
            .iter()
            .map(ScanTarget::new)
            .filter(|t| !t.hostname().is_empty())
            .collect();

        if let Some(path) = &self.hosts_file {
            targets.extend(ScanTarget::read_list(path)?);
        }

        if targets.is_empty() {
            return Err(CliError::InvalidArgument(
                "no hosts given (pass HOST arguments or --hosts-file)".to_string(),
            ));
        }

        Ok(targets)
    }

    /// Scan options from flags, falling back to settings.
    pub fn scan_options(&self, settings: &AppSettings) -> ScanOptions {
        let source = self
            .ssh_config
            .as_deref()
            .map(ConfigSource::from_arg)
            .unwrap_or_default();

        let mut opts = ScanOptions::new()
            .with_config_source(source)
            .with_policy(self.family.policy_or(settings.default_policy))
            .with_concurrency(self.concurrency.unwrap_or(settings.concurrency))
            .with_probe_timeout(Some(
                self.timeout
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| settings.probe_timeout()),
            ))
            .with_config_timeout(Some(settings.config_timeout()))
            .with_connect_timeout(self.connect_timeout.or(settings.keyscan_connect_timeout_secs));

        if let Some(user) = &self.user {
            opts = opts.with_user(user);
        }
        if let Some(port) = self.port {
            opts = opts.with_port(port);
        }
        opts
    }

    fn output_format(&self, settings: &AppSettings) -> OutputFormat {
        self.output
            .unwrap_or_else(|| settings.output_format.parse().unwrap_or_default())
    }
}
