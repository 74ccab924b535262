//! Probe subcommand implementation.
//!
//! Runs a single `ssh-keyscan` over the given addresses without any name
//! resolution or configuration lookup.

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::scanner::{KeyScanner, ProbeOptions, ProbeOutput, MAX_PARAMETERS};
use crate::types::{AddressFamily, Port, ScanTarget};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Run ssh-keyscan against addresses directly.
#[derive(Parser, Debug)]
pub struct ProbeCommand {
    /// Addresses or names handed to ssh-keyscan
    #[arg(value_name = "ADDR")]
    pub targets: Vec<String>,

    /// Read additional targets from a file
    #[arg(short = 'f', long = "targets-file", value_name = "FILE")]
    pub targets_file: Option<PathBuf>,

    /// Port to probe
    #[arg(short, long)]
    pub port: Option<Port>,

    /// Force IPv4
    #[arg(short = '4', conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Force IPv6
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Connect timeout handed to ssh-keyscan, in seconds
    #[arg(short = 'T', long = "connect-timeout")]
    pub connect_timeout: Option<u32>,

    /// Time limit for the whole run in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,
}

impl ProbeCommand {
    /// Execute the probe command.
    pub async fn execute(&self, settings: &AppSettings, verbose: bool, quiet: bool) -> CliResult<()> {
        let targets = self.targets()?;
        let opts = self.probe_options(settings);

        if verbose && targets.len() > MAX_PARAMETERS {
            output::print_info(&format!("{} targets, passing them on stdin", targets.len()));
        }

        let scanner = KeyScanner::system(settings.tool_paths());
        let result = scanner.probe(&targets, &opts).await?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_probe_output(&mut out, &result)?;

        if !quiet && result.exit_code != Some(0) {
            let code = result
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            output::print_warning(&format!("ssh-keyscan exited with {}", code));
            if verbose {
                for line in &result.stderr_lines {
                    eprintln!("  {}", line);
                }
            }
        }

        Ok(())
    }

    fn targets(&self) -> CliResult<Vec<String>> {
        let mut targets: Vec<String> = self
            .targets
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if let Some(path) = &self.targets_file {
            targets.extend(ScanTarget::read_list(path)?.into_iter().map(|t| t.to_string()));
        }

        if targets.is_empty() {
            return Err(CliError::InvalidArgument(
                "no targets given (pass ADDR arguments or --targets-file)".to_string(),
            ));
        }
        Ok(targets)
    }

    fn probe_options(&self, settings: &AppSettings) -> ProbeOptions {
        let family = if self.ipv4 {
            Some(AddressFamily::V4)
        } else if self.ipv6 {
            Some(AddressFamily::V6)
        } else {
            None
        };

        ProbeOptions {
            port: self.port,
            family,
            connect_timeout_secs: self.connect_timeout.or(settings.keyscan_connect_timeout_secs),
            timeout: Some(
                self.timeout
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| settings.probe_timeout()),
            ),
        }
    }
}

fn write_probe_output<W: Write>(out: &mut W, result: &ProbeOutput) -> io::Result<()> {
    for line in result.stdout_lines.iter().filter(|l| !l.trim().is_empty()) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
