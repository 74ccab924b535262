//! Resolve subcommand implementation.

use super::FamilyArgs;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use crate::scanner::KeyScanner;
use crate::types::ResolvedAddress;
use clap::Parser;
use console::style;
use std::io::{self, Write};

/// Resolve a host to addresses under an address family policy.
#[derive(Parser, Debug)]
pub struct ResolveCommand {
    /// Host name or IP address
    pub host: String,

    #[command(flatten)]
    pub family: FamilyArgs,
}

impl ResolveCommand {
    /// Execute the resolve command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let policy = self.family.policy_or(settings.default_policy);
        let scanner = KeyScanner::system(settings.tool_paths());
        let addresses = scanner.resolve(&self.host, policy).await;

        if addresses.is_empty() {
            if !quiet {
                output::print_warning(&format!("{} has no {} addresses", self.host, policy));
            }
            return Ok(());
        }

        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_addresses(&mut out, &addresses)?;
        Ok(())
    }
}

fn write_addresses<W: Write>(out: &mut W, addresses: &[ResolvedAddress]) -> io::Result<()> {
    for addr in addresses {
        writeln!(out, "{:<39}  {}", addr.address, style(addr.family).dim())?;
    }
    Ok(())
}
