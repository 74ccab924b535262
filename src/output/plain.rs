//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::{ProbeStatus, ScanReport};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write a report in human-readable plain text format.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                    {} Scan Results", style("sshost").cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Policy:").bold(), report.policy)?;
    writeln!(
        out,
        "  {} {} hosts, {} addresses probed in {:.2}s",
        style("Statistics:").bold(),
        report.hosts_requested,
        report.addresses_probed,
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "              {} alive, {} unreachable, {} skipped",
        style(report.alive).green().bold(),
        style(report.unreachable).red(),
        style(report.hosts_skipped()).yellow()
    )?;
    writeln!(out)?;

    if report.outcomes.is_empty() {
        writeln!(out, "  {}", style("No addresses to display.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<28}  {:<39}  {:>5}  {:<11}  {}",
            style("HOST").bold(),
            style("ADDRESS").bold(),
            style("PORT").bold(),
            style("STATUS").bold(),
            style("KEYS").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for outcome in &report.outcomes {
            let status_style = match outcome.status {
                ProbeStatus::Alive => Style::new().green().bold(),
                ProbeStatus::Unreachable => Style::new().red(),
            };
            let key_types: Vec<&str> = outcome.keys.iter().map(|k| k.key_type.as_str()).collect();

            writeln!(
                out,
                "  {:<28}  {:<39}  {:>5}  {:<11}  {}",
                truncate_string(&outcome.hostname, 28),
                outcome.ip,
                outcome.port,
                status_style.apply_to(outcome.status.to_string()),
                style(key_types.join(",")).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(hosts: usize, policy: &str, port: Option<u16>) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("sshost").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{} Address families: {}", style("•").dim(), style(policy).yellow());
    match port {
        Some(port) => eprintln!("{} Port: {}", style("•").dim(), style(port).white().bold()),
        None => eprintln!("{} Port: {}", style("•").dim(), style("from ssh config").white()),
    }
    eprintln!("{} Scanning {} hosts...", style("•").dim(), style(hosts).white().bold());
    eprintln!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    eprintln!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
