//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan reports.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{
    print_error, print_info, print_scan_header, print_success, print_warning, write_plain,
};

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Format a report according to `format` into `out`.
pub fn write_report<W: Write>(out: &mut W, report: &ScanReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Plain => plain::write_plain(out, report)?,
        OutputFormat::Json => json_format::write_json(out, report)?,
        OutputFormat::Csv => csv_format::write_csv(out, report)?,
    }
    Ok(())
}

/// Format and print a report to stdout.
pub fn print_report(report: &ScanReport, format: OutputFormat) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format)
}
