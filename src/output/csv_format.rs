//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::Write;

/// Write one row per probed address.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["hostname", "ip", "port", "status", "key_types"])?;

    for outcome in &report.outcomes {
        let port = outcome.port.to_string();
        let status = outcome.status.to_string();
        let key_types: Vec<&str> = outcome.keys.iter().map(|k| k.key_type.as_str()).collect();
        let key_types = key_types.join(" ");
        wtr.write_record([
            outcome.hostname.as_str(),
            outcome.ip.as_str(),
            port.as_str(),
            status.as_str(),
            key_types.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
