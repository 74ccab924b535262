//! Error types for sshost.
//!
//! Uses `thiserror` for ergonomic error definitions. The split between
//! fatal and soft errors mirrors how a scan treats them: `ScanError` aborts
//! the whole batch, `ProbeError` and `LookupError` are folded into results.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal errors raised by a scan.
///
/// Any of these aborts the scan; no partial results are returned.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("configuration lookup failed for '{host}': {diagnostic}")]
    ConfigLookup { host: String, diagnostic: String },

    #[error("configuration lookup for '{host}' timed out after {timeout:?}")]
    ConfigTimeout { host: String, timeout: Duration },

    #[error("no usable port in configuration for '{host}'{}", value.as_ref().map(|v| format!(" (got '{}')", v)).unwrap_or_default())]
    MissingPort { host: String, value: Option<String> },
}

impl ScanError {
    /// The hostname the error refers to.
    pub fn host(&self) -> &str {
        match self {
            Self::ConfigLookup { host, .. }
            | Self::ConfigTimeout { host, .. }
            | Self::MissingPort { host, .. } => host,
        }
    }
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Failure to run the key-fetch probe itself.
///
/// Never escapes a scan: the affected address is reported as unreachable.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to execute {program}: {reason}")]
    Execution { program: String, reason: String },

    #[error("probe timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Failure of a single-family name lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The name exists but has no records of the requested type, or does not exist.
    #[error("no records found")]
    NoRecords,

    #[error("lookup failed: {0}")]
    Failed(String),
}

/// Errors from launching an external command.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("could not spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for settings operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors surfaced by CLI subcommands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
