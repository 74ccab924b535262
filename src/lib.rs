//! # sshost - SSH host resolution and key probing
//!
//! sshost takes a list of host names, works out which port each one uses
//! according to the SSH client configuration, resolves them across IPv4 and
//! IPv6, and probes every resulting address with `ssh-keyscan`.
//!
//! ## Features
//!
//! - **Config-aware ports**: ports come from `ssh -G`, so `Host`/`Match`
//!   blocks and includes behave exactly as they do for `ssh`
//! - **Address family policies**: IPv4, IPv6, both, or stop at the first live address
//! - **Batch probing**: large target lists are fed to `ssh-keyscan` on stdin
//! - **Ordered results**: outcomes follow input order even when hosts are scanned in parallel
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use sshost::config::ToolPaths;
//! use sshost::scanner::{KeyScanner, ScanOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sshost::ScanError> {
//!     let scanner = KeyScanner::system(ToolPaths::discover());
//!     let outcomes = scanner.scan(&["example.com"], &ScanOptions::new()).await?;
//!
//!     for outcome in outcomes {
//!         println!("{} {} {}", outcome.hostname, outcome.ip, outcome.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, address families and targets
//! - [`exec`] - Running external programs
//! - [`resolver`] - Hostname resolution under a family policy
//! - [`ssh_config`] - Effective configuration via `ssh -G`
//! - [`scanner`] - `ssh-keyscan` runs and the scan orchestrator
//! - [`config`] - Settings file and tool discovery
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod output;
pub mod resolver;
pub mod scanner;
pub mod ssh_config;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, LookupError, ProbeError, ScanError};
pub use resolver::{resolve_hostname, DnsLookup, NameLookup};
pub use scanner::{run_probe, KeyScanner, ProbeOutcome, ProbeStatus, ScanOptions, ScanReport};
pub use ssh_config::{get_effective_config, ConfigSource, EffectiveConfig};
pub use types::{is_valid_ipv4, is_valid_ipv6, AddressFamily, AddressFamilyPolicy, Port, ScanTarget};
