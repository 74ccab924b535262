//! Scan target types.
//!
//! A target is just a configured host name (or address literal). Targets
//! can be given on the command line or read from a hosts file, one per line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// A single host to scan, as given by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanTarget {
    hostname: String,
}

impl ScanTarget {
    /// Create a new scan target. Surrounding whitespace is trimmed.
    pub fn new(hostname: impl AsRef<str>) -> Self {
        Self {
            hostname: hostname.as_ref().trim().to_string(),
        }
    }

    /// The configured hostname.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Parse targets from hosts-file content.
    ///
    /// Blank lines and lines starting with `#` are skipped. Order is kept
    /// and duplicates are not removed.
    pub fn parse_list(content: &str) -> Vec<Self> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Self::new)
            .collect()
    }

    /// Read targets from a hosts file.
    pub fn read_list(path: &Path) -> io::Result<Vec<Self>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse_list(&content))
    }
}

impl AsRef<str> for ScanTarget {
    fn as_ref(&self) -> &str {
        &self.hostname
    }
}

impl From<&str> for ScanTarget {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ScanTarget {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hostname)
    }
}
