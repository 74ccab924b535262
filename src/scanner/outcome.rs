//! Per-address probe results.

use crate::types::Port;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a probed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// The address answered with at least one host key.
    Alive,
    /// No key was obtained: refused, timed out, or the probe could not run.
    Unreachable,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive => write!(f, "alive"),
            Self::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// A public host key line as printed by `ssh-keyscan`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostKey {
    /// Host field as printed (`addr` or `[addr]:port`).
    pub host: String,
    /// Key algorithm, e.g. `ssh-ed25519`.
    pub key_type: String,
    /// Base64 key blob.
    pub key: String,
}

impl HostKey {
    /// Parse one `host keytype key` line. Comments and short lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut fields = line.split_whitespace();
        let host = fields.next()?;
        let key_type = fields.next()?;
        let key = fields.next()?;
        Some(Self {
            host: host.to_string(),
            key_type: key_type.to_string(),
            key: key.to_string(),
        })
    }

    /// Parse every key line in `lines`.
    pub fn parse_all<S: AsRef<str>>(lines: &[S]) -> Vec<Self> {
        lines.iter().filter_map(|l| Self::parse(l.as_ref())).collect()
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.host, self.key_type, self.key)
    }
}

/// Result of probing one address of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Hostname as given by the caller.
    pub hostname: String,
    /// The probed address.
    pub ip: String,
    /// Port the probe used.
    pub port: Port,
    pub status: ProbeStatus,
    /// Host keys returned by the probe.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<HostKey>,
}

impl ProbeOutcome {
    /// Create an outcome with no keys.
    pub fn new(
        hostname: impl Into<String>,
        ip: impl Into<String>,
        port: Port,
        status: ProbeStatus,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            ip: ip.into(),
            port,
            status,
            keys: Vec::new(),
        }
    }

    /// Attach host keys.
    pub fn with_keys(mut self, keys: Vec<HostKey>) -> Self {
        self.keys = keys;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.status == ProbeStatus::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(ProbeStatus::Alive.to_string(), "alive");
        assert_eq!(ProbeStatus::Unreachable.to_string(), "unreachable");
    }

    #[test]
    fn test_parse_host_key() {
        let key = HostKey::parse("[10.0.0.1]:2222 ssh-ed25519 AAAAC3NzaC1lZDI1NTE5").unwrap();
        assert_eq!(key.host, "[10.0.0.1]:2222");
        assert_eq!(key.key_type, "ssh-ed25519");
        assert_eq!(key.key, "AAAAC3NzaC1lZDI1NTE5");

        assert!(HostKey::parse("# 10.0.0.1:22 SSH-2.0-OpenSSH_9.6").is_none());
        assert!(HostKey::parse("10.0.0.1 ssh-rsa").is_none());
        assert!(HostKey::parse("").is_none());
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = ProbeOutcome::new("example.com", "192.168.1.1", Port::new(2222).unwrap(), ProbeStatus::Alive);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hostname": "example.com",
                "ip": "192.168.1.1",
                "port": 2222,
                "status": "alive"
            })
        );
    }
}
