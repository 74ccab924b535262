//! Effective SSH client configuration via `ssh -G`.
//!
//! OpenSSH already knows how to merge `Host`/`Match` blocks, includes, and
//! defaults, so rather than parsing config files ourselves we ask `ssh -G`
//! for the final key/value view of a host.

use crate::error::{ExecError, ScanError, ScanResult};
use crate::exec::{CommandRunner, Invocation};
use crate::types::Port;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Which SSH config file `ssh -G` should read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// The platform search path (`~/.ssh/config`, then the system file).
    #[default]
    Default,
    /// No config file at all (`-F none`).
    None,
    /// A specific config file.
    Path(PathBuf),
}

impl ConfigSource {
    /// The platform's "no file" device.
    #[cfg(windows)]
    const NULL_DEVICE: &'static str = "NUL";
    #[cfg(not(windows))]
    const NULL_DEVICE: &'static str = "/dev/null";

    /// Normalize a raw user-supplied value.
    ///
    /// `"true"` selects the default search path; an empty string, `"false"`,
    /// `"none"`, or the null device select no config file; anything else is a path.
    pub fn from_arg(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "true" => Self::Default,
            "" | "false" | "none" => Self::None,
            _ if trimmed == Self::NULL_DEVICE => Self::None,
            _ => Self::Path(PathBuf::from(value)),
        }
    }

    /// The `-F` argument to pass, if any.
    pub fn as_override(&self) -> Option<String> {
        match self {
            Self::Default => None,
            Self::None => Some("none".to_string()),
            Self::Path(path) => Some(path.display().to_string()),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::None => write!(f, "none"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The merged client configuration for one host.
///
/// Keys are stored lowercase. When a key appears more than once the last
/// value is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveConfig {
    entries: BTreeMap<String, String>,
}

impl EffectiveConfig {
    /// Parse `ssh -G` output: one `key value` pair per line.
    pub fn parse(output: &str) -> Self {
        let entries = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(char::is_whitespace) {
                Some((key, value)) => (key.to_lowercase(), value.trim().to_string()),
                None => (line.to_lowercase(), String::new()),
            })
            .collect();
        Self { entries }
    }

    /// Look up a key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    /// The configured port, if present and valid.
    pub fn port(&self) -> Option<Port> {
        self.get("port").and_then(|p| p.parse().ok())
    }

    /// The real host name to connect to.
    pub fn hostname(&self) -> Option<&str> {
        self.get("hostname")
    }

    /// The login user.
    pub fn user(&self) -> Option<&str> {
        self.get("user")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Build the `ssh -G` invocation for a host.
///
/// The host always follows `--` so a name starting with `-` is never read
/// as an option.
pub fn config_invocation(
    ssh: &Path,
    host: &str,
    user: Option<&str>,
    source: &ConfigSource,
    limit: Option<Duration>,
) -> Invocation {
    let mut inv = Invocation::new(ssh).arg("-G");
    if let Some(user) = user.filter(|u| !u.is_empty()) {
        inv = inv.arg("-l").arg(user);
    }
    if let Some(file) = source.as_override() {
        inv = inv.arg("-F").arg(file);
    }
    inv.arg("--").arg(host).with_timeout(limit)
}

/// Ask `ssh -G` for the effective configuration of `host`.
///
/// A nonzero exit status, or failing to launch `ssh` at all, is reported as
/// [`ScanError::ConfigLookup`] carrying the diagnostic text.
pub async fn get_effective_config(
    runner: &dyn CommandRunner,
    ssh: &Path,
    host: &str,
    user: Option<&str>,
    source: &ConfigSource,
    limit: Option<Duration>,
) -> ScanResult<EffectiveConfig> {
    let inv = config_invocation(ssh, host, user, source, limit);

    let output = runner.run(&inv).await.map_err(|e| match e {
        ExecError::Timeout { timeout, .. } => ScanError::ConfigTimeout {
            host: host.to_string(),
            timeout,
        },
        other => ScanError::ConfigLookup {
            host: host.to_string(),
            diagnostic: other.to_string(),
        },
    })?;

    if !output.success() {
        let diagnostic = match output.stderr.trim() {
            "" => format!("ssh -G exited with status {:?}", output.exit_code),
            text => text.to_string(),
        };
        return Err(ScanError::ConfigLookup {
            host: host.to_string(),
            diagnostic,
        });
    }

    let config = EffectiveConfig::parse(&output.stdout);
    debug!(host, source = %source, entries = config.len(), "effective config");
    Ok(config)
}
