//! Application settings and paths.
//!
//! Settings live in an XDG-compliant config directory and are only ever
//! read; a scan run never writes anything.

use crate::config::ToolPaths;
use crate::error::{ConfigError, ConfigResult};
use crate::types::AddressFamilyPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/sshost)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform configuration directory.
    pub fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "sshost", "sshost").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Wall-clock limit for one `ssh-keyscan` run, in milliseconds.
    pub probe_timeout_ms: u64,
    /// Wall-clock limit for one `ssh -G` run, in milliseconds.
    pub config_timeout_ms: u64,
    /// Connect timeout handed to `ssh-keyscan -T`, in seconds.
    pub keyscan_connect_timeout_secs: Option<u32>,
    /// Hosts processed in parallel.
    pub concurrency: usize,
    /// Maximum probe launches per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Address family policy when none is given.
    pub default_policy: AddressFamilyPolicy,
    /// Default output format.
    pub output_format: String,
    /// Explicit path to `ssh`.
    pub ssh_path: Option<PathBuf>,
    /// Explicit path to `ssh-keyscan`.
    pub ssh_keyscan_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 30_000,
            config_timeout_ms: 10_000,
            keyscan_connect_timeout_secs: None,
            concurrency: 1,
            rate_limit: 0,
            default_policy: AddressFamilyPolicy::Both,
            output_format: "plain".to_string(),
            ssh_path: None,
            ssh_keyscan_path: None,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if there is none.
    pub fn load() -> ConfigResult<Self> {
        Self::load_located(Paths::new())
    }

    fn load_located(paths: ConfigResult<Paths>) -> ConfigResult<Self> {
        let file = match paths {
            Ok(paths) => paths.settings_file(),
            Err(ConfigError::DirectoryNotFound) => {
                debug!("no configuration directory, using default settings");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn config_timeout(&self) -> Duration {
        Duration::from_millis(self.config_timeout_ms)
    }

    /// Resolve tool locations, honouring explicit paths from the settings.
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths::discover_with_overrides(
            self.ssh_path.as_deref(),
            self.ssh_keyscan_path.as_deref(),
        )
    }
}
