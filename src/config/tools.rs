//! Locations of the external tools sshost drives.
//!
//! Paths are resolved once at startup and passed down explicitly.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the OpenSSH client binary (used for `ssh -G`).
pub const SSH: &str = "ssh";
/// Name of the key-fetch binary.
pub const SSH_KEYSCAN: &str = "ssh-keyscan";

/// Resolved paths to `ssh` and `ssh-keyscan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub ssh: PathBuf,
    pub ssh_keyscan: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ssh: PathBuf::from(SSH),
            ssh_keyscan: PathBuf::from(SSH_KEYSCAN),
        }
    }
}

impl ToolPaths {
    /// Search `PATH` for both tools.
    ///
    /// A tool that cannot be found keeps its bare name; launching it later
    /// fails with a regular spawn error.
    pub fn discover() -> Self {
        Self::discover_with_overrides(None, None)
    }

    /// Like [`ToolPaths::discover`], but explicit paths win over `PATH`.
    pub fn discover_with_overrides(ssh: Option<&Path>, ssh_keyscan: Option<&Path>) -> Self {
        let search = env::var_os("PATH");
        let locate = |name: &str, explicit: Option<&Path>| -> PathBuf {
            if let Some(path) = explicit {
                return path.to_path_buf();
            }
            match search.as_deref().and_then(|p| find_in(p, name)) {
                Some(found) => {
                    debug!(tool = name, path = %found.display(), "located");
                    found
                }
                None => {
                    warn!(tool = name, "not found on PATH");
                    PathBuf::from(name)
                }
            }
        };

        Self {
            ssh: locate(SSH, ssh),
            ssh_keyscan: locate(SSH_KEYSCAN, ssh_keyscan),
        }
    }
}

/// Find an executable called `name` in a `PATH`-style list.
fn find_in(search: &std::ffi::OsStr, name: &str) -> Option<PathBuf> {
    env::split_paths(search).find_map(|dir| {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{}.exe", name));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
