//! Configuration management for sshost.
//!
//! Covers the application's own settings file and the locations of the
//! external tools. The per-host SSH configuration lives in [`crate::ssh_config`].

mod settings;
mod tools;

pub use settings::{AppSettings, Paths};
pub use tools::{ToolPaths, SSH, SSH_KEYSCAN};
