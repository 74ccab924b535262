//! Config subcommand implementation.
//!
//! Handles `sshost config <host>`, printing what `ssh -G` reports.

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::scanner::KeyScanner;
use crate::ssh_config::{ConfigSource, EffectiveConfig};
use clap::Parser;
use console::style;
use std::io::{self, Write};

/// Show the effective SSH configuration for a host.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Host to look up
    pub host: String,

    /// SSH config file ('none' for no config file)
    #[arg(short = 'F', long = "ssh-config", value_name = "CONFIG")]
    pub ssh_config: Option<String>,

    /// Login user for the lookup
    #[arg(short = 'l', long = "login", value_name = "USER")]
    pub user: Option<String>,

    /// Only print these keys (repeatable)
    #[arg(short, long = "key", value_name = "KEY")]
    pub keys: Vec<String>,
}

impl ConfigCommand {
    /// Execute the config command.
    pub async fn execute(&self, settings: &AppSettings) -> CliResult<()> {
        let source = self
            .ssh_config
            .as_deref()
            .map(ConfigSource::from_arg)
            .unwrap_or_default();

        let scanner = KeyScanner::system(settings.tool_paths());
        let config = scanner
            .effective_config(
                &self.host,
                self.user.as_deref(),
                &source,
                Some(settings.config_timeout()),
            )
            .await?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_config(&mut out, &config)?;
        Ok(())
    }

    fn write_config<W: Write>(&self, out: &mut W, config: &EffectiveConfig) -> io::Result<()> {
        if self.keys.is_empty() {
            for (key, value) in config.iter() {
                writeln!(out, "{} {}", style(key).bold(), value)?;
            }
            return Ok(());
        }

        for key in &self.keys {
            match config.get(key) {
                Some(value) => writeln!(out, "{} {}", style(key.to_lowercase()).bold(), value)?,
                None => writeln!(out, "{} {}", style(key.to_lowercase()).bold(), style("(unset)").dim())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(args: &[&str], config: &EffectiveConfig) -> String {
        console::set_colors_enabled(false);
        let mut argv = vec!["config"];
        argv.extend_from_slice(args);
        let cmd = ConfigCommand::try_parse_from(argv).unwrap();
        let mut buf = Vec::new();
        cmd.write_config(&mut buf, config).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_prints_all_keys_sorted() {
        let config = EffectiveConfig::parse("user git\nport 2222\nhostname example.com\n");
        assert_eq!(
            render(&["example"], &config),
            "hostname example.com\nport 2222\nuser git\n"
        );
    }

    #[test]
    fn test_selected_keys() {
        let config = EffectiveConfig::parse("user git\nport 2222\n");
        assert_eq!(
            render(&["example", "-k", "Port", "-k", "proxyjump"], &config),
            "port 2222\nproxyjump (unset)\n"
        );
    }
}
