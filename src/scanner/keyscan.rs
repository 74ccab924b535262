//! Batch probe runner around `ssh-keyscan`.
//!
//! Small target lists are passed as arguments. Lists longer than
//! [`MAX_PARAMETERS`] go through standard input (`-f -`) so we never hit
//! the platform's command-line length limit.

use crate::error::{ExecError, ProbeError};
use crate::exec::{CommandRunner, Invocation};
use crate::types::{AddressFamily, Port};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Most targets passed as individual arguments before switching to stdin.
pub const MAX_PARAMETERS: usize = 256;

/// Options for one `ssh-keyscan` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Port to probe (`-p`). The tool's own default is used when unset.
    pub port: Option<Port>,
    /// Restrict to one address family (`-4` / `-6`).
    pub family: Option<AddressFamily>,
    /// Per-connection timeout handed to the tool (`-T`), in seconds.
    pub connect_timeout_secs: Option<u32>,
    /// Wall-clock limit for the whole run.
    pub timeout: Option<Duration>,
}

impl ProbeOptions {
    /// Options probing `port`.
    pub fn with_port(port: Port) -> Self {
        Self {
            port: Some(port),
            ..Self::default()
        }
    }
}

/// Raw result of one `ssh-keyscan` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Exit code; `None` if the process was killed or never started.
    pub exit_code: Option<i32>,
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
}

impl ProbeOutput {
    /// A probe counts as alive when it exited 0 and printed something.
    pub fn is_alive(&self) -> bool {
        self.exit_code == Some(0) && self.stdout_lines.iter().any(|l| !l.trim().is_empty())
    }
}

/// Build the `ssh-keyscan` invocation for `targets`.
pub fn probe_invocation<S: AsRef<str>>(
    program: &Path,
    targets: &[S],
    opts: &ProbeOptions,
) -> Invocation {
    let mut inv = Invocation::new(program);

    if let Some(port) = opts.port {
        inv = inv.arg("-p").arg(port.to_string());
    }
    match opts.family {
        Some(AddressFamily::V4) => inv = inv.arg("-4"),
        Some(AddressFamily::V6) => inv = inv.arg("-6"),
        None => {}
    }
    if let Some(secs) = opts.connect_timeout_secs {
        inv = inv.arg("-T").arg(secs.to_string());
    }

    let inv = if targets.len() > MAX_PARAMETERS {
        let mut input = String::new();
        for target in targets {
            input.push_str(target.as_ref());
            input.push('\n');
        }
        inv.arg("-f").arg("-").with_stdin(input)
    } else {
        inv.args(targets.iter().map(|t| t.as_ref().to_string()))
    };

    inv.with_timeout(opts.timeout)
}

/// Run `ssh-keyscan` against `targets`.
///
/// A nonzero exit or empty output is not an error; it shows up in the
/// returned [`ProbeOutput`]. Only failing to run the tool is. An empty
/// target list runs nothing.
pub async fn run_probe<S: AsRef<str>>(
    runner: &dyn CommandRunner,
    program: &Path,
    targets: &[S],
    opts: &ProbeOptions,
) -> Result<ProbeOutput, ProbeError> {
    if targets.is_empty() {
        return Ok(ProbeOutput::default());
    }

    let inv = probe_invocation(program, targets, opts);
    debug!(
        targets = targets.len(),
        batch = inv.stdin.is_some(),
        port = ?opts.port,
        "running probe"
    );

    let output = runner.run(&inv).await.map_err(|e| match e {
        ExecError::Timeout { timeout, .. } => ProbeError::Timeout { timeout },
        other => ProbeError::Execution {
            program: inv.program_name(),
            reason: other.to_string(),
        },
    })?;

    Ok(ProbeOutput {
        exit_code: output.exit_code,
        stdout_lines: output.stdout.lines().map(str::to_string).collect(),
        stderr_lines: output.stderr.lines().map(str::to_string).collect(),
    })
}
