//! Command runner module.
//!
//! Executes the host's management commands with optional privilege elevation,
//! optional piped stdin, and a bounded timeout per invocation.

mod host;
mod subprocess;

pub use host::HostCommandRunner;
pub use subprocess::SubprocessBuilder;

use crate::error::PanelResult;

/// Result of a single command invocation.
///
/// Exit code 0 means success by systemctl convention; a nonzero exit does not
/// always mean the caller's request failed (status queries legitimately exit
/// nonzero for inactive units).
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// The exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best available diagnostic text: stderr, falling back to stdout.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Executes external commands on behalf of the panel.
///
/// `argv[0]` is the program path; no shell is ever involved, so arguments are
/// passed through verbatim. Timeout and program-not-found surface as typed
/// errors rather than sentinel exit codes. Implementations must be usable
/// from `spawn_blocking` contexts.
pub trait CommandRunner: Send + Sync {
    /// Run `argv`, optionally elevated, optionally with `stdin` piped in.
    ///
    /// Blocks until the process exits or the configured timeout elapses.
    fn run(&self, argv: &[&str], elevate: bool, stdin: Option<&str>) -> PanelResult<CommandOutput>;

    /// Whether elevated invocations go through a privilege helper.
    ///
    /// False when the process already has the privilege to act directly
    /// (e.g. running as root), which lets file writes bypass the helper.
    fn needs_elevation(&self) -> bool {
        true
    }
}

/// Sanitize command output for inclusion in error messages and responses.
///
/// Truncates long output so subprocess diagnostics cannot blow up response
/// sizes.
pub fn sanitize_output(output: &str, max_lines: usize) -> String {
    const MAX_LINE_LENGTH: usize = 200;
    const MAX_TOTAL_LENGTH: usize = 1000;

    let lines: Vec<&str> = output.lines().take(max_lines).collect();
    let mut result = String::new();

    for line in lines {
        // Truncate long lines
        let truncated = if line.len() > MAX_LINE_LENGTH {
            let cut = line
                .char_indices()
                .take_while(|(i, _)| *i < MAX_LINE_LENGTH)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            format!("{}...", &line[..cut])
        } else {
            line.to_string()
        };

        if result.len() + truncated.len() > MAX_TOTAL_LENGTH {
            result.push_str("...[truncated]");
            break;
        }

        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(&truncated);
    }

    if output.lines().count() > max_lines {
        result.push_str("\n...[additional output truncated]");
    }

    result
}
