//! Production command runner for the host's service manager.

use std::path::PathBuf;
use std::time::Duration;

use nix::unistd::geteuid;
use tracing::debug;

use super::subprocess::SubprocessBuilder;
use super::{CommandOutput, CommandRunner};
use crate::config::RunnerConfig;
use crate::error::{CommandErrorKind, PanelError, PanelResult};

/// Runs commands directly on the host, prepending sudo for elevated
/// invocations when the daemon itself is not root.
pub struct HostCommandRunner {
    sudo_path: PathBuf,
    timeout: Duration,
    is_root: bool,
}

impl HostCommandRunner {
    /// Create a runner from configuration. The effective UID is checked once
    /// here; it cannot change for the life of the process.
    pub fn new(config: &RunnerConfig) -> Self {
        let is_root = geteuid().is_root();
        debug!(is_root, timeout_secs = config.timeout_seconds, "Host runner created");
        Self {
            sudo_path: config.sudo_path.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            is_root,
        }
    }
}

impl CommandRunner for HostCommandRunner {
    fn run(&self, argv: &[&str], elevate: bool, stdin: Option<&str>) -> PanelResult<CommandOutput> {
        let (program, args): (String, Vec<&str>) = match argv {
            [] => {
                return Err(PanelError::Command {
                    kind: CommandErrorKind::ExecutionFailed {
                        message: "empty argv".to_string(),
                    },
                })
            }
            [program, rest @ ..] if elevate && !self.is_root => {
                // sudo path first, then the full requested argv
                let mut args = vec![*program];
                args.extend_from_slice(rest);
                (self.sudo_path.to_string_lossy().into_owned(), args)
            }
            [program, rest @ ..] => ((*program).to_string(), rest.to_vec()),
        };

        let mut builder = SubprocessBuilder::new(&program)
            .args(args)
            .timeout(self.timeout);
        if let Some(input) = stdin {
            builder = builder.stdin(input);
        }

        builder.run()
    }

    fn needs_elevation(&self) -> bool {
        !self.is_root
    }
}
