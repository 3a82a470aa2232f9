//! Shared test doubles for command tests.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::auth::PeerInfo;
use crate::commands::types::ExecutionContext;
use crate::config::Settings;
use crate::error::{CommandErrorKind, PanelError, PanelResult};
use crate::runner::{CommandOutput, CommandRunner};

/// Scripted failure modes a fake command can exhibit.
pub(crate) enum ScriptedFailure {
    Timeout,
}

/// `(exit_code, stdout, stderr)` on completion, or a typed failure.
pub(crate) type ScriptedResult = Result<(i32, String, String), ScriptedFailure>;

/// Runner that answers from a fixed script, keyed by argv token.
///
/// The first script entry whose key equals one of the argv elements wins.
/// An argv matching no entry is a broken test, so it panics.
pub(crate) struct ScriptedRunner {
    script: Vec<(&'static str, ScriptedResult)>,
    pub(crate) calls: Mutex<Vec<Vec<String>>>,
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, argv: &[&str], _elevate: bool, _stdin: Option<&str>) -> PanelResult<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(argv.iter().map(|s| s.to_string()).collect());

        let entry = self
            .script
            .iter()
            .find(|(key, _)| argv.iter().any(|a| a == key))
            .unwrap_or_else(|| panic!("unscripted command: {:?}", argv));

        match &entry.1 {
            Ok((exit_code, stdout, stderr)) => Ok(CommandOutput {
                exit_code: Some(*exit_code),
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            }),
            Err(ScriptedFailure::Timeout) => Err(PanelError::Command {
                kind: CommandErrorKind::Timeout { timeout_secs: 20 },
            }),
        }
    }

    fn needs_elevation(&self) -> bool {
        false
    }
}

pub(crate) fn scripted_runner(script: Vec<(&'static str, ScriptedResult)>) -> Arc<ScriptedRunner> {
    Arc::new(ScriptedRunner {
        script,
        calls: Mutex::new(Vec::new()),
    })
}

pub(crate) fn test_settings() -> Arc<Settings> {
    let settings: Settings = toml::from_str(
        r#"
            [socket]
            path = "/tmp/unitdeck-test.sock"
        "#,
    )
    .unwrap();
    Arc::new(settings)
}

pub(crate) fn test_context(command: &str) -> ExecutionContext {
    ExecutionContext::new(
        Uuid::new_v4(),
        PeerInfo {
            uid: 1000,
            gid: 1000,
            pid: 12345,
        },
        command.to_string(),
    )
}
