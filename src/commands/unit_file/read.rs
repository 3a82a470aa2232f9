//! Unit-file read command.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::config::Settings;
use crate::error::{PanelError, UpdateErrorKind};
use crate::runner::{sanitize_output, CommandRunner};
use crate::validation::validate_unit_name;

/// Fetch the current on-disk definition of a unit.
///
/// `systemctl cat` resolves the backing file itself and prints its path as a
/// `# /path` comment line above the content. A unit with no backing file is
/// reported as unresolvable, the same terminal state a write against it
/// would hit.
pub struct UnitFileReadCommand {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl UnitFileReadCommand {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { runner, settings }
    }
}

impl Command for UnitFileReadCommand {
    fn name(&self) -> &'static str {
        "unit_file.read"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), PanelError> {
        let unit = params.get_string("unit")?;
        validate_unit_name(&unit)?;
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, PanelError> {
        let unit = params.get_string("unit")?;
        let systemctl = self.settings.runner.systemctl_path.to_string_lossy();

        debug!(request_id = %ctx.request_id, unit = %unit, "Reading unit file");

        let output = self
            .runner
            .run(&[systemctl.as_ref(), "cat", &unit], true, None)?;
        if !output.success() {
            return Err(PanelError::Update {
                kind: UpdateErrorKind::PathUnresolved {
                    unit,
                    message: sanitize_output(output.diagnostic(), 5),
                },
            });
        }

        let (path, content) = split_cat_output(&output.stdout);

        Ok(CommandResult::success(serde_json::json!({
            "unit": unit,
            "path": path,
            "content": content,
        })))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }
}

/// Split systemctl cat output into the source-path comment and the content.
fn split_cat_output(stdout: &str) -> (Option<&str>, &str) {
    match stdout.split_once('\n') {
        Some((first, rest)) if first.starts_with("# /") => {
            (Some(first.trim_start_matches("# ").trim_end()), rest)
        }
        _ => (None, stdout),
    }
}
