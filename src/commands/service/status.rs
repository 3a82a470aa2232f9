//! Service status command.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::config::Settings;
use crate::error::PanelError;
use crate::runner::{sanitize_output, CommandRunner};
use crate::validation::validate_unit_name;

/// Fetch the human-readable status report for one unit.
///
/// A nonzero exit is the normal answer for an inactive or failed unit, so it
/// is part of the result, not an error. The report is diagnostic text for an
/// operator, not structured state.
pub struct ServiceStatusCommand {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl ServiceStatusCommand {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { runner, settings }
    }
}

impl Command for ServiceStatusCommand {
    fn name(&self) -> &'static str {
        "service.status"
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

        debug!(request_id = %ctx.request_id, unit = %unit, "Querying service status");

        // Reads public state only; no elevation needed.
        let output = self.runner.run(
            &[systemctl.as_ref(), "status", &unit, "--no-pager"],
            false,
            None,
        )?;

        let report = if output.stdout.trim().is_empty() {
            output.stderr.as_str()
        } else {
            output.stdout.as_str()
        };

        Ok(CommandResult::success(serde_json::json!({
            "unit": unit,
            "status_output": sanitize_output(report, 50),
            "exit_code": output.exit_code,
        })))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }
}
