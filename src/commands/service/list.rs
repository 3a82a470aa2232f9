//! Service inventory listing.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::config::Settings;
use crate::error::{CommandErrorKind, PanelError};
use crate::inventory::{merge_enabled, parse_unit_files, parse_unit_list};
use crate::runner::{sanitize_output, CommandRunner};

/// List all service units with their merged enablement state.
///
/// Runs two inventory queries and joins them: the unit list supplies runtime
/// state, the unit-file list supplies enablement. A failure of the second
/// query does not discard the first; those services report "unknown".
pub struct ServiceListCommand {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl ServiceListCommand {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { runner, settings }
    }

    fn systemctl(&self) -> String {
        self.settings.runner.systemctl_path.to_string_lossy().into_owned()
    }
}

impl Command for ServiceListCommand {
    fn name(&self) -> &'static str {
        "service.list"
    }

    fn validate(&self, _params: &CommandParams) -> Result<(), PanelError> {
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        _params: CommandParams,
    ) -> Result<CommandResult, PanelError> {
        let systemctl = self.systemctl();

        let units_output = self.runner.run(
            &[&systemctl, "list-units", "--type=service", "--all"],
            true,
            None,
        )?;
        if !units_output.success() {
            return Err(PanelError::Command {
                kind: CommandErrorKind::ExecutionFailed {
                    message: format!(
                        "systemctl list-units failed: {}",
                        sanitize_output(units_output.diagnostic(), 10)
                    ),
                },
            });
        }

        let mut units = parse_unit_list(&units_output.stdout);

        // Enablement is best-effort: losing it degrades the answer, it does
        // not fail the listing.
        let mut files_skipped = 0usize;
        match self
            .runner
            .run(&[&systemctl, "list-unit-files", "--type=service"], true, None)
        {
            Ok(files_output) if files_output.success() => {
                let files = parse_unit_files(&files_output.stdout);
                files_skipped = files.skipped;
                merge_enabled(&mut units.records, &files.statuses);
            }
            Ok(files_output) => {
                warn!(
                    request_id = %ctx.request_id,
                    exit_code = ?files_output.exit_code,
                    "list-unit-files failed; enablement reported as unknown"
                );
            }
            Err(e) => {
                warn!(
                    request_id = %ctx.request_id,
                    error = %e,
                    "list-unit-files errored; enablement reported as unknown"
                );
            }
        }

        debug!(
            request_id = %ctx.request_id,
            services = units.records.len(),
            skipped_lines = units.skipped + files_skipped,
            "Service inventory assembled"
        );

        Ok(CommandResult::success(serde_json::json!({
            "services": units.records,
            "skipped_lines": units.skipped + files_skipped,
        })))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }
}
