//! Service lifecycle control.
//!
//! One command covers the whole closed action set rather than one command
//! per verb: the verbs differ only in the argv they produce, and the closed
//! [`ServiceAction`] enum is the whitelist.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::config::Settings;
use crate::error::{CommandErrorKind, PanelError};
use crate::runner::{sanitize_output, CommandRunner};
use crate::validation::{validate_unit_name, ServiceAction};

/// Dispatch a lifecycle action (start, stop, restart, enable, disable,
/// daemon-reload) against the service manager.
pub struct ServiceControlCommand {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl ServiceControlCommand {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { runner, settings }
    }
}

impl Command for ServiceControlCommand {
    fn name(&self) -> &'static str {
        "service.control"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), PanelError> {
        let action = ServiceAction::parse(&params.get_string("action")?)?;
        if action.takes_unit() {
            let unit = params.get_string("unit")?;
            validate_unit_name(&unit)?;
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, PanelError> {
        let action = ServiceAction::parse(&params.get_string("action")?)?;
        let unit = if action.takes_unit() {
            Some(params.get_string("unit")?)
        } else {
            None
        };
        let systemctl = self.settings.runner.systemctl_path.to_string_lossy();

        let mut argv: Vec<&str> = vec![systemctl.as_ref(), action.systemctl_arg()];
        if let Some(unit) = unit.as_deref() {
            argv.push(unit);
        }

        debug!(
            request_id = %ctx.request_id,
            action = action.systemctl_arg(),
            unit = unit.as_deref().unwrap_or("-"),
            "Dispatching service action"
        );

        let output = self.runner.run(&argv, true, None)?;

        if !output.success() {
            warn!(
                request_id = %ctx.request_id,
                action = action.systemctl_arg(),
                unit = unit.as_deref().unwrap_or("-"),
                exit_code = ?output.exit_code,
                "Service action failed"
            );
            return Err(PanelError::Command {
                kind: CommandErrorKind::ExecutionFailed {
                    message: format!(
                        "systemctl {} failed: {}",
                        action.systemctl_arg(),
                        sanitize_output(output.diagnostic(), 10)
                    ),
                },
            });
        }

        info!(
            request_id = %ctx.request_id,
            action = action.systemctl_arg(),
            unit = unit.as_deref().unwrap_or("-"),
            "Service action completed"
        );

        Ok(CommandResult::success(serde_json::json!({
            "action": action.systemctl_arg(),
            "unit": unit,
            "output": sanitize_output(&output.stdout, 10),
        })))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(120)
    }
}
