//! Unit-file write command.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::error::PanelError;
use crate::update::{UnitFileUpdater, UpdateOutcome};
use crate::validation::validate_unit_name;

/// Replace a unit's definition file and reload the manager.
///
/// Delegates the whole sequence to [`UnitFileUpdater`]. A write that lands
/// but whose reload fails still succeeds, under a status the caller can
/// distinguish.
pub struct UnitFileWriteCommand {
    updater: Arc<UnitFileUpdater>,
}

impl UnitFileWriteCommand {
    pub fn new(updater: Arc<UnitFileUpdater>) -> Self {
        Self { updater }
    }
}

impl Command for UnitFileWriteCommand {
    fn name(&self) -> &'static str {
        "unit_file.write"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), PanelError> {
        let unit = params.get_string("unit")?;
        validate_unit_name(&unit)?;
        params.require_string("content")?;
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, PanelError> {
        let unit = params.get_string("unit")?;
        let content = params.get_string("content")?;

        debug!(
            request_id = %ctx.request_id,
            unit = %unit,
            bytes = content.len(),
            "Applying unit file update"
        );

        match self.updater.apply(&unit, &content)? {
            UpdateOutcome::Applied { path, .. } => {
                Ok(CommandResult::success(serde_json::json!({
                    "unit": unit,
                    "path": path,
                    "status": "applied",
                })))
            }
            UpdateOutcome::ReloadFailed { path, reload_error } => {
                Ok(CommandResult::success(serde_json::json!({
                    "unit": unit,
                    "path": path,
                    "status": "applied_reload_failed",
                    "reload_error": reload_error,
                })))
            }
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{test_context, test_settings};
    use crate::config::Settings;
    use crate::error::{UpdateErrorKind, ValidationErrorKind};

    use crate::commands::test_support::scripted_runner;

    fn updater_command(settings: Arc<Settings>) -> UnitFileWriteCommand {
        // Resolution answered with a path outside any allowed dir, so
        // execute() stops at authorization; validation tests never get there.
        let runner = scripted_runner(vec![(
            "show",
            Ok((0, "/etc/passwd\n".to_string(), String::new())),
        )]);
        UnitFileWriteCommand::new(Arc::new(UnitFileUpdater::new(settings, runner)))
    }

    #[test]
    fn test_validate_requires_content() {
        let cmd = updater_command(test_settings());
        let params = CommandParams::new(serde_json::json!({"unit": "app.service"}));
        assert!(matches!(
            cmd.validate(&params),
            Err(PanelError::Validation {
                kind: ValidationErrorKind::MissingParameter { .. }
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_unit_name() {
        let cmd = updater_command(test_settings());
        let params = CommandParams::new(serde_json::json!({
            "unit": "../../etc/passwd",
            "content": "[Unit]\n"
        }));
        assert!(matches!(
            cmd.validate(&params),
            Err(PanelError::Validation {
                kind: ValidationErrorKind::InvalidUnitName { .. }
            })
        ));
    }

    #[test]
    fn test_forbidden_path_surfaces_from_execute() {
        let cmd = updater_command(test_settings());
        let result = cmd.execute(
            &test_context("unit_file.write"),
            CommandParams::new(serde_json::json!({
                "unit": "app.service",
                "content": "[Unit]\n"
            })),
        );
        assert!(matches!(
            result,
            Err(PanelError::Update {
                kind: UpdateErrorKind::PathForbidden { .. }
            })
        ));
    }
}
