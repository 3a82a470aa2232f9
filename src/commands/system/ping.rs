//! Ping command for health checking.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::PanelError;

use super::super::traits::Command;
use super::super::types::{CommandParams, CommandResult, ExecutionContext};

/// Simple ping command that returns a pong response.
///
/// Used for health checks and verifying the daemon is responsive.
pub struct PingCommand;

impl Command for PingCommand {
    fn name(&self) -> &'static str {
        "system.ping"
    }

    fn validate(&self, _params: &CommandParams) -> Result<(), PanelError> {
        // Ping has no required parameters
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        _params: CommandParams,
    ) -> Result<CommandResult, PanelError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Ok(CommandResult::success(serde_json::json!({
            "pong": true,
            "timestamp": timestamp,
            "request_id": ctx.request_id.to_string(),
        })))
    }
}
