//! Command registry for dispatching requests to handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{CommandErrorKind, PanelError};
use crate::runner::CommandRunner;
use crate::update::UnitFileUpdater;

use super::service::{ServiceControlCommand, ServiceListCommand, ServiceStatusCommand};
use super::system::PingCommand;
use super::traits::Command;
use super::types::{CommandParams, CommandResult, ExecutionContext};
use super::unit_file::{UnitFileReadCommand, UnitFileWriteCommand};

/// Registry of all available commands.
#[derive(Clone)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a new command registry with all built-in commands.
    ///
    /// Every command that touches the host goes through the one shared
    /// runner, so tests can substitute it wholesale.
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
        };

        let updater = Arc::new(UnitFileUpdater::new(
            Arc::clone(&settings),
            Arc::clone(&runner),
        ));

        // System commands
        registry.register(Arc::new(PingCommand));

        // Service commands
        registry.register(Arc::new(ServiceListCommand::new(
            Arc::clone(&runner),
            Arc::clone(&settings),
        )));
        registry.register(Arc::new(ServiceStatusCommand::new(
            Arc::clone(&runner),
            Arc::clone(&settings),
        )));
        registry.register(Arc::new(ServiceControlCommand::new(
            Arc::clone(&runner),
            Arc::clone(&settings),
        )));

        // Unit-file commands
        registry.register(Arc::new(UnitFileReadCommand::new(runner, settings)));
        registry.register(Arc::new(UnitFileWriteCommand::new(updater)));

        info!(
            count = registry.commands.len(),
            "Command registry initialized"
        );

        registry
    }

    /// Register a command.
    fn register(&mut self, command: Arc<dyn Command>) {
        let name = command.name();
        debug!(command = name, "Registering command");
        self.commands.insert(name, command);
    }

    /// Get a command by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    /// Dispatch a request to the appropriate command handler.
    pub fn dispatch(
        &self,
        ctx: &ExecutionContext,
        command_name: &str,
        params: CommandParams,
    ) -> Result<CommandResult, PanelError> {
        let command = self
            .commands
            .get(command_name)
            .ok_or_else(|| PanelError::Command {
                kind: CommandErrorKind::UnknownCommand {
                    name: command_name.to_string(),
                },
            })?;

        command.validate(&params)?;

        command.execute(ctx, params)
    }

    /// List all registered command names.
    pub fn list_commands(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }
}
