//! Seams between command handlers and the channel that routes commands to them.
//!
//! A [`CommandChannel`] delivers each command to a [`CommandHandler`]
//! registered under the command's name and hands the handler's response back
//! to the sender. [`LocalCommandBus`] is an in-process channel.

mod local;

pub use local::LocalCommandBus;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{ConnectorError, HandlerError};
use crate::message::{Command, CommandName, CommandResponse, LoadFactor};

/// Receives commands routed by a [`CommandChannel`].
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn on_command(&self, command: Command) -> Result<CommandResponse, HandlerError>;
}

/// Routes commands to registered handlers.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Register `handler` for commands named `command_name`.
    async fn register_command_handler(
        &self,
        handler: Arc<dyn CommandHandler>,
        load_factor: LoadFactor,
        command_name: CommandName,
    ) -> Result<Registration, ConnectorError>;

    /// Deliver `command` and wait for its response.
    async fn send_command(&self, command: Command) -> Result<CommandResponse, ConnectorError>;

    /// Remove a registration. Commands already dispatched still complete.
    async fn unregister(&self, registration: Registration) -> Result<(), ConnectorError>;
}

/// Handle to a registered handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    id: u64,
    command_name: CommandName,
    load_factor: LoadFactor,
}

impl Registration {
    pub(crate) fn new(id: u64, command_name: CommandName, load_factor: LoadFactor) -> Self {
        Registration {
            id,
            command_name,
            load_factor,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn command_name(&self) -> &CommandName {
        &self.command_name
    }

    pub fn load_factor(&self) -> LoadFactor {
        self.load_factor
    }
}
