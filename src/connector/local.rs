//! In-process command channel.
//!
//! Routes by command name to every handler registered for it, round-robin.
//! Each registration gets a semaphore sized by its load factor; a command
//! holds a permit while its handler runs on a spawned task.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Semaphore;
use tracing::{debug, debug_span, info, trace, Instrument};

use super::{CommandChannel, CommandHandler, Registration};
use crate::error::ConnectorError;
use crate::message::{Command, CommandName, CommandResponse, LoadFactor};

struct Route {
    id: u64,
    handler: Arc<dyn CommandHandler>,
    permits: Arc<Semaphore>,
}

#[derive(Default)]
struct Inner {
    routes: RwLock<HashMap<CommandName, Vec<Route>>>,
    next_id: AtomicU64,
    cursor: AtomicUsize,
    closed: AtomicBool,
}

/// Command channel that dispatches to handlers inside this process.
#[derive(Clone, Default)]
pub struct LocalCommandBus {
    inner: Arc<Inner>,
}

impl LocalCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the bus: drop all registrations and reject further traffic.
    ///
    /// Commands already running finish; commands waiting for a permit fail
    /// with [`ConnectorError::Closed`].
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let routes = std::mem::take(&mut *self.write_routes());
        let mut handlers = 0;
        for route in routes.values().flatten() {
            route.permits.close();
            handlers += 1;
        }
        info!(handlers, "Command bus shut down");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of handlers currently registered for `command_name`.
    pub fn handler_count(&self, command_name: &CommandName) -> usize {
        self.read_routes().get(command_name).map_or(0, Vec::len)
    }

    fn route(
        &self,
        command_name: &CommandName,
    ) -> Result<(Arc<dyn CommandHandler>, Arc<Semaphore>), ConnectorError> {
        let routes = self.read_routes();
        let candidates = routes
            .get(command_name)
            .filter(|candidates| !candidates.is_empty())
            .ok_or_else(|| ConnectorError::NoHandler(command_name.clone()))?;

        let index = self.inner.cursor.fetch_add(1, Ordering::Relaxed) % candidates.len();
        let route = &candidates[index];
        Ok((Arc::clone(&route.handler), Arc::clone(&route.permits)))
    }

    fn read_routes(&self) -> RwLockReadGuard<'_, HashMap<CommandName, Vec<Route>>> {
        self.inner
            .routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_routes(&self) -> RwLockWriteGuard<'_, HashMap<CommandName, Vec<Route>>> {
        self.inner
            .routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Semaphore size for a registration, capped at what tokio accepts.
fn permit_count(load_factor: LoadFactor) -> usize {
    usize::try_from(load_factor.get())
        .unwrap_or(usize::MAX)
        .min(Semaphore::MAX_PERMITS)
}

#[async_trait]
impl CommandChannel for LocalCommandBus {
    async fn register_command_handler(
        &self,
        handler: Arc<dyn CommandHandler>,
        load_factor: LoadFactor,
        command_name: CommandName,
    ) -> Result<Registration, ConnectorError> {
        let id = {
            let mut routes = self.write_routes();
            // Checked under the lock so a concurrent shutdown cannot miss this route.
            if self.is_closed() {
                return Err(ConnectorError::Closed);
            }
            let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            routes.entry(command_name.clone()).or_default().push(Route {
                id,
                handler,
                permits: Arc::new(Semaphore::new(permit_count(load_factor))),
            });
            id
        };

        info!(
            command = %command_name,
            load_factor = load_factor.get(),
            registration = id,
            "Command handler registered"
        );
        Ok(Registration::new(id, command_name, load_factor))
    }

    async fn send_command(&self, command: Command) -> Result<CommandResponse, ConnectorError> {
        if self.is_closed() {
            return Err(ConnectorError::Closed);
        }

        let (handler, permits) = self.route(&command.name)?;
        let permit = permits
            .acquire_owned()
            .await
            .map_err(|_| ConnectorError::Closed)?;

        let command_id = command.message_id.clone();
        let span = debug_span!("command", command = %command.name, id = %command_id);
        let task = tokio::spawn(
            async move {
                let result = handler.on_command(command).await;
                drop(permit);
                result
            }
            .instrument(span),
        );

        match task.await {
            Ok(Ok(response)) => {
                trace!(request = %command_id, response = %response.message_id, "Command completed");
                Ok(response)
            }
            Ok(Err(source)) => {
                debug!(request = %command_id, error = %source, "Command handler failed");
                Err(ConnectorError::Handler { command_id, source })
            }
            Err(e) => Err(ConnectorError::HandlerPanicked(e.to_string())),
        }
    }

    async fn unregister(&self, registration: Registration) -> Result<(), ConnectorError> {
        {
            let mut routes = self.write_routes();
            if let Some(candidates) = routes.get_mut(registration.command_name()) {
                candidates.retain(|route| route.id != registration.id());
                if candidates.is_empty() {
                    routes.remove(registration.command_name());
                }
            }
        }

        info!(
            command = %registration.command_name(),
            registration = registration.id(),
            "Command handler unregistered"
        );
        Ok(())
    }
}
