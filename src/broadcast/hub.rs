//! Broadcast hub: fans every published record out to the registered consumers
//!
//! The registry is owned by one coordinator thread. Registration, removal,
//! publication and queries are all commands on its queue, so the table is
//! never touched from two threads at once and needs no lock.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::error::SimError;

use super::consumer::{Consumer, ConsumerId};

enum Command {
    Register(ConsumerId, Box<dyn Consumer>),
    Unregister(ConsumerId),
    Publish(String),
    Count(Sender<usize>),
    Shutdown,
}

/// Cloneable handle to a running hub
#[derive(Clone)]
pub struct HubHandle {
    commands: Sender<Command>,
    next_id: Arc<AtomicU64>,
}

impl HubHandle {
    /// Add a consumer, returns the id it is registered under
    pub fn register(&self, consumer: Box<dyn Consumer>) -> ConsumerId {
        let id = ConsumerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        // A stopped hub simply never delivers to it
        let _ = self.commands.send(Command::Register(id, consumer));
        id
    }

    pub fn unregister(&self, id: ConsumerId) {
        let _ = self.commands.send(Command::Unregister(id));
    }

    /// Queue `record` for delivery to every registered consumer
    pub fn publish(&self, record: impl Into<String>) {
        let _ = self.commands.send(Command::Publish(record.into()));
    }

    /// Number of registered consumers once every earlier command has been applied
    pub fn consumer_count(&self) -> usize {
        let (tx, rx) = mpsc::channel();
        if self.commands.send(Command::Count(tx)).is_err() {
            return 0;
        }
        rx.recv().unwrap_or(0)
    }
}

/// Owner of the coordinator thread
pub struct BroadcastHub {
    handle: HubHandle,
    thread: Option<JoinHandle<()>>,
}

impl BroadcastHub {
    pub fn spawn() -> Result<Self, SimError> {
        let (tx, rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("broadcast-hub".to_string())
            .spawn(move || coordinate(rx))
            .map_err(SimError::HubSpawn)?;

        Ok(Self {
            handle: HubHandle {
                commands: tx,
                next_id: Default::default(),
            },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> HubHandle {
        self.handle.clone()
    }

    /// Deliver everything already queued, then stop the coordinator
    ///
    /// Handles that outlive the hub keep working but nothing is delivered.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.commands.send(Command::Shutdown);
            if thread.join().is_err() {
                warn!("broadcast coordinator panicked");
            }
        }
    }
}

impl Drop for BroadcastHub {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Coordinator loop, runs until shut down or every handle is dropped
fn coordinate(commands: Receiver<Command>) {
    let mut registry: BTreeMap<ConsumerId, Box<dyn Consumer>> = BTreeMap::new();

    for command in commands {
        match command {
            Command::Register(id, consumer) => {
                debug!(?id, "consumer registered");
                registry.insert(id, consumer);
            }
            Command::Unregister(id) => {
                if registry.remove(&id).is_some() {
                    debug!(?id, "consumer unregistered");
                }
            }
            Command::Publish(record) => {
                // One failing consumer never stops delivery to the rest
                registry.retain(|id, consumer| match consumer.deliver(&record) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(?id, %err, "dropping consumer after failed delivery");
                        false
                    }
                });
            }
            Command::Count(reply) => {
                let _ = reply.send(registry.len());
            }
            Command::Shutdown => break,
        }
    }

    info!(remaining = registry.len(), "broadcast hub stopped");
}
