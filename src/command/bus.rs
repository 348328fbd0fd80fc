use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::types::Command;

/// Command bus between the input layer and the engine-control side.
pub struct CommandBus {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl CommandBus {
    pub fn new() -> Self {
        let (tx, rx) = bounded(256);
        Self { tx, rx }
    }

    /// Get a sender that can be cloned and shared
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Try to receive a command (non-blocking)
    pub fn try_recv(&self) -> Option<Command> {
        self.rx.try_recv().ok()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable sender for dispatching commands
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Send a command (non-blocking, drops if buffer full)
    pub fn send(&self, cmd: Command) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                eprintln!("Warning: Command buffer full, dropping command");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}
