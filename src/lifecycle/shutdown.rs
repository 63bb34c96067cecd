//! Shutdown coordination between the signal task and the listeners.
//!
//! Backed by a `watch` channel holding a single "stopping" flag, so a
//! listener that subscribes after the trigger still stops immediately.

use std::sync::Arc;

use tokio::sync::watch;

/// Handle that flips the process into draining mode. Clones share the flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

/// One listener's view of the shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A signal for one server or background task.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Start draining. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once shutdown was triggered, or once every `Shutdown` handle is gone.
    pub async fn recv(mut self) {
        let _ = self.rx.wait_for(|stopping| *stopping).await;
    }
}
