//! # One-shot start gate.
//!
//! Units are spawned while the gate is closed and park on it; opening it
//! releases every one of them at once. The gate never closes again.
//!
//! ```text
//! spawn unit 0 ──► waiter.wait() ┐
//! spawn unit 1 ──► waiter.wait() ├── gate.open() ──► all run
//! spawn unit 2 ──► waiter.wait() ┘
//! ```
//!
//! A waiter created after `open` passes straight through.

use tokio::sync::watch;

/// Owner side of the gate.
#[derive(Debug)]
pub(crate) struct StartGate {
    tx: watch::Sender<bool>,
}

impl StartGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Returns a handle a unit can park on.
    pub fn waiter(&self) -> GateWaiter {
        GateWaiter {
            rx: self.tx.subscribe(),
        }
    }

    /// Opens the gate; returns false if it was already open.
    pub fn open(&self) -> bool {
        !self.tx.send_replace(true)
    }
}

/// Unit side of the gate.
#[derive(Debug)]
pub(crate) struct GateWaiter {
    rx: watch::Receiver<bool>,
}

impl GateWaiter {
    /// Waits for the gate to open.
    ///
    /// Returns false if the gate was dropped without opening.
    pub async fn wait(&mut self) -> bool {
        self.rx.wait_for(|open| *open).await.is_ok()
    }
}
