//! # Bus → subscriber fan-out for one run.
//!
//! Forwards every event published on the bus to the [`SubscriberSet`]. When
//! the run is over, [`EventListener::finish`] drains what is still buffered,
//! then shuts the subscriber workers down so every event reaches them before
//! `start_and_wait_all` returns.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::Event;
use crate::subscribers::SubscriberSet;

pub(crate) struct EventListener {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl EventListener {
    pub fn spawn(mut rx: broadcast::Receiver<Event>, set: SubscriberSet) -> Self {
        let stop = CancellationToken::new();
        let handle = tokio::spawn({
            let stop = stop.clone();
            async move {
                loop {
                    tokio::select! {
                        biased;
                        res = rx.recv() => match res {
                            Ok(ev) => set.emit(ev),
                            Err(RecvError::Lagged(_)) => continue,
                            Err(RecvError::Closed) => break,
                        },
                        _ = stop.cancelled() => {
                            drain(&mut rx, &set);
                            break;
                        }
                    }
                }
                set.shutdown().await;
            }
        });
        Self { stop, handle }
    }

    /// Delivers the remaining events and waits for subscribers to process them.
    pub async fn finish(self) {
        self.stop.cancel();
        let _ = self.handle.await;
    }
}

fn drain(rx: &mut broadcast::Receiver<Event>, set: &SubscriberSet) {
    loop {
        match rx.try_recv() {
            Ok(ev) => set.emit(ev),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}
