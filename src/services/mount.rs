//! Mount waiter.
//!
//! The bars can only attach once the host has rendered the container they
//! live in. The host's DOM observer reports the container through a
//! [`MountGate`]; a [`MountWaiter`] resolves when it appears or when the gate
//! is torn down, whichever comes first. There is no timeout.

use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// The container is present and the component is still live.
    Mounted,
    /// Teardown happened first; the caller must not touch the UI.
    Cancelled,
}

/// Owner side: fed by the container observer, cancelled on teardown.
pub struct MountGate {
    container_tx: watch::Sender<bool>,
    cancel_tx: watch::Sender<bool>,
}

impl Default for MountGate {
    fn default() -> Self {
        Self::new()
    }
}

impl MountGate {
    pub fn new() -> Self {
        let (container_tx, _) = watch::channel(false);
        let (cancel_tx, _) = watch::channel(false);
        Self {
            container_tx,
            cancel_tx,
        }
    }

    pub fn container_appeared(&self) {
        debug!("mount container appeared");
        self.container_tx.send_replace(true);
    }

    pub fn container_removed(&self) {
        self.container_tx.send_replace(false);
    }

    /// Marks the component unmounted. Pending and future waits resolve to
    /// [`MountOutcome::Cancelled`].
    pub fn teardown(&self) {
        info!("tearing down, cancelling pending mount waits");
        self.cancel_tx.send_replace(true);
    }

    pub fn is_torn_down(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    pub fn waiter(&self) -> MountWaiter {
        MountWaiter {
            container_rx: self.container_tx.subscribe(),
            cancel_rx: self.cancel_tx.subscribe(),
        }
    }
}

pub struct MountWaiter {
    container_rx: watch::Receiver<bool>,
    cancel_rx: watch::Receiver<bool>,
}

impl MountWaiter {
    pub async fn wait(mut self) -> MountOutcome {
        loop {
            if *self.cancel_rx.borrow_and_update() {
                return MountOutcome::Cancelled;
            }
            if *self.container_rx.borrow_and_update() {
                return MountOutcome::Mounted;
            }
            // A dropped gate counts as teardown.
            tokio::select! {
                biased;
                changed = self.cancel_rx.changed() => {
                    if changed.is_err() {
                        return MountOutcome::Cancelled;
                    }
                }
                changed = self.container_rx.changed() => {
                    if changed.is_err() {
                        return MountOutcome::Cancelled;
                    }
                }
            }
        }
    }
}
