use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Single-slot "new listings found" flag shared by every poller.
///
/// Backed by a watch channel, so a `set` that races with a waiter is never lost.
#[derive(Debug)]
pub struct NewListingSignal {
    tx: watch::Sender<bool>,
}

impl Default for NewListingSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl NewListingSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Raises the flag. Returns false if it was already raised.
    pub fn set(&self) -> bool {
        self.tx.send_if_modified(|raised| {
            if *raised {
                false
            } else {
                *raised = true;
                true
            }
        })
    }

    pub fn clear(&self) {
        self.tx.send_if_modified(|raised| std::mem::replace(raised, false));
    }

    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Waits until the flag is raised. Returns false if cancelled first.
    pub async fn wait_set(&self, cancel: &CancellationToken) -> bool {
        let mut rx = self.tx.subscribe();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            raised = rx.wait_for(|raised| *raised) => raised.is_ok(),
        }
    }
}
