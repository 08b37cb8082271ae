use std::time::Duration;
use tokio::sync::watch;

/// Owner side of the custom action cancellation flag.
#[derive(Debug)]
pub struct CancelSignal {
    tx: watch::Sender<bool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Sets the flag and wakes every waiting [`CancelToken`].
    pub fn set(&self, cancel: bool) { self.tx.send_replace(cancel); }

    pub fn reset(&self) { self.tx.send_replace(false); }

    pub fn is_set(&self) -> bool { *self.tx.borrow() }

    pub fn token(&self) -> CancelToken { CancelToken { rx: self.tx.subscribe() } }
}

impl Default for CancelSignal {
    fn default() -> Self { Self::new() }
}

/// Handed into every cancellable suspension point of an action.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool { *self.rx.borrow() }

    /// Resolves once the flag is set.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|c| *c).await.is_err();
        if closed {
            // signal dropped, nothing can cancel anymore
            std::future::pending::<()>().await;
        }
    }

    /// Sleeps for `dur` or until cancelled. Returns `true` if cancelled.
    pub async fn wait(&self, dur: Duration) -> bool {
        tokio::time::timeout(dur, self.cancelled()).await.is_ok()
    }
}
