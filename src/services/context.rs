use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

/// Why a bounded call did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    TimedOut,
    Cancelled,
}

/// Per-request bounds applied to every store and pool call.
///
/// Each call gets its own timeout. All calls also watch a shared cancellation
/// signal; once it fires, outstanding calls are dropped.
#[derive(Clone)]
pub struct RequestContext {
    call_timeout: Duration,
    cancel: watch::Receiver<bool>,
}

/// Fires the cancellation signal observed by every [`RequestContext`] it created
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn context(&self, call_timeout: Duration) -> RequestContext {
        RequestContext {
            call_timeout,
            cancel: self.sender.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// Runs `fut` until it completes, the call timeout elapses, or the context is cancelled
    pub async fn bound<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        let mut cancel = self.cancel.clone();

        tokio::select! {
            biased;
            _ = wait_cancelled(&mut cancel) => Err(Interrupted::Cancelled),
            result = tokio::time::timeout(self.call_timeout, fut) => {
                result.map_err(|_| Interrupted::TimedOut)
            }
        }
    }
}

async fn wait_cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        // Sender gone: nothing can cancel this context anymore
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
