use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::repositories::ShortLinkRepositoryTrait;

/// Non-blocking handle used on the redirect path to queue click increments
#[derive(Clone)]
pub struct ClickDispatcher {
    sender: mpsc::UnboundedSender<String>,
}

/// Background worker applying queued increments to the repository
pub struct ClickRecorder {
    worker: JoinHandle<u64>,
}

impl ClickRecorder {
    /// Spawns the worker and returns it with the dispatcher feeding it
    pub fn start(
        repository: Arc<dyn ShortLinkRepositoryTrait>,
        call_timeout: Duration,
    ) -> (ClickDispatcher, ClickRecorder) {
        // Unbounded so a burst of redirects never loses a click
        let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

        let worker = tokio::spawn(async move {
            let mut recorded = 0u64;
            while let Some(code) = receiver.recv().await {
                match tokio::time::timeout(call_timeout, repository.increment_clicks(&code)).await
                {
                    Ok(Ok(())) => recorded += 1,
                    Ok(Err(e)) => error!("Failed to record click for '{}': {}", code, e),
                    Err(_) => error!(
                        "Recording click for '{}' timed out after {:?}",
                        code, call_timeout
                    ),
                }
            }
            debug!("Click recorder queue closed");
            recorded
        });

        (ClickDispatcher { sender }, ClickRecorder { worker })
    }

    /// Waits for queued clicks to be written once every dispatcher is dropped
    pub async fn drain(self, timeout: Duration) {
        match tokio::time::timeout(timeout, self.worker).await {
            Ok(Ok(recorded)) => info!("Click recorder drained, {} clicks recorded", recorded),
            Ok(Err(e)) => error!("Click recorder worker failed: {}", e),
            Err(_) => warn!("Click recorder did not drain within {:?}", timeout),
        }
    }
}

impl ClickDispatcher {
    /// Queues one increment without waiting; only a closed queue drops the click
    pub fn dispatch(&self, code: &str) {
        if let Err(mpsc::error::SendError(code)) = self.sender.send(code.to_string()) {
            warn!("Click queue closed, dropping click for '{}'", code);
        }
    }
}
