//! Reactive admin notification feed.
//!
//! The feed holds the server's notification list behind a watch channel:
//! subscribers always see the latest full list and derive the unread count
//! from its length (no per-item read state is tracked). Refreshes replace the
//! list wholesale; deletes remove locally after the server acknowledges,
//! without a re-fetch.
//!
//! An optional background loop polls the backend on an interval. A fetch
//! failure is logged and waits for the next tick; nothing retries within an
//! attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::ApiError;
use crate::model::AdminNotification;
use crate::services::NotificationService;

/// Default interval between background polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Shared notification list with broadcast updates.
///
/// `Clone` is cheap; all clones publish into the same channel.
#[derive(Clone, Debug)]
pub struct NotificationFeed {
    service: NotificationService,
    list_tx: Arc<watch::Sender<Vec<AdminNotification>>>,
}

impl NotificationFeed {
    /// An empty feed over the given gateway service.
    pub fn new(service: NotificationService) -> Self {
        let (list_tx, _) = watch::channel(Vec::new());
        Self {
            service,
            list_tx: Arc::new(list_tx),
        }
    }

    /// Subscribe to the notification list. The receiver immediately holds
    /// the current list.
    pub fn watch(&self) -> watch::Receiver<Vec<AdminNotification>> {
        self.list_tx.subscribe()
    }

    /// A snapshot of the current list.
    pub fn current(&self) -> Vec<AdminNotification> {
        self.list_tx.borrow().clone()
    }

    /// The unread badge count: simply the list length.
    pub fn unread_count(&self) -> usize {
        self.list_tx.borrow().len()
    }

    /// Fetch the list wholesale and replace the published one.
    ///
    /// The previous list is discarded entirely; there is no merging and no
    /// generation stamping, so the last completed fetch wins.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`ApiError`]; the published list is left
    /// untouched on failure.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let notifications = self.service.fetch_all().await?;
        self.list_tx.send_replace(notifications);
        Ok(())
    }

    /// Delete one notification on the server, then drop it from the local
    /// list. Optimistic: no re-fetch after the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`ApiError`]; on failure the local list keeps
    /// the entry.
    pub async fn delete(&self, id: i64) -> Result<String, ApiError> {
        let ack = self.service.delete(id).await?;
        self.list_tx
            .send_modify(|list| list.retain(|n| n.id != id));
        Ok(ack)
    }

    /// Spawn a background loop polling the backend every `interval`.
    ///
    /// The first poll happens immediately. Fetch failures are logged and the
    /// loop waits for the next tick. The returned handle stops the loop; the
    /// feed itself stays usable after shutdown.
    pub fn start_polling(&self, interval: Duration) -> FeedHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let feed = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = feed.refresh().await {
                            tracing::warn!(error = %e, "notification poll failed, will retry on next tick");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            return;
                        }
                    }
                }
            }
        });

        FeedHandle {
            shutdown_tx,
            task: Arc::new(tokio::sync::Mutex::new(Some(task))),
        }
    }
}

/// Handle for stopping the background poll loop.
///
/// Dropping the handle does **not** stop the loop -- call
/// [`shutdown`](FeedHandle::shutdown). `Clone` is cheap; any clone may shut
/// the loop down, and subsequent calls return immediately.
#[derive(Clone)]
pub struct FeedHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Arc<tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

impl FeedHandle {
    /// Signal the loop to stop and wait for it to exit.
    pub async fn shutdown(&self) {
        // Receiver may already be gone if the task exited; that's fine.
        let _ = self.shutdown_tx.send(true);

        let task = self.task.lock().await.take();
        if let Some(join_handle) = task
            && let Err(e) = join_handle.await
        {
            tracing::error!(error = %e, "notification poll task panicked");
        }
    }
}
