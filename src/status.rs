//! Transient success/error banners for list views.
//!
//! Gateway failures are reduced to a display string and shown briefly, never
//! left permanently on screen. Each view owns one [`StatusMessages`]; setting
//! a message publishes it on a watch channel and schedules an automatic clear
//! after a fixed delay. A newer message supersedes the pending clear of an
//! older one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;

/// How long a banner stays up by default.
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// A pair of auto-dismissing message channels (success and error).
///
/// `Clone` is cheap; all clones publish into the same channels.
#[derive(Clone, Debug)]
pub struct StatusMessages {
    success: Banner,
    error: Banner,
}

impl StatusMessages {
    /// Channels that clear [`DEFAULT_DISMISS_AFTER`] after each message.
    pub fn new() -> Self {
        Self::with_dismiss_after(DEFAULT_DISMISS_AFTER)
    }

    /// Channels with a custom dismiss delay.
    pub fn with_dismiss_after(dismiss_after: Duration) -> Self {
        Self {
            success: Banner::new(dismiss_after),
            error: Banner::new(dismiss_after),
        }
    }

    /// Subscribe to the success banner. `None` means hidden.
    pub fn watch_success(&self) -> watch::Receiver<Option<String>> {
        self.success.tx.subscribe()
    }

    /// Subscribe to the error banner. `None` means hidden.
    pub fn watch_error(&self) -> watch::Receiver<Option<String>> {
        self.error.tx.subscribe()
    }

    /// Show a success message, scheduling its dismissal.
    ///
    /// Must be called from within a tokio runtime (the dismissal is a
    /// spawned sleep).
    pub fn set_success(&self, message: impl Into<String>) {
        self.success.publish(message.into());
    }

    /// Show an error message, scheduling its dismissal.
    pub fn set_error(&self, message: impl Into<String>) {
        self.error.publish(message.into());
    }

    /// Hide both banners immediately.
    pub fn clear(&self) {
        self.success.tx.send_replace(None);
        self.error.tx.send_replace(None);
    }
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self::new()
    }
}

/// One auto-dismissing channel.
#[derive(Clone, Debug)]
struct Banner {
    tx: Arc<watch::Sender<Option<String>>>,
    /// Generation stamp of the latest publish. A scheduled clear only fires
    /// if no newer message has replaced the one it was armed for.
    generation: Arc<AtomicU64>,
    dismiss_after: Duration,
}

impl Banner {
    fn new(dismiss_after: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            dismiss_after,
        }
    }

    fn publish(&self, message: String) {
        let armed = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.tx.send_replace(Some(message));

        let tx = self.tx.clone();
        let generation = self.generation.clone();
        let dismiss_after = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            if generation.load(Ordering::Acquire) == armed {
                tx.send_replace(None);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn message_shows_then_auto_dismisses() {
        let status = StatusMessages::with_dismiss_after(Duration::from_secs(5));
        let rx = status.watch_error();
        assert_eq!(*rx.borrow(), None);

        status.set_error("Failed to load transactions.");
        assert_eq!(rx.borrow().as_deref(), Some("Failed to load transactions."));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(*rx.borrow(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_outlives_older_dismissal() {
        let status = StatusMessages::with_dismiss_after(Duration::from_secs(5));
        let rx = status.watch_success();

        status.set_success("first");
        tokio::time::sleep(Duration::from_secs(3)).await;
        status.set_success("second");

        // The first message's timer fires at t=5; the second message must
        // survive it and clear on its own schedule at t=8.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(rx.borrow().as_deref(), Some("second"));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(*rx.borrow(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn success_and_error_channels_are_independent() {
        let status = StatusMessages::with_dismiss_after(Duration::from_secs(5));
        status.set_success("saved");
        status.set_error("reload failed");

        assert_eq!(status.watch_success().borrow().as_deref(), Some("saved"));
        assert_eq!(status.watch_error().borrow().as_deref(), Some("reload failed"));
    }

    #[tokio::test]
    async fn clear_hides_both_immediately() {
        let status = StatusMessages::new();
        status.set_success("saved");
        status.set_error("failed");
        status.clear();
        assert_eq!(*status.watch_success().borrow(), None);
        assert_eq!(*status.watch_error().borrow(), None);
    }
}
