//! Best-effort fan-out of alert texts to connected subscribers.
//!
//! Backed by `tokio::sync::broadcast`: sending never blocks, and each
//! subscriber owns a bounded queue. A subscriber that falls behind by more
//! than the buffer is dropped instead of being waited on. Nothing is replayed
//! to subscribers that connect later.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Shared sender side of the push channel.
#[derive(Debug, Clone)]
pub struct Hub {
    tx: broadcast::Sender<String>,
}

impl Hub {
    /// Creates a hub where each subscriber may queue up to `buffer` alerts.
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    /// Registers a new subscriber. It only sees alerts sent from now on.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Queues `message` for every connected subscriber.
    ///
    /// Returns how many subscribers it was queued for; zero when nobody is
    /// connected.
    pub fn broadcast(&self, message: impl Into<String>) -> usize {
        let message = message.into();
        match self.tx.send(message) {
            Ok(count) => {
                tracing::debug!(subscriber_count = count, "alert queued");
                count
            }
            Err(_) => {
                tracing::debug!("no subscribers connected, alert dropped");
                0
            }
        }
    }

    /// Number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiving side held by one connection.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<String>,
}

impl Subscription {
    /// Waits for the next alert.
    ///
    /// Returns `None` when the hub is gone or this subscriber lagged past its
    /// buffer; either way the connection should be closed.
    pub async fn recv(&mut self) -> Option<String> {
        match self.rx.recv().await {
            Ok(message) => Some(message),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "dropping lagging subscriber");
                None
            }
            Err(RecvError::Closed) => None,
        }
    }
}
