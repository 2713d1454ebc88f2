//! Notification adapters
//!
//! Implements the NotificationSink port for BlockAccepted events

use crate::ports::{Notification, NotificationSink};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::trace;

/// Default channel capacity for the broadcast notifier.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 1024;

/// Broadcast notifier fanning events out to any number of subscribers.
///
/// Publishing never blocks; slow receivers observe `Lagged` on their side.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
    published: AtomicU64,
}

impl BroadcastNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_NOTIFICATION_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total notifications published, delivered or not.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for BroadcastNotifier {
    fn publish(&self, notification: Notification) {
        self.published.fetch_add(1, Ordering::Relaxed);
        let kind = notification.kind;
        match self.sender.send(notification) {
            Ok(receivers) => trace!(?kind, receivers, "Notification published"),
            Err(_) => trace!(?kind, "Notification dropped, no subscribers"),
        }
    }
}

/// In-memory notifier recording every event, for tests
#[derive(Default)]
pub struct RecordingNotifier {
    events: RwLock<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<Notification> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Hashes of accepted blocks, in publication order.
    pub fn accepted_hashes(&self) -> Vec<shared_types::Hash> {
        self.events.read().iter().map(|n| n.block.hash()).collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn publish(&self, notification: Notification) {
        self.events.write().push(notification);
    }
}
