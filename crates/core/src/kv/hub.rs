//! Change subscriber registry and broadcast support

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use super::StorageChange;

/// Subscriber ID type
pub type SubscriberId = u64;

/// Global subscriber ID counter
static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Hub fanning storage changes out to every subscriber
///
/// Each subscriber owns an unbounded channel. A subscriber that went away
/// without unregistering is pruned on the next broadcast.
#[derive(Clone)]
pub struct ChangeHub {
    subscribers: Arc<Mutex<HashMap<SubscriberId, Sender<StorageChange>>>>,
}

impl ChangeHub {
    /// Create a new hub
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Generate a unique subscriber ID
    fn next_subscriber_id() -> SubscriberId {
        NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::SeqCst)
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> ChangeSubscription {
        let (tx, rx) = unbounded();
        let id = Self::next_subscriber_id();
        self.subscribers.lock().unwrap().insert(id, tx);
        ChangeSubscription {
            id,
            receiver: rx,
            hub: self.clone(),
        }
    }

    /// Unregister a subscriber
    pub fn unregister(&self, id: SubscriberId) {
        self.subscribers.lock().unwrap().remove(&id);
    }

    /// Get count of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Broadcast a batch of changes to all subscribers
    pub fn broadcast(&self, changes: &[StorageChange]) {
        if changes.is_empty() {
            return;
        }
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|_id, sender| {
            changes
                .iter()
                .all(|change| sender.send(change.clone()).is_ok())
        });
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a hub registration
///
/// Unregisters itself on drop.
pub struct ChangeSubscription {
    id:       SubscriberId,
    receiver: Receiver<StorageChange>,
    hub:      ChangeHub,
}

impl ChangeSubscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub(crate) fn receiver(&self) -> &Receiver<StorageChange> {
        &self.receiver
    }

    /// Block until the next change; `None` once the hub side is gone
    pub fn recv(&self) -> Option<StorageChange> {
        self.receiver.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<StorageChange> {
        match self.receiver.recv_timeout(timeout) {
            Ok(change) => Some(change),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<StorageChange> {
        match self.receiver.try_recv() {
            Ok(change) => Some(change),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}
