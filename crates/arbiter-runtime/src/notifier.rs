//! Per-session fan-out of "something changed" events (§4.7).
//!
//! Keyed by session id rather than by a fixed topic enum — sessions are
//! created dynamically, so the channel map grows lazily, the same shape as
//! the teacher's topic-keyed event bus but with a dynamic key space.

use std::collections::HashMap;
use std::sync::Arc;

use arbiter_core::SessionId;
use tokio::sync::{broadcast, RwLock};

/// Carries no state beyond the session id — subscribers always re-read.
#[derive(Clone, Debug)]
pub struct ChangeEvent {
    pub session_id: SessionId,
}

/// Best-effort, in-memory change notifier.
///
/// Delivery is best-effort: a subscriber that falls behind the channel
/// capacity misses events rather than blocking the publisher. Channels with
/// no subscribers are not proactively pruned — the next broadcast to an
/// empty channel is simply a no-op send, matching the teacher's event bus.
pub struct ChangeNotifier {
    channels: Arc<RwLock<HashMap<SessionId, broadcast::Sender<ChangeEvent>>>>,
    capacity: usize,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publishes a change for `session_id`. A failed send (no subscribers)
    /// is normal and silently ignored.
    pub async fn publish(&self, session_id: SessionId) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&session_id) {
            let _ = tx.send(ChangeEvent { session_id });
        }
        // No channel has been created yet: nobody has ever subscribed, so
        // there is nothing to notify.
    }

    /// Subscribes to change events for `session_id`, creating its channel
    /// if this is the first subscriber.
    pub async fn subscribe(&self, session_id: &SessionId) -> broadcast::Receiver<ChangeEvent> {
        if let Some(tx) = self.channels.read().await.get(session_id) {
            return tx.subscribe();
        }
        let mut channels = self.channels.write().await;
        channels
            .entry(session_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}
