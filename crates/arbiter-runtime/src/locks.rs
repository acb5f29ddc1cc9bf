//! A keyed lock manager: at most one holder per session id, unbounded
//! concurrency across session ids (§9, "Per-session locking").

use std::collections::HashMap;
use std::sync::Arc;

use arbiter_core::SessionId;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Lazily creates and hands out one [`tokio::sync::Mutex`] per session id.
///
/// Different sessions never contend: acquiring the lock for session A never
/// blocks on session B. The map itself is covered by a short-lived `RwLock`
/// only for the lazy-insert; the returned guard is held for the duration of
/// the arbiter's critical section, not the map lock.
#[derive(Default)]
pub struct SessionLocks {
    locks: RwLock<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get_or_create(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(session_id) {
            return Arc::clone(lock);
        }
        let mut locks = self.locks.write().await;
        Arc::clone(
            locks
                .entry(session_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Acquires the exclusive lock for `session_id`, blocking until free.
    pub async fn lock(&self, session_id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = self.get_or_create(session_id).await;
        lock.lock_owned().await
    }
}
