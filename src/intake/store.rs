//! Session store: in-memory table of sessions with per-session locking.
//!
//! The outer map is only locked long enough to find or create an entry. Each
//! entry has its own mutex, so one session's slow collaborator call never
//! blocks another session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use super::model::{Session, SessionId};

/// A stored session plus bookkeeping.
#[derive(Debug)]
pub struct SessionEntry {
    session: Session,
    last_active: Instant,
    /// Set when the entry has been dropped from the table. A holder of a
    /// stale `Arc` must look the id up again instead of committing here.
    evicted: bool,
}

impl SessionEntry {
    fn new(id: SessionId) -> Self {
        Self {
            session: Session::new(id),
            last_active: Instant::now(),
            evicted: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replace the recorded session.
    pub fn commit(&mut self, session: Session) {
        self.session = session;
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }
}

/// Exclusive access to one session for the duration of an event.
pub type SessionGuard = OwnedMutexGuard<SessionEntry>;

/// In-memory session table. Nothing is persisted.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: RwLock<HashMap<SessionId, Arc<Mutex<SessionEntry>>>>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn entry(&self, id: &SessionId) -> Arc<Mutex<SessionEntry>> {
        if let Some(entry) = self.entries.read().await.get(id) {
            return Arc::clone(entry);
        }
        let mut entries = self.entries.write().await;
        Arc::clone(entries.entry(id.clone()).or_insert_with(|| {
            debug!(session = %id, "Creating session");
            Arc::new(Mutex::new(SessionEntry::new(id.clone())))
        }))
    }

    /// Lock a session, creating it in `Initial` if unseen. Waits while another
    /// event for the same session holds the lock.
    pub async fn lock(&self, id: &SessionId) -> SessionGuard {
        loop {
            let mut guard = self.entry(id).await.lock_owned().await;
            if guard.evicted {
                // Pruned between lookup and lock; the table holds a new entry.
                continue;
            }
            guard.last_active = Instant::now();
            return guard;
        }
    }

    /// Snapshot of a session, creating it in `Initial` if unseen.
    pub async fn get(&self, id: &SessionId) -> Session {
        self.lock(id).await.session.clone()
    }

    /// Overwrite a session.
    pub async fn put(&self, id: &SessionId, session: Session) {
        self.lock(id).await.commit(session);
    }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop sessions idle for at least `ttl`. Sessions that are locked right
    /// now are in use and always kept. Returns the number removed.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|id, entry| match entry.try_lock() {
            Ok(mut guard) if guard.idle_for() >= ttl => {
                debug!(session = %id, "Evicting idle session");
                guard.evicted = true;
                false
            }
            _ => true,
        });

        let removed = before - entries.len();
        if removed > 0 {
            info!(count = removed, "Evicted idle sessions");
        }
        removed
    }
}

/// Spawn a background task that periodically evicts idle sessions.
pub fn spawn_pruning_task(
    store: Arc<SessionStore>,
    interval: Duration,
    ttl: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // Skip immediate first tick
        loop {
            ticker.tick().await;
            store.prune_idle(ttl).await;
        }
    })
}
