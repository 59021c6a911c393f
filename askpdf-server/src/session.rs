use std::{
    collections::HashMap,
    sync::{Arc, PoisonError},
    time::Duration,
};

use askpdf_rag::DocumentIndex;
use tokio::{
    sync::{Mutex, MutexGuard, RwLock},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::info;
use uuid::Uuid;

use crate::protocol::SessionId;

/// What a session holds between requests: at most one indexed document.
#[derive(Debug, Default)]
pub struct SessionSlot {
    pub index: Option<Arc<DocumentIndex>>,
}

impl SessionSlot {
    /// Swap in a new document index, returning the one it replaces.
    pub fn replace(&mut self, index: DocumentIndex) -> Option<Arc<DocumentIndex>> {
        self.index.replace(Arc::new(index))
    }

    pub fn clear(&mut self) -> Option<Arc<DocumentIndex>> {
        self.index.take()
    }
}

/// One browser tab's state. Requests within a session are serialized by the mutex.
#[derive(Debug)]
pub struct SessionState {
    slot: Mutex<SessionSlot>,
    last_used: std::sync::Mutex<Instant>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self { slot: Mutex::default(), last_used: std::sync::Mutex::new(Instant::now()) }
    }
}

impl SessionState {
    pub async fn lock(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().await
    }

    fn touch(&self) {
        *self.last_used.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_used.lock().unwrap_or_else(PoisonError::into_inner).elapsed()
    }

    /// An interaction holds the slot lock for its whole duration.
    fn is_busy(&self) -> bool {
        self.slot.try_lock().is_err()
    }
}

#[derive(Debug, Default, Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<SessionState>>>>,
}

impl SessionManager {
    pub async fn create_session(&self) -> SessionId {
        let session_id = Uuid::new_v4().to_string();
        let state = Arc::new(SessionState::default());
        self.sessions.write().await.insert(session_id.clone(), state);
        session_id
    }

    /// Look up a session and reset its idle timer.
    pub async fn get(&self, session_id: &str) -> Option<Arc<SessionState>> {
        let sessions = self.sessions.read().await;
        let state = sessions.get(session_id).cloned()?;
        state.touch();
        Some(state)
    }

    pub async fn remove_session(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Drop every session unused for at least `max_idle`, except those with an
    /// interaction in progress. Returns how many were dropped.
    pub async fn remove_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, state| state.is_busy() || state.idle_for() < max_idle);
        before - sessions.len()
    }

    /// Run [`remove_idle`](Self::remove_idle) in the background every quarter of `ttl`.
    pub fn spawn_idle_sweep(&self, ttl: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        let period = (ttl / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = manager.remove_idle(ttl).await;
                if removed > 0 {
                    info!(removed, ttl_secs = ttl.as_secs(), "expired idle sessions");
                }
            }
        })
    }
}
