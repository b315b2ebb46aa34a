use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::builder::session::{Session, SessionView};

/// In-memory session registry shared through `AppState`.
///
/// Each closure passed to `update` runs under the write lock, which
/// serializes transitions per store. Never hold the lock across `.await`;
/// the analysis pipeline runs between two separate `update` calls.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionView {
        let session = Session::new();
        let view = session.view();
        self.sessions.write().await.insert(session.id(), session);
        view
    }

    pub async fn view(&self, id: Uuid) -> Option<SessionView> {
        self.read(id, Session::view).await
    }

    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&Session) -> T) -> Option<T> {
        self.sessions.read().await.get(&id).map(f)
    }

    /// Runs `f` against the session, returning `None` if it does not exist.
    pub async fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        self.sessions.write().await.get_mut(&id).map(f)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drops sessions last touched before `cutoff`. Sessions with an analysis
    /// in flight are kept. Returns how many were removed.
    pub async fn evict_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_processing() || s.updated_at() >= cutoff);
        before - sessions.len()
    }

    /// Every `every`, evicts sessions idle for longer than `idle_ttl`.
    pub fn spawn_idle_sweeper(&self, idle_ttl: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let idle_ttl = chrono::Duration::from_std(idle_ttl).unwrap_or(chrono::Duration::MAX);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(cutoff) = Utc::now().checked_sub_signed(idle_ttl) else {
                    continue;
                };
                let evicted = store.evict_idle(cutoff).await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle session(s)");
                }
            }
        })
    }
}
