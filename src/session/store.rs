use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use super::Session;
use crate::config::SessionConfig;

/// All live sessions, keyed by the opaque value of the session cookie.
///
/// Sessions never share state; the map only provides concurrent access to
/// independent entries.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session under a fresh id and return the id
    pub fn insert(&self, session: Session) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Get a copy of the session, marking it as active
    pub fn load(&self, id: &str) -> Option<Session> {
        let mut entry = self.sessions.get_mut(id)?;
        entry.touch();
        Some(entry.clone())
    }

    /// Write a loaded copy back; returns whether it was stored.
    ///
    /// Ignored if the session was removed in the meantime. A copy loaded
    /// before another save is stale. It is dropped when the stored identity
    /// changed since it was loaded. Otherwise it is written, keeping the
    /// stored notice unless it queued one of its own.
    pub fn save(&self, id: &str, mut session: Session) -> bool {
        let Some(mut entry) = self.sessions.get_mut(id) else {
            return false;
        };

        if session.revision != entry.revision {
            if session.generation < entry.generation {
                tracing::debug!(
                    loaded = session.revision,
                    current = entry.revision,
                    "Dropped stale session write"
                );
                return false;
            }
            if session.generation == entry.generation && session.notice.is_none() {
                session.notice = entry.notice.take();
            }
        }

        session.revision = entry.revision + 1;
        *entry = session;
        true
    }

    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than `max_idle`; returns how many
    pub fn purge_idle(&self, max_idle: Duration) -> usize {
        let max_idle = match chrono::Duration::from_std(max_idle) {
            Ok(d) => d,
            Err(_) => return 0,
        };
        let cutoff = Utc::now() - max_idle;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.last_seen() >= cutoff);
        before.saturating_sub(self.sessions.len())
    }
}

/// Spawn the background task expiring idle sessions
pub fn spawn_purge_task(store: Arc<SessionStore>, config: SessionConfig) {
    if config.idle_timeout_secs == 0 {
        tracing::info!("Session expiry is disabled");
        return;
    }

    tracing::info!(
        idle_timeout_secs = config.idle_timeout_secs,
        interval_secs = config.purge_interval_secs,
        "Starting session purge task"
    );

    let max_idle = Duration::from_secs(config.idle_timeout_secs);
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(config.purge_interval_secs.max(1)));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick.tick().await;
            let purged = store.purge_idle(max_idle);
            if purged > 0 {
                tracing::debug!(purged, remaining = store.len(), "Purged idle sessions");
            }
        }
    });
}
