//! Shared application state for the HTTP server.
//!
//! [`AppState`] holds the validated game configuration, one economy engine
//! shared by every player, the clock, and the table of live sessions. Each
//! session sits behind its own mutex so actions for different players never
//! contend.
//!
//! Sessions leave the table when deleted or, when an idle timeout is
//! configured, once nobody has looked them up for that long.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use farpost_core::{Clock, GameConfig, GameSession};
use farpost_economy::{CatalogError, EconomyEngine};
use farpost_types::{LoadSource, PlayerId};

/// One player's session behind its lock.
pub type SharedSession = Arc<Mutex<GameSession>>;

#[derive(Debug)]
struct SessionEntry {
    session: SharedSession,
    /// Epoch milliseconds of the last lookup.
    last_seen: AtomicI64,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// The loaded game configuration.
    pub config: Arc<GameConfig>,
    engine: EconomyEngine,
    clock: Arc<dyn Clock>,
    sessions: RwLock<BTreeMap<PlayerId, SessionEntry>>,
}

impl AppState {
    /// Build the state from a validated configuration.
    pub fn new(config: GameConfig, clock: Arc<dyn Clock>) -> Result<Self, CatalogError> {
        let engine = EconomyEngine::new(config.economy.clone())?;
        Ok(Self {
            config: Arc::new(config),
            engine,
            clock,
            sessions: RwLock::new(BTreeMap::new()),
        })
    }

    /// Open a session for a new player, loading `primary` or `backup` state
    /// when given and usable.
    pub async fn create_session(
        &self,
        primary: Option<&Value>,
        backup: Option<&Value>,
    ) -> (PlayerId, LoadSource, SharedSession) {
        let mut session = GameSession::new(self.engine.clone(), Arc::clone(&self.clock));
        session.set_speed_multiplier(self.config.session.speed_multiplier);
        let source = if primary.is_some() || backup.is_some() {
            session.load_or_fallback(primary, backup)
        } else {
            LoadSource::Fresh
        };

        let id = PlayerId::new();
        let shared = Arc::new(Mutex::new(session));
        let entry = SessionEntry {
            session: Arc::clone(&shared),
            last_seen: AtomicI64::new(self.clock.now_ms()),
        };
        let total = {
            let mut sessions = self.sessions.write().await;
            sessions.insert(id, entry);
            sessions.len()
        };
        info!(player = %id, ?source, total, "Player session opened");
        (id, source, shared)
    }

    /// Look up a player's session and mark it as in use.
    pub async fn session(&self, id: PlayerId) -> Option<SharedSession> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id)?;
        entry.last_seen.store(self.clock.now_ms(), Ordering::Relaxed);
        Some(Arc::clone(&entry.session))
    }

    /// Close a player's session. Returns `false` when there was none.
    pub async fn remove_session(&self, id: PlayerId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(player = %id, "Player session closed");
        }
        removed
    }

    /// Close every session not looked up within the configured idle
    /// timeout. Returns the number closed.
    pub async fn evict_idle(&self) -> usize {
        let timeout_secs = self.config.server.idle_timeout_secs;
        if timeout_secs == 0 {
            return 0;
        }
        let timeout_ms = i64::try_from(timeout_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let cutoff = self.clock.now_ms().saturating_sub(timeout_ms);

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_seen.load(Ordering::Relaxed) > cutoff;
            if !keep {
                debug!(player = %id, "Evicting idle session");
            }
            keep
        });
        let evicted = before.saturating_sub(sessions.len());
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Idle sessions closed");
        }
        evicted
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Fire due extraction timers in every session. Returns the number of
    /// extractions completed.
    pub async fn poll_all(&self) -> usize {
        let sessions: Vec<SharedSession> = self
            .sessions
            .read()
            .await
            .values()
            .map(|entry| Arc::clone(&entry.session))
            .collect();
        let mut completed: usize = 0;
        for session in sessions {
            completed = completed.saturating_add(session.lock().await.poll_timers());
        }
        completed
    }
}
