//! Registry of live intake sessions, one per browser visit.
//!
//! A visit that is abandoned mid-wizard never says goodbye, so sessions
//! idle for longer than the configured timeout are dropped: lazily when
//! looked up, and in bulk by a periodic sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::session::IntakeSession;
use super::state::Role;

/// Default time a session may sit untouched before it is dropped.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<IntakeSession>>;

/// In-memory map of session id → session. Sessions are independent; the
/// registry only hands them out and forgets them.
pub struct IntakeRegistry {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    idle_timeout: TimeDelta,
}

impl Default for IntakeRegistry {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_SESSION_IDLE_TIMEOUT)
    }
}

impl IntakeRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registry whose sessions expire after `idle_timeout` without activity.
    pub fn with_idle_timeout(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self::with_timeout(idle_timeout))
    }

    fn with_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: TimeDelta::from_std(idle_timeout).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Open a new session for the given entry point.
    pub async fn create(&self, role: Role) -> SessionHandle {
        let session = IntakeSession::new(role);
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, Arc::clone(&handle));
        info!(session = %id, %role, "Intake session opened");
        handle
    }

    /// Look up a live session. An idle one is dropped and reported missing.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let handle = self.sessions.read().await.get(&id).cloned()?;
        if self.expired(&handle) {
            if self.sessions.write().await.remove(&id).is_some() {
                info!(session = %id, "Intake session expired");
            }
            return None;
        }
        Some(handle)
    }

    /// Drop a session. Returns whether it existed.
    pub async fn discard(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session = %id, "Intake session discarded");
        }
        removed
    }

    /// Drop every idle session. Returns how many were removed.
    pub async fn prune_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| !self.expired(handle));
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "Pruned idle intake sessions");
        } else {
            debug!(remaining = sessions.len(), "No idle intake sessions");
        }
        pruned
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    // A session locked by a request in progress is in use, not idle.
    fn expired(&self, handle: &SessionHandle) -> bool {
        handle
            .try_lock()
            .is_ok_and(|session| session.is_idle(self.idle_timeout, Utc::now()))
    }
}

/// Spawn a background task that periodically drops idle sessions.
pub fn spawn_prune_task(
    registry: Arc<IntakeRegistry>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            registry.prune_idle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::state::IntakeAction;

    #[tokio::test]
    async fn create_get_discard() {
        let registry = IntakeRegistry::new();
        let handle = registry.create(Role::Student).await;
        let id = handle.lock().await.id();

        assert_eq!(registry.len().await, 1);
        assert!(registry.get(id).await.is_some());

        assert!(registry.discard(id).await);
        assert!(registry.get(id).await.is_none());
        assert!(!registry.discard(id).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn idle_session_is_gone_on_lookup() {
        let registry = IntakeRegistry::with_idle_timeout(Duration::from_millis(20));
        let handle = registry.create(Role::Student).await;
        let id = handle.lock().await.id();
        drop(handle);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(registry.get(id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn abandoned_visits_are_pruned() {
        let registry = IntakeRegistry::with_idle_timeout(Duration::from_millis(20));
        for _ in 0..1000 {
            registry.create(Role::Student).await;
        }
        assert_eq!(registry.len().await, 1000);

        tokio::time::sleep(Duration::from_millis(40)).await;
        let active = registry.create(Role::Parent).await;
        let active_id = active.lock().await.id();

        assert_eq!(registry.prune_idle().await, 1000);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(active_id).await.is_some());
    }

    #[tokio::test]
    async fn activity_keeps_session_alive() {
        let registry = IntakeRegistry::with_idle_timeout(Duration::from_millis(60));
        let handle = registry.create(Role::Student).await;
        let id = handle.lock().await.id();

        tokio::time::sleep(Duration::from_millis(40)).await;
        handle.lock().await.apply(IntakeAction::Start).unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(registry.prune_idle().await, 0);
        assert!(registry.get(id).await.is_some());
    }

    #[tokio::test]
    async fn prune_task_sweeps_in_background() {
        let registry = IntakeRegistry::with_idle_timeout(Duration::from_millis(10));
        registry.create(Role::Student).await;

        let task = spawn_prune_task(Arc::clone(&registry), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(80)).await;
        task.abort();

        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let registry = IntakeRegistry::new();
        let a = registry.create(Role::Student).await;
        let b = registry.create(Role::Parent).await;

        a.lock().await.apply(IntakeAction::Start).unwrap();

        let b = b.lock().await;
        assert_eq!(b.step().id(), "intro");
        assert_eq!(b.role(), Role::Parent);
    }
}
