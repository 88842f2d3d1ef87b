//! QuizManager: restores, mutates and persists a visitor's quiz.
//!
//! State is read from the settings store when a visitor's quiz is loaded
//! and written back after every answer or step change. Storage trouble is
//! never surfaced: unreadable or malformed state means "no saved state".
//!
//! Changes for one visitor are serialized: each load, change and write-back
//! runs while holding that visitor's turn, so overlapping requests from two
//! tabs cannot overwrite each other's answers.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::FlowError;
use crate::intake::Role;
use crate::store::SettingsStore;

use super::questions::{Band, Question, QuestionId};
use super::session::{QuizSession, QuizSnapshot};

/// Settings key holding the persisted quiz document.
pub const QUIZ_STATE_KEY: &str = "quiz-answers";

/// Result card shown once every question is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub band: Band,
    pub message: &'static str,
    /// Intake flows the result card links to.
    pub funnels: [Role; 2],
}

/// Everything the quiz view needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizStatus {
    #[serde(flatten)]
    pub snapshot: QuizSnapshot,
    pub total: usize,
    pub progress: u8,
    pub question: &'static Question,
    pub score: u32,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<QuizResult>,
}

impl QuizStatus {
    pub fn from_session(session: &QuizSession) -> Self {
        let complete = session.is_complete();
        let band = session.band();
        Self {
            snapshot: session.snapshot(),
            total: session.total(),
            progress: session.progress_percent(),
            question: session.current_question().question(),
            score: session.score(),
            complete,
            result: complete.then_some(QuizResult {
                band,
                message: band.message(),
                funnels: [Role::Student, Role::Parent],
            }),
        }
    }
}

type VisitorLocks = std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>;

/// Exclusive right to change one visitor's quiz. Dropping it lets the next
/// request in, and forgets the visitor's lock once nobody is queued on it.
struct VisitorTurn<'a> {
    locks: &'a VisitorLocks,
    visitor: String,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for VisitorTurn<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference lives in the map, one in our guard.
        if locks
            .get(&self.visitor)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2)
        {
            locks.remove(&self.visitor);
        }
    }
}

/// Coordinates quiz state with the injected settings store.
pub struct QuizManager {
    store: Arc<dyn SettingsStore>,
    locks: VisitorLocks,
}

impl QuizManager {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Wait until no other request is changing `visitor`'s quiz.
    async fn turn(&self, visitor: &str) -> VisitorTurn<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(visitor.to_string()).or_default())
        };
        VisitorTurn {
            locks: &self.locks,
            visitor: visitor.to_string(),
            _guard: lock.lock_owned().await,
        }
    }

    /// Restore a visitor's quiz, or start fresh.
    pub async fn load(&self, visitor: &str) -> QuizSession {
        let value = match self.store.get_setting(visitor, QUIZ_STATE_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => return QuizSession::new(),
            Err(e) => {
                warn!(visitor, "Failed to read quiz state: {}", e);
                return QuizSession::new();
            }
        };

        serde_json::from_value::<QuizSnapshot>(value)
            .map_err(|e| e.to_string())
            .and_then(|snapshot| QuizSession::restore(snapshot).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| {
                debug!(visitor, "Ignoring saved quiz state: {}", e);
                QuizSession::new()
            })
    }

    /// Overwrite the stored copy with `session`.
    async fn persist(&self, visitor: &str, session: &QuizSession) {
        let value = match serde_json::to_value(session.snapshot()) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to serialize quiz state: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set_setting(visitor, QUIZ_STATE_KEY, &value).await {
            warn!(visitor, "Failed to persist quiz state: {}", e);
        }
    }

    pub async fn status(&self, visitor: &str) -> QuizStatus {
        QuizStatus::from_session(&self.load(visitor).await)
    }

    /// Record an answer.
    pub async fn select(
        &self,
        visitor: &str,
        question: QuestionId,
        value: &str,
    ) -> Result<QuizStatus, FlowError> {
        let _turn = self.turn(visitor).await;
        let mut session = self.load(visitor).await;
        session.select(question, value)?;
        self.persist(visitor, &session).await;
        Ok(QuizStatus::from_session(&session))
    }

    pub async fn next(&self, visitor: &str) -> QuizStatus {
        let _turn = self.turn(visitor).await;
        let mut session = self.load(visitor).await;
        session.next();
        self.persist(visitor, &session).await;
        QuizStatus::from_session(&session)
    }

    pub async fn back(&self, visitor: &str) -> QuizStatus {
        let _turn = self.turn(visitor).await;
        let mut session = self.load(visitor).await;
        session.back();
        self.persist(visitor, &session).await;
        QuizStatus::from_session(&session)
    }

    /// Clear answers, return to the first question and drop the stored copy.
    pub async fn reset(&self, visitor: &str) -> QuizStatus {
        let _turn = self.turn(visitor).await;
        let mut session = self.load(visitor).await;
        session.reset();
        if let Err(e) = self.store.delete_setting(visitor, QUIZ_STATE_KEY).await {
            warn!(visitor, "Failed to clear quiz state: {}", e);
        }
        QuizStatus::from_session(&session)
    }
}
