//! Quiz session: answers, current question, and derived score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::sequencer::StepSequencer;

use super::questions::{Band, QUESTION_ORDER, QuestionId};

/// Persisted shape: `{ "answers": { "q1": "low" }, "step": 1 }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSnapshot {
    pub answers: BTreeMap<QuestionId, String>,
    pub step: usize,
}

/// In-memory quiz state. Score, band and completion are always derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    answers: BTreeMap<QuestionId, String>,
    steps: StepSequencer<QuestionId>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            answers: BTreeMap::new(),
            steps: StepSequencer::new(QUESTION_ORDER),
        }
    }

    /// Rebuild from a persisted snapshot. The step is clamped to the last
    /// question; answers naming an option the question does not offer are
    /// rejected.
    pub fn restore(snapshot: QuizSnapshot) -> Result<Self, FlowError> {
        let mut session = Self::new();
        for (question, value) in snapshot.answers {
            session.select(question, &value)?;
        }
        session.steps.set_index(snapshot.step);
        Ok(session)
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot {
            answers: self.answers.clone(),
            step: self.step(),
        }
    }

    pub fn step(&self) -> usize {
        self.steps.current_index()
    }

    pub fn current_question(&self) -> QuestionId {
        self.steps.current()
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn answers(&self) -> &BTreeMap<QuestionId, String> {
        &self.answers
    }

    pub fn answer(&self, question: QuestionId) -> Option<&str> {
        self.answers.get(&question).map(String::as_str)
    }

    /// Store or overwrite the answer to `question`.
    pub fn select(&mut self, question: QuestionId, value: &str) -> Result<(), FlowError> {
        if question.question().option(value).is_none() {
            return Err(FlowError::UnknownOption {
                question: question.to_string(),
                value: value.to_string(),
            });
        }
        self.answers.insert(question, value.to_string());
        Ok(())
    }

    /// Answer the question currently on screen.
    pub fn select_current(&mut self, value: &str) -> Result<(), FlowError> {
        self.select(self.current_question(), value)
    }

    /// Move to the next question. Only allowed once the current one is
    /// answered, and never past the last.
    pub fn next(&mut self) -> bool {
        if !self.answers.contains_key(&self.current_question()) {
            return false;
        }
        self.steps.advance()
    }

    /// Move to the previous question, if any.
    pub fn back(&mut self) -> bool {
        self.steps.retreat()
    }

    /// Sum of weights of the selected options. Unanswered questions add 0.
    pub fn score(&self) -> u32 {
        self.answers
            .iter()
            .filter_map(|(q, v)| q.question().option(v))
            .map(|o| o.weight)
            .sum()
    }

    pub fn band(&self) -> Band {
        Band::from_score(self.score())
    }

    /// True once every question has an answer.
    pub fn is_complete(&self) -> bool {
        QUESTION_ORDER.iter().all(|q| self.answers.contains_key(q))
    }

    pub fn progress_percent(&self) -> u8 {
        self.steps.progress_percent()
    }

    /// Forget every answer and return to the first question.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.steps.rewind();
    }
}
