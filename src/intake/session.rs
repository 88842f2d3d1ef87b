//! Intake session: one visitor's pass through the wizard.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{FlowError, SubmissionError};
use crate::sequencer::StepSequencer;

use super::fields::{FieldUpdate, FormFields};
use super::state::{INTAKE_CATALOGUE, IntakeAction, IntakeStep, Level, Role, navigate};

/// In-memory state of a single wizard run. Never persisted; dropped once
/// the submission succeeds or the visitor goes back home.
#[derive(Debug, Clone)]
pub struct IntakeSession {
    id: Uuid,
    role: Role,
    level: Option<Level>,
    steps: StepSequencer<IntakeStep>,
    fields: FormFields,
    submitting: bool,
    last_activity: DateTime<Utc>,
}

/// Serializable view of a session, returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeSnapshot {
    pub id: Uuid,
    pub role: Role,
    pub level: Option<Level>,
    pub step: IntakeStep,
    pub progress: u8,
    pub fields: FormFields,
    pub submitting: bool,
}

impl IntakeSession {
    pub fn new(role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            level: None,
            steps: StepSequencer::new(INTAKE_CATALOGUE),
            fields: FormFields::default(),
            submitting: false,
            last_activity: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn step(&self) -> IntakeStep {
        self.steps.current()
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn progress_percent(&self) -> u8 {
        self.steps.progress_percent()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Whether the visitor has been silent for at least `timeout` as of
    /// `now`. A session with a submission in flight is never idle.
    pub fn is_idle(&self, timeout: TimeDelta, now: DateTime<Utc>) -> bool {
        !self.submitting && now - self.last_activity >= timeout
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Run one user action through the navigation policy.
    ///
    /// Choosing a level records it on the session; nothing later clears it.
    pub fn apply(&mut self, action: IntakeAction) -> Result<IntakeStep, FlowError> {
        self.touch();
        let from = self.steps.current();
        let to = navigate(from, action, &self.fields).ok_or_else(|| FlowError::InvalidAction {
            step: from.to_string(),
            action: action.to_string(),
        })?;

        if let IntakeAction::ChooseLevel { level } = action {
            self.level = Some(level);
        }

        self.steps.set(to)?;
        debug!(session = %self.id, %from, %to, %action, "Intake step changed");
        Ok(to)
    }

    pub fn update_fields(&mut self, update: FieldUpdate) {
        self.touch();
        self.fields.apply(update);
    }

    /// Mark a submission as running. Fails if one already is.
    pub fn begin_submission(&mut self) -> Result<(), SubmissionError> {
        if self.submitting {
            return Err(SubmissionError::InFlight);
        }
        self.submitting = true;
        self.touch();
        Ok(())
    }

    pub fn end_submission(&mut self) {
        self.submitting = false;
        self.touch();
    }

    pub fn snapshot(&self) -> IntakeSnapshot {
        IntakeSnapshot {
            id: self.id,
            role: self.role,
            level: self.level,
            step: self.step(),
            progress: self.progress_percent(),
            fields: self.fields.clone(),
            submitting: self.submitting,
        }
    }
}
