//! Error types for the intake service.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by the wizard and quiz state machines.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Step {0} is not part of this flow")]
    UnknownStep(String),

    #[error("Action {action} is not available on step {step}")]
    InvalidAction { step: String, action: String },

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Option {value} is not offered by question {question}")]
    UnknownOption { question: String, value: String },

    #[error("Intake session {0} not found")]
    SessionNotFound(String),
}

/// Errors raised while finalizing an intake session.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    #[error("Submission is only possible from the final step (currently on {0})")]
    NotAtFinalStep(String),

    #[error("A submission is already in flight for this session")]
    InFlight,

    #[error("Transport failed: {0}")]
    Transport(String),
}
