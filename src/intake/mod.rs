//! Intake wizard: the multi-step student/parent lead form.
//!
//! A visitor walks a branching sequence of screens, the answers collect in
//! a flat field store, and the final screen hands everything to the
//! submission gateway. Sessions live in memory only and are dropped once
//! they sit idle too long.

pub mod fields;
pub mod registry;
pub mod routes;
pub mod session;
pub mod state;
pub mod submission;

pub use fields::{FieldUpdate, FormFields, Meridiem, StudyOption, StudyOptions};
pub use registry::{
    DEFAULT_SESSION_IDLE_TIMEOUT, IntakeRegistry, SessionHandle, spawn_prune_task,
};
pub use routes::{IntakeRouteState, intake_routes};
pub use session::{IntakeSession, IntakeSnapshot};
pub use state::{Activity, INTAKE_CATALOGUE, IntakeAction, IntakeStep, Level, Role, navigate};
pub use submission::{
    FAILURE_ALERT, FormTransport, HttpFormTransport, SubmissionGateway, SubmissionOutcome,
    SubmissionPayload, UserSurface,
};
