//! Tutor Intake: lead-capture backend for the tutoring site.

pub mod config;
pub mod error;
pub mod intake;
pub mod quiz;
pub mod sequencer;
pub mod server;
pub mod store;
