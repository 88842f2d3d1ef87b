//! One-minute readiness quiz.
//!
//! Six questions, three weighted options each. The summed weight picks a
//! result band, and the result card funnels into the intake flows.

pub mod manager;
pub mod questions;
pub mod routes;
pub mod session;

pub use manager::{QUIZ_STATE_KEY, QuizManager, QuizResult, QuizStatus};
pub use questions::{Band, QUESTION_ORDER, QUESTIONS, Question, QuestionId, QuizOption};
pub use routes::{QuizRouteState, quiz_routes};
pub use session::{QuizSession, QuizSnapshot};
