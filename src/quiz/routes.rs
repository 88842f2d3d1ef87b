//! REST endpoints for the readiness quiz.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::FlowError;

use super::manager::QuizManager;
use super::questions::{QUESTIONS, QuestionId};

/// Shared state for quiz routes.
#[derive(Clone)]
pub struct QuizRouteState {
    pub manager: Arc<QuizManager>,
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    value: String,
}

fn bad_request(err: FlowError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

/// GET /api/quiz-questions
///
/// Lives outside `/api/quiz/` so that no visitor id can be shadowed by it.
async fn list_questions() -> impl IntoResponse {
    Json(&QUESTIONS)
}

/// GET /api/quiz/{visitor}
async fn get_status(
    State(state): State<QuizRouteState>,
    Path(visitor): Path<String>,
) -> impl IntoResponse {
    Json(state.manager.status(&visitor).await)
}

/// PUT /api/quiz/{visitor}/answers/{question}
async fn put_answer(
    State(state): State<QuizRouteState>,
    Path((visitor, question)): Path<(String, String)>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let Some(question) = QuestionId::parse(&question) else {
        return bad_request(FlowError::UnknownQuestion(question));
    };
    match state.manager.select(&visitor, question, &req.value).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => bad_request(e),
    }
}

/// POST /api/quiz/{visitor}/next
async fn next(
    State(state): State<QuizRouteState>,
    Path(visitor): Path<String>,
) -> impl IntoResponse {
    Json(state.manager.next(&visitor).await)
}

/// POST /api/quiz/{visitor}/back
async fn back(
    State(state): State<QuizRouteState>,
    Path(visitor): Path<String>,
) -> impl IntoResponse {
    Json(state.manager.back(&visitor).await)
}

/// POST /api/quiz/{visitor}/reset
async fn reset(
    State(state): State<QuizRouteState>,
    Path(visitor): Path<String>,
) -> impl IntoResponse {
    Json(state.manager.reset(&visitor).await)
}

/// Build the quiz REST routes.
pub fn quiz_routes(state: QuizRouteState) -> Router {
    Router::new()
        .route("/api/quiz-questions", get(list_questions))
        .route("/api/quiz/{visitor}", get(get_status))
        .route("/api/quiz/{visitor}/answers/{question}", put(put_answer))
        .route("/api/quiz/{visitor}/next", post(next))
        .route("/api/quiz/{visitor}/back", post(back))
        .route("/api/quiz/{visitor}/reset", post(reset))
        .with_state(state)
}
