//! REST endpoints driving the intake wizard.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::FlowError;

use super::fields::FieldUpdate;
use super::registry::IntakeRegistry;
use super::state::{IntakeAction, Role};
use super::submission::{SubmissionGateway, SubmissionPayload, UserSurface};

/// Shared state for intake routes.
#[derive(Clone)]
pub struct IntakeRouteState {
    pub registry: Arc<IntakeRegistry>,
    pub gateway: Arc<SubmissionGateway>,
}

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    role: Role,
}

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.to_string() })),
    )
        .into_response()
}

fn not_found(id: Uuid) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        FlowError::SessionNotFound(id.to_string()),
    )
}

/// POST /api/intake
///
/// Opens a new wizard for the student or parent entry point.
async fn create_session(
    State(state): State<IntakeRouteState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let handle = state.registry.create(req.role).await;
    let snapshot = handle.lock().await.snapshot();
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/intake/{id}
async fn get_session(
    State(state): State<IntakeRouteState>,
    Path(id): Path<Uuid>,
) -> Response {
    let Some(handle) = state.registry.get(id).await else {
        return not_found(id);
    };
    let snapshot = handle.lock().await.snapshot();
    Json(snapshot).into_response()
}

/// POST /api/intake/{id}/action
///
/// Applies one button press; 409 if the current step does not offer it.
async fn apply_action(
    State(state): State<IntakeRouteState>,
    Path(id): Path<Uuid>,
    Json(action): Json<IntakeAction>,
) -> Response {
    let Some(handle) = state.registry.get(id).await else {
        return not_found(id);
    };
    let mut session = handle.lock().await;
    match session.apply(action) {
        Ok(_) => Json(session.snapshot()).into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, e),
    }
}

/// PATCH /api/intake/{id}/fields
async fn update_fields(
    State(state): State<IntakeRouteState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FieldUpdate>,
) -> Response {
    let Some(handle) = state.registry.get(id).await else {
        return not_found(id);
    };
    let mut session = handle.lock().await;
    session.update_fields(update);
    Json(session.snapshot()).into_response()
}

/// Collects the browser instruction produced by the gateway.
#[derive(Default)]
struct ResponseSurface {
    location: Mutex<Option<String>>,
}

impl UserSurface for ResponseSurface {
    fn redirect(&self, location: &str) {
        if let Ok(mut slot) = self.location.lock() {
            *slot = Some(location.to_string());
        }
    }

    fn alert(&self, message: &str) {
        info!(alert = message, "Alerting visitor");
    }
}

/// POST /api/intake/{id}/submit
///
/// Success: 200 with the redirect target; the session is discarded.
/// Failure: 502 with the alert text; the session is kept for a retry.
async fn submit(State(state): State<IntakeRouteState>, Path(id): Path<Uuid>) -> Response {
    let Some(handle) = state.registry.get(id).await else {
        return not_found(id);
    };

    let payload = {
        let mut session = handle.lock().await;
        let payload = match SubmissionPayload::from_session(&session) {
            Ok(payload) => payload,
            Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e),
        };
        if let Err(e) = session.begin_submission() {
            warn!(session = %id, "Duplicate submit while one is in flight");
            return error_response(StatusCode::CONFLICT, e);
        }
        payload
    };

    let surface = ResponseSurface::default();
    let outcome = state.gateway.submit(&payload, &surface).await;

    if outcome.is_success() {
        state.registry.discard(id).await;
        let location = surface
            .location
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .unwrap_or_default();
        (
            StatusCode::OK,
            [(header::LOCATION, location)],
            Json(outcome),
        )
            .into_response()
    } else {
        handle.lock().await.end_submission();
        (StatusCode::BAD_GATEWAY, Json(outcome)).into_response()
    }
}

/// DELETE /api/intake/{id}
///
/// "Back to home": the session is thrown away.
async fn discard_session(
    State(state): State<IntakeRouteState>,
    Path(id): Path<Uuid>,
) -> Response {
    if state.registry.discard(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(id)
    }
}

/// Build the intake REST routes.
pub fn intake_routes(state: IntakeRouteState) -> Router {
    Router::new()
        .route("/api/intake", post(create_session))
        .route(
            "/api/intake/{id}",
            get(get_session).delete(discard_session),
        )
        .route("/api/intake/{id}/action", post(apply_action))
        .route("/api/intake/{id}/fields", patch(update_fields))
        .route("/api/intake/{id}/submit", post(submit))
        .with_state(state)
}
