//! HTTP application assembly.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServiceConfig;
use crate::intake::{
    HttpFormTransport, IntakeRegistry, IntakeRouteState, SubmissionGateway, intake_routes,
    spawn_prune_task,
};
use crate::quiz::{QuizManager, QuizRouteState, quiz_routes};
use crate::store::SettingsStore;

/// How often abandoned intake sessions are swept.
const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tutor-intake"
    }))
}

/// Merge the intake and quiz routes with a health check.
pub fn app(intake: IntakeRouteState, quiz: QuizRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(intake_routes(intake))
        .merge(quiz_routes(quiz))
}

/// Wire the production dependencies: HTTP transport to the configured form
/// processor, a fresh session registry, and the given settings store.
///
/// Must be called inside a Tokio runtime; it spawns the idle-session sweep.
pub fn build(config: &ServiceConfig, store: Arc<dyn SettingsStore>) -> Router {
    let gateway = SubmissionGateway::new(
        Box::new(HttpFormTransport::new(config.form_endpoint.clone())),
        config.thank_you_path.clone(),
    );
    let registry = IntakeRegistry::with_idle_timeout(config.session_idle_timeout);
    let _prune_handle = spawn_prune_task(Arc::clone(&registry), SESSION_PRUNE_INTERVAL);
    let intake = IntakeRouteState {
        registry,
        gateway: Arc::new(gateway),
    };
    let quiz = QuizRouteState {
        manager: Arc::new(QuizManager::new(store)),
    };

    app(intake, quiz).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.allowed_origins)),
    )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %o, "Ignoring invalid CORS origin: {}", e);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
}
