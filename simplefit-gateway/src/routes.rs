//! Axum route handlers for the SimpleFit gateway API.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, Method, StatusCode,
    },
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::GatewayError,
    proxy::forward,
    session::Session,
    state::AppState,
    upstream::{UpstreamResource, UpstreamResponse},
};

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router.
///
/// Every exercise handler takes a [`Session`] as its first extractor, so the
/// guard runs before the path or body is looked at.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.config.allowed_origins.clone()))
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/api/exercises", get(list_exercises))
        .route("/api/exercises/{id}", put(put_exercise).delete(delete_exercise))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness check.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `GET /api/exercises`: list all exercises.
///
/// # Errors
/// See [`forward`].
pub async fn list_exercises(
    State(state): State<AppState>,
    session: Session,
) -> Result<UpstreamResponse, GatewayError> {
    forward(&state, &session, Method::GET, UpstreamResource::ExerciseList, None, Body::empty()).await
}

/// `PUT /api/exercises/{id}`: create or replace an exercise.
///
/// The body is streamed upstream untouched.
///
/// # Errors
/// See [`forward`].
pub async fn put_exercise(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<UpstreamResponse, GatewayError> {
    let content_type = headers.get(CONTENT_TYPE).cloned();
    forward(&state, &session, Method::PUT, UpstreamResource::Exercise(&id), content_type, body).await
}

/// `DELETE /api/exercises/{id}`: delete an exercise.
///
/// # Errors
/// See [`forward`].
pub async fn delete_exercise(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<UpstreamResponse, GatewayError> {
    forward(&state, &session, Method::DELETE, UpstreamResource::Exercise(&id), None, Body::empty()).await
}
