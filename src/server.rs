//! HTTP trigger endpoint
//!
//! An external scheduler invokes `/worker/run` repeatedly; each request
//! advances at most one job and returns promptly. Auth is a bearer token
//! compared against the configured shared secret.

use crate::error::{Result, WorkerError};
use crate::worker::{JobRunner, Outcome};
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

/// Shared state for the trigger endpoint
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<JobRunner>,
    pub secret: String,
}

/// Build the trigger router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/worker/run", get(trigger).post(trigger))
        .with_state(state)
}

async fn trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if authorize(&headers, &state.secret).is_err() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        );
    }

    match state.runner.run_once().await {
        Ok(Outcome::Idle) => (StatusCode::OK, Json(json!({ "message": "no work" }))),
        Ok(Outcome::Progressed { job_id, message }) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": message, "job_id": job_id })),
        ),
        Err(e) => {
            error!(error = %e, "worker invocation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// Check the bearer token against the shared secret
pub fn authorize(headers: &HeaderMap, secret: &str) -> Result<()> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if !secret.is_empty() && token == secret => Ok(()),
        _ => Err(WorkerError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_bearer_token() {
        assert!(authorize(&headers_with("Bearer s3cret"), "s3cret").is_ok());
    }

    #[test]
    fn test_wrong_token_rejected() {
        assert!(authorize(&headers_with("Bearer nope"), "s3cret").is_err());
    }

    #[test]
    fn test_missing_header_rejected() {
        assert!(authorize(&HeaderMap::new(), "s3cret").is_err());
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        assert!(authorize(&headers_with("Basic s3cret"), "s3cret").is_err());
    }

    #[test]
    fn test_empty_secret_never_matches() {
        assert!(authorize(&headers_with("Bearer "), "").is_err());
    }
}
