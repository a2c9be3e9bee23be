//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{session::AuthError, upstream::UpstreamError};

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request carried no valid session. The reason stays server-side.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// The session claims could not be re-signed for the upstream.
    #[error("failed to mint upstream credential: {0}")]
    Credential(#[from] jsonwebtoken::errors::Error),

    /// The upstream could not be reached or did not answer in time.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Bodies carry only the status reason. Causes are logged where they occur
/// and never sent to the client.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Credential(e) => {
                tracing::error!(error = %e, "credential minting failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream(UpstreamError::InvalidTarget { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        let message = status.canonical_reason().unwrap_or("Error");
        (status, Json(json!({"error": message}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = match axum::body::to_bytes(resp.into_body(), 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_is_401_with_generic_body() {
        for reason in [AuthError::Missing, AuthError::Expired, AuthError::Invalid] {
            let resp = GatewayError::Unauthorized(reason).into_response();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                body_json(resp).await,
                json!({"error": "Unauthorized"}),
                "the body must not reveal why validation failed"
            );
        }
    }

    #[test]
    fn upstream_transport_failure_returns_502() {
        let err = GatewayError::Upstream(UpstreamError::Request("connection refused".to_owned()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let err = GatewayError::Upstream(UpstreamError::Body("reset".to_owned()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn upstream_timeout_returns_504() {
        let err = GatewayError::Upstream(UpstreamError::Timeout(Duration::from_secs(30)));
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn upstream_failure_bodies_hide_the_cause() {
        let cases = [
            (
                UpstreamError::Request("tcp connect error: 10.0.0.7:8443: Connection refused".to_owned()),
                "Bad Gateway",
            ),
            (UpstreamError::Body("connection reset by 10.0.0.7".to_owned()), "Bad Gateway"),
            (UpstreamError::Timeout(Duration::from_secs(30)), "Gateway Timeout"),
            (
                UpstreamError::InvalidTarget {
                    target: "http://10.0.0.7:8443/exercises/x".to_owned(),
                    reason: "invalid uri character".to_owned(),
                },
                "Internal Server Error",
            ),
        ];
        for (cause, reason) in cases {
            let body = body_json(GatewayError::Upstream(cause).into_response()).await;
            assert_eq!(body, json!({"error": reason}));
            assert!(!body.to_string().contains("10.0.0.7"), "internal address leaked: {body}");
        }
    }

    #[test]
    fn gateway_error_display_includes_upstream_message() {
        let err = GatewayError::Upstream(UpstreamError::Request("connection refused".to_owned()));
        assert!(err.to_string().contains("connection refused"), "Display keeps the cause for logs");
    }
}
