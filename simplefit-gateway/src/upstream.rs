//! HTTP client for the upstream exercise API.
//!
//! Requests are sent with the hyper connection pool over plain HTTP or
//! rustls-backed HTTPS, picked by the target's scheme. The inbound body is
//! handed over as a stream and the upstream body is collected in full before
//! it is relayed, so a connection dropped mid-body surfaces as an error
//! instead of a truncated 200.

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes left unescaped in a path segment. `.` is escaped so an identifier
/// can never read as a relative path.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

/// Errors talking to the upstream. Upstream non-2xx statuses are not errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UpstreamError {
    /// The target URL could not be built.
    #[error("invalid upstream target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Connecting, sending, or receiving the response head failed.
    #[error("upstream request failed: {0}")]
    Request(String),

    /// No complete response within the configured deadline.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// The response body could not be read to the end.
    #[error("failed to read upstream response body: {0}")]
    Body(String),
}

/// Upstream resource addressed by a forwarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamResource<'a> {
    /// The collection itself, served at the base URL.
    ExerciseList,
    /// A single exercise at `{base}/exercises/{id}`.
    Exercise(&'a str),
}

/// Status, content type and raw body as received from the upstream.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}

/// Pooled client bound to one upstream base URL. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    base: String,
    timeout: Duration,
}

impl UpstreamClient {
    /// `base` must not end with a slash. Server certificates are checked
    /// against the bundled Mozilla roots.
    #[must_use]
    pub fn new(base: impl Into<String>, timeout: Duration) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
            base: base.into(),
            timeout,
        }
    }

    /// Full upstream URL for `resource`.
    #[must_use]
    pub fn target(&self, resource: UpstreamResource<'_>) -> String {
        match resource {
            UpstreamResource::ExerciseList => self.base.clone(),
            UpstreamResource::Exercise(id) => {
                format!("{}/exercises/{}", self.base, utf8_percent_encode(id, PATH_SEGMENT))
            }
        }
    }

    /// Send one request carrying `credential` as a bearer token.
    ///
    /// # Errors
    /// Returns [`UpstreamError::Timeout`] if the full round trip exceeds the
    /// deadline, [`UpstreamError::InvalidTarget`] if `target` is not a valid
    /// URI, and [`UpstreamError::Request`] or [`UpstreamError::Body`] on
    /// transport failures.
    pub async fn send(
        &self,
        credential: &str,
        method: Method,
        target: &str,
        content_type: Option<HeaderValue>,
        body: Body,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let uri: Uri = target.parse().map_err(|e| UpstreamError::InvalidTarget {
            target: target.to_owned(),
            reason: format!("{e}"),
        })?;

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {credential}"));
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let req = builder
            .body(body)
            .map_err(|e| UpstreamError::Request(format!("build request: {e}")))?;

        match tokio::time::timeout(self.timeout, self.round_trip(req)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }

    async fn round_trip(&self, req: Request<Body>) -> Result<UpstreamResponse, UpstreamError> {
        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| UpstreamError::Request(describe(&e)))?;

        let status = resp.status();
        let content_type = resp.headers().get(CONTENT_TYPE).cloned();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| UpstreamError::Body(e.to_string()))?
            .to_bytes();

        Ok(UpstreamResponse { status, content_type, body })
    }
}

/// Error message including its source chain; hyper's top-level messages are terse.
fn describe(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
