//! Forwarding proxy: mint a credential, send the request upstream, hand back
//! whatever the upstream answered.

use axum::{
    body::Body,
    http::{HeaderValue, Method},
};
use tracing::{debug, warn};

use crate::{
    credential::derive_credential,
    error::GatewayError,
    session::Session,
    state::AppState,
    upstream::{UpstreamResource, UpstreamResponse},
};

/// Forward one authenticated request.
///
/// A new credential is minted on every call. Upstream statuses, including
/// 4xx and 5xx, come back as `Ok`.
///
/// # Errors
/// Returns [`GatewayError::Credential`] if the session cannot be re-signed and
/// [`GatewayError::Upstream`] on transport failures or timeout.
pub async fn forward(
    state: &AppState,
    session: &Session,
    method: Method,
    resource: UpstreamResource<'_>,
    content_type: Option<HeaderValue>,
    body: Body,
) -> Result<UpstreamResponse, GatewayError> {
    let credential = derive_credential(session.claims(), &state.config.auth_secret)?;
    let target = state.upstream.target(resource);

    debug!(%method, %target, sub = session.subject().unwrap_or("-"), "forwarding to upstream");

    match state
        .upstream
        .send(&credential, method.clone(), &target, content_type, body)
        .await
    {
        Ok(resp) => {
            debug!(%method, %target, status = resp.status.as_u16(), bytes = resp.body.len(), "upstream responded");
            Ok(resp)
        }
        Err(e) => {
            warn!(%method, %target, error = %e, "upstream call failed");
            Err(e.into())
        }
    }
}
