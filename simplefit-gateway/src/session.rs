//! Session guard: locates the inbound session token and validates it locally.

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use tracing::debug;

use crate::{config::Secret, error::GatewayError, state::AppState};

/// Claim set carried by a session, kept as an untyped JSON object so it can
/// be re-signed without loss.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Session cookies in lookup order. Secure-prefixed names come first.
pub const SESSION_COOKIES: [&str; 4] = [
    "__Secure-authjs.session-token",
    "authjs.session-token",
    "__Secure-next-auth.session-token",
    "next-auth.session-token",
];

/// Why a request was refused. Never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("no session token")]
    Missing,

    #[error("session token expired")]
    Expired,

    /// Malformed token, wrong algorithm or bad signature.
    #[error("session token invalid")]
    Invalid,
}

/// A validated session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    claims: Claims,
}

impl Session {
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The `sub` claim, if present and a string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(serde_json::Value::as_str)
    }
}

/// Authenticate a request from its headers.
///
/// # Errors
/// Returns [`AuthError::Missing`] if no token is present, otherwise the
/// outcome of [`verify_session_token`].
pub fn authenticate(headers: &HeaderMap, secret: &Secret) -> Result<Session, AuthError> {
    let token = session_token(headers).ok_or(AuthError::Missing)?;
    verify_session_token(token, secret)
}

/// Find the raw session token: session cookies first, then a bearer header.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    SESSION_COOKIES
        .iter()
        .find_map(|name| cookie_value(headers, name))
        .or_else(|| bearer_token(headers))
}

/// Validate an HS256 token signed with `secret`.
///
/// `exp` is required and enforced, `nbf` is enforced when present. Audience
/// and issuer are not checked: the claim set is opaque to the gateway.
///
/// # Errors
/// Returns [`AuthError::Expired`] for an expired token and
/// [`AuthError::Invalid`] for any other decoding failure.
pub fn verify_session_token(token: &str, secret: &Secret) -> Result<Session, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);
    validation.validate_nbf = true;
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| Session { claims: data.claims })
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid,
        })
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for Session {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, &state.config.auth_secret).map_err(|reason| {
            debug!(%reason, path = %parts.uri.path(), "rejecting unauthenticated request");
            GatewayError::Unauthorized(reason)
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
    use serde_json::json;

    use super::*;

    fn mint(secret: &[u8], claims: &serde_json::Value) -> String {
        match encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret)) {
            Ok(t) => t,
            Err(e) => panic!("failed to mint token: {e}"),
        }
    }

    fn headers_with(name: axum::http::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(e) => panic!("bad header value: {e}"),
        }
        headers
    }

    #[test]
    fn session_token_reads_next_auth_cookie() {
        let headers = headers_with(COOKIE, "theme=dark; next-auth.session-token=abc.def.ghi; other=1");
        assert_eq!(session_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn session_token_prefers_secure_cookie() {
        let headers = headers_with(
            COOKIE,
            "next-auth.session-token=plain; __Secure-next-auth.session-token=secure",
        );
        assert_eq!(session_token(&headers), Some("secure"));
    }

    #[test]
    fn session_token_falls_back_to_bearer_header() {
        let headers = headers_with(AUTHORIZATION, "Bearer tok123");
        assert_eq!(session_token(&headers), Some("tok123"));

        let basic = headers_with(AUTHORIZATION, "Basic dXNlcjpwYXNz");
        assert_eq!(session_token(&basic), None, "non-bearer schemes are ignored");
    }

    #[test]
    fn authenticate_without_token_is_missing() {
        let secret = Secret::new("s3cret");
        assert_eq!(authenticate(&HeaderMap::new(), &secret), Err(AuthError::Missing));

        let empty_cookie = headers_with(COOKIE, "next-auth.session-token=");
        assert_eq!(authenticate(&empty_cookie, &secret), Err(AuthError::Missing));
    }

    #[test]
    fn authenticate_accepts_token_signed_with_shared_secret() {
        let secret = Secret::new("s3cret");
        let token = mint(
            b"s3cret",
            &json!({"sub": "user-1", "email": "a@example.com", "exp": get_current_timestamp() + 600}),
        );
        let headers = headers_with(COOKIE, &format!("next-auth.session-token={token}"));
        let session = match authenticate(&headers, &secret) {
            Ok(s) => s,
            Err(e) => panic!("unexpected auth error: {e}"),
        };
        assert_eq!(session.subject(), Some("user-1"));
        assert_eq!(session.claims()["email"], "a@example.com");
    }

    #[test]
    fn verify_rejects_token_without_exp() {
        let token = mint(b"s3cret", &json!({"sub": "user-1"}));
        assert_eq!(verify_session_token(&token, &Secret::new("s3cret")), Err(AuthError::Invalid));
    }

    #[test]
    fn verify_accepts_audience_and_issuer_claims() {
        let claims = json!({
            "sub": "user-1",
            "aud": "simplefit",
            "iss": "https://accounts.google.com",
            "exp": get_current_timestamp() + 600,
        });
        let token = mint(b"s3cret", &claims);
        let session = match verify_session_token(&token, &Secret::new("s3cret")) {
            Ok(s) => s,
            Err(e) => panic!("token with aud/iss must verify: {e}"),
        };
        assert_eq!(session.claims()["aud"], "simplefit");
        assert_eq!(session.claims()["iss"], "https://accounts.google.com");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = mint(b"other", &json!({"sub": "user-1"}));
        assert_eq!(verify_session_token(&token, &Secret::new("s3cret")), Err(AuthError::Invalid));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let token = mint(b"s3cret", &json!({"sub": "user-1", "exp": get_current_timestamp() - 3600}));
        assert_eq!(verify_session_token(&token, &Secret::new("s3cret")), Err(AuthError::Expired));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert_eq!(verify_session_token("not-a-jwt", &Secret::new("s3cret")), Err(AuthError::Invalid));
    }

    #[test]
    fn verify_rejects_other_algorithms() {
        let token = match encode(
            &Header::new(Algorithm::HS512),
            &json!({"sub": "user-1"}),
            &EncodingKey::from_secret(b"s3cret"),
        ) {
            Ok(t) => t,
            Err(e) => panic!("failed to mint token: {e}"),
        };
        assert_eq!(verify_session_token(&token, &Secret::new("s3cret")), Err(AuthError::Invalid));
    }
}
