//! Credential translation: a validated session's claims are re-signed into the
//! bearer token presented to the upstream.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::{config::Secret, session::Claims};

/// Sign `claims` with `secret` using HS256.
///
/// The claim set is copied as-is; nothing is added or removed. Sessions must
/// carry `exp` to pass the guard, so the credential expires with the session.
/// The output depends only on the inputs. Callers mint a fresh credential for
/// every upstream call.
///
/// # Errors
/// Returns the underlying `jsonwebtoken` error if the claims cannot be
/// serialized or signed.
pub fn derive_credential(claims: &Claims, secret: &Secret) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
