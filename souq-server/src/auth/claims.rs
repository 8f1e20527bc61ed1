//! Local verification of provider-issued access tokens
//!
//! When the project's JWT secret is configured the gate decodes access tokens
//! itself instead of calling the provider on every request.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::provider::AuthUser;

/// Audience the provider stamps on signed-in user tokens
const AUDIENCE: &str = "authenticated";

/// Access token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    #[serde(default)]
    pub aud: Option<String>,
}

/// Verify signature, expiry and audience; `None` on any failure
pub fn verify_access_token(token: &str, secret: &str) -> Option<AuthUser> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUDIENCE]);

    let data = jsonwebtoken::decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| tracing::debug!("Access token rejected: {e}"))
    .ok()?;

    let id = Uuid::parse_str(&data.claims.sub).ok()?;
    Some(AuthUser {
        id,
        email: data.claims.email,
    })
}
