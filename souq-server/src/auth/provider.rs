//! Identity provider integration via the GoTrue REST API (no SDK dependency)
//!
//! Every call carries the project's public `apikey`; user-scoped calls add the
//! caller's access token as a bearer token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until `access_token` expires
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider answered and said no; carries its message
    #[error("{0}")]
    Rejected(String),

    #[error("identity provider unreachable: {0}")]
    Transport(String),

    #[error("unexpected identity provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AuthError::Decode(e.to_string())
        } else {
            AuthError::Transport(e.to_string())
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Rejected(msg) => AppError::auth_provider(msg),
            AuthError::Transport(msg) => AppError::with_message(ErrorCode::NetworkError, msg),
            AuthError::Decode(msg) => AppError::auth_provider(msg),
        }
    }
}

/// Calls the gate and the auth routes make against the identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;
    /// `None` when the provider sent a confirmation email instead of a session
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<Option<AuthSession>, AuthError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), AuthError>;
    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError>;
    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, AuthError>;
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;
    async fn health(&self) -> Result<Value, AuthError>;
}

/// GoTrue REST client
#[derive(Clone)]
pub struct GoTrueClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
    }

    /// Send and decode, mapping non-2xx bodies to [`AuthError::Rejected`]
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, AuthError> {
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| AuthError::Decode(e.to_string()))?
        };
        if !status.is_success() {
            return Err(AuthError::Rejected(error_message(&body, status)));
        }
        Ok(body)
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<AuthSession, AuthError> {
        let value = self
            .send(
                self.request(reqwest::Method::POST, "/token")
                    .query(&[("grant_type", grant_type)])
                    .json(&body),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| AuthError::Decode(e.to_string()))
    }
}

/// GoTrue has used several error shapes over time
fn error_message(body: &Value, status: reqwest::StatusCode) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|k| body[*k].as_str())
        .map(String::from)
        .unwrap_or_else(|| format!("identity provider returned {status}"))
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let value = self
            .send(
                self.request(reqwest::Method::GET, "/user")
                    .bearer_auth(access_token),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| AuthError::Decode(e.to_string()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let value = self
            .send(
                self.request(reqwest::Method::POST, "/signup")
                    .query(&[("redirect_to", redirect_to)])
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        // Autoconfirm projects answer with a session, others with the bare user
        if value.get("access_token").is_some() {
            let session =
                serde_json::from_value(value).map_err(|e| AuthError::Decode(e.to_string()))?;
            Ok(Some(session))
        } else {
            Ok(None)
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.send(
            self.request(reqwest::Method::POST, "/logout")
                .bearer_auth(access_token),
        )
        .await?;
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), AuthError> {
        self.send(
            self.request(reqwest::Method::POST, "/recover")
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({
                    "email": email,
                    "code_challenge": code_challenge,
                    "code_challenge_method": "s256",
                })),
        )
        .await?;
        Ok(())
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        self.send(
            self.request(reqwest::Method::PUT, "/user")
                .bearer_auth(access_token)
                .json(&json!({ "password": password })),
        )
        .await?;
        Ok(())
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, AuthError> {
        self.token_grant(
            "pkce",
            json!({ "auth_code": auth_code, "code_verifier": code_verifier }),
        )
        .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn health(&self) -> Result<Value, AuthError> {
        self.send(self.request(reqwest::Method::GET, "/health")).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_shapes() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(&json!({"error_description": "Invalid login credentials"}), status),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(&json!({"msg": "User already registered"}), status),
            "User already registered"
        );
        assert_eq!(
            error_message(&Value::Null, status),
            "identity provider returned 400 Bad Request"
        );
    }

    #[test]
    fn test_session_decodes_gotrue_shape() {
        let session: AuthSession = serde_json::from_value(json!({
            "access_token": "a",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": {"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "email": "a@b.test", "aud": "authenticated"}
        }))
        .unwrap();
        assert_eq!(session.expires_in, Some(3600));
        assert_eq!(session.user.email.as_deref(), Some("a@b.test"));
    }

    #[test]
    fn test_rejection_maps_to_provider_error() {
        let err: AppError = AuthError::Rejected("Invalid login credentials".into()).into();
        assert_eq!(err.code, ErrorCode::AuthProviderError);
        assert_eq!(err.message, "Invalid login credentials");
    }

    #[test]
    fn test_base_url_normalized() {
        let client = GoTrueClient::new("https://proj.supabase.co/", "anon");
        assert_eq!(client.url("/token"), "https://proj.supabase.co/auth/v1/token");
    }
}
