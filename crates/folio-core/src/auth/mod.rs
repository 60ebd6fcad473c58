//! Supabase auth (`GoTrue`) client.
//!
//! Handles email/password sign-up and sign-in, the OAuth redirect flow,
//! token refresh and sign-out. Sessions are handed to a
//! [`SessionPersistence`] implementation so each front end decides where
//! tokens live.

mod oauth;

use std::fmt;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackendConfig;
use crate::util::{backend_error_message, is_http_url, trim_trailing_slash, unix_timestamp_now};

pub use oauth::{OAuthProvider, OAuthRedirect};

const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Message shown after a sign-up that needs email confirmation.
pub const CONFIRMATION_REQUIRED_MESSAGE: &str = "Check your email to confirm your account!";

/// Message shown after a successful sign-in.
pub const SIGNED_IN_MESSAGE: &str = "Successfully signed in!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// An authenticated session. Tokens never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    /// True when the access token expires within the refresh skew.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    /// The project requires email confirmation before the first sign-in
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("{0}")]
    MissingInput(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Api(String),
    #[error("OAuth sign-in failed: {0}")]
    OAuth(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where sessions are kept between runs
pub trait SessionPersistence: Send + Sync {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

#[derive(Clone)]
pub struct AuthClient<P: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    persistence: P,
}

impl<P: SessionPersistence> AuthClient<P> {
    pub fn new(config: &BackendConfig, persistence: P) -> AuthResult<Self> {
        let auth_url = auth_endpoint(&config.supabase_url)?;
        if config.supabase_anon_key.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            auth_url,
            anon_key: config.supabase_anon_key.clone(),
            client: Client::builder().build()?,
            persistence,
        })
    }

    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Load the persisted session, refreshing it when it is about to expire.
    /// A session that cannot be refreshed is cleared.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.persistence.load_session()? else {
            return Ok(None);
        };
        if !stored.needs_refresh() {
            return Ok(Some(stored));
        }

        match self.refresh_session(&stored.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.persistence.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        require_credentials(email, password)?;

        let request = self.with_anon_key(self.client.post(format!("{}/signup", self.auth_url)))
            .json(&serde_json::json!({ "email": email.trim(), "password": password }));
        let response: TokenResponse = self.send(request).await?;

        match response.into_session()? {
            Some(session) => {
                self.persistence.save_session(&session)?;
                tracing::info!("Signed up and signed in {}", session.user.id);
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        require_credentials(email, password)?;

        let request = self
            .with_anon_key(self.client.post(format!("{}/token", self.auth_url)))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email.trim(), "password": password }));
        let session = self.send::<TokenResponse>(request).await?.require_session()?;

        self.persistence.save_session(&session)?;
        tracing::info!("Signed in {}", session.user.id);
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::MissingInput("Refresh token is required"));
        }

        let request = self
            .with_anon_key(self.client.post(format!("{}/token", self.auth_url)))
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }));
        let session = self.send::<TokenResponse>(request).await?.require_session()?;

        self.persistence.save_session(&session)?;
        Ok(session)
    }

    /// Fetch the user a token belongs to.
    pub async fn get_user(&self, access_token: &str) -> AuthResult<AuthUser> {
        let request = self
            .client
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);
        let user: UserResponse = self.send(request).await?;
        Ok(user.into())
    }

    /// URL that starts the provider's consent screen and redirects back to
    /// `redirect_to` with tokens in the fragment.
    pub fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AuthResult<String> {
        oauth::authorize_url(&self.auth_url, provider, redirect_to)
    }

    /// Finish an OAuth sign-in from the URL the browser was redirected to.
    pub async fn complete_oauth(&self, redirect_url: &str) -> AuthResult<AuthSession> {
        let redirect = OAuthRedirect::parse(redirect_url)?;
        let user = self.get_user(&redirect.access_token).await?;
        let session = redirect.into_session(user);

        self.persistence.save_session(&session)?;
        tracing::info!("Signed in {} via OAuth", session.user.id);
        Ok(session)
    }

    /// Revoke the session remotely and forget it locally. An already
    /// invalid token still clears the local session.
    pub async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !(status.is_success() || status == StatusCode::UNAUTHORIZED) {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(backend_error_message(status.as_u16(), &body)));
        }

        self.persistence.clear_session()?;
        Ok(())
    }

    fn with_anon_key(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send<T: for<'de> Deserialize<'de>>(&self, request: RequestBuilder) -> AuthResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(backend_error_message(status.as_u16(), &body)));
        }
        Ok(response.json::<T>().await?)
    }
}

/// `{supabase_url}/auth/v1`, accepting URLs that already carry the path.
pub fn auth_endpoint(supabase_url: &str) -> AuthResult<String> {
    let trimmed = trim_trailing_slash(supabase_url.trim());
    if trimmed.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !is_http_url(trimmed) {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/auth/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/auth/v1"))
    }
}

fn require_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::MissingInput("Email is required"));
    }
    if password.is_empty() {
        return Err(AuthError::MissingInput("Password is required"));
    }
    Ok(())
}

/// Token endpoint and sign-up payload. Sign-up nests the session when
/// autoconfirm is on and returns a bare user otherwise.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<UserResponse>,
    session: Option<Box<TokenResponse>>,
    /// Bare sign-up responses are the user object itself
    id: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        if let Some(nested) = self.session {
            return nested.into_session();
        }

        let expires_at = self.expires_at.or_else(|| {
            self.expires_in
                .map(|seconds| unix_timestamp_now().saturating_add(seconds))
        });

        match (self.access_token, self.refresh_token, expires_at, self.user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user: user.into(),
                }))
            }
            (None, None, _, _) if self.id.is_some() => Ok(None),
            (None, None, None, Some(_)) => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response did not include enough session fields".to_string(),
            )),
        }
    }

    fn require_session(self) -> AuthResult<AuthSession> {
        self.into_session()?.ok_or_else(|| {
            AuthError::Api("Auth response did not include an active session".to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
}

impl From<UserResponse> for AuthUser {
    fn from(value: UserResponse) -> Self {
        Self {
            id: value.id,
            email: value.email.filter(|email| !email.trim().is_empty()),
        }
    }
}
