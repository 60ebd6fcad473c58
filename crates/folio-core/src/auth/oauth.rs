//! OAuth redirect flow: build the authorize URL and read tokens back out of
//! the redirect.

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::{AuthError, AuthResult, AuthSession, AuthUser};
use crate::util::unix_timestamp_now;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::Github),
            _ => Err(AuthError::OAuth(format!("unsupported provider '{s}'"))),
        }
    }
}

pub(super) fn authorize_url(
    auth_url: &str,
    provider: OAuthProvider,
    redirect_to: &str,
) -> AuthResult<String> {
    let mut url = Url::parse(&format!("{auth_url}/authorize"))
        .map_err(|_| AuthError::InvalidConfiguration("Supabase URL is not a valid URL"))?;
    url.query_pairs_mut()
        .append_pair("provider", provider.as_str())
        .append_pair("redirect_to", redirect_to);
    Ok(url.into())
}

/// Tokens carried by the redirect back from the provider
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthRedirect {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl OAuthRedirect {
    /// Read tokens from the fragment (implicit flow) or, failing that, the
    /// query string. Provider errors in the redirect become auth errors.
    pub fn parse(redirect_url: &str) -> AuthResult<Self> {
        let url = Url::parse(redirect_url.trim())
            .map_err(|error| AuthError::OAuth(format!("invalid redirect URL: {error}")))?;

        let mut params = url
            .fragment()
            .map(|fragment| {
                url::form_urlencoded::parse(fragment.as_bytes())
                    .into_owned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        params.extend(url.query_pairs().into_owned());
        let param = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .filter(|value| !value.trim().is_empty())
        };

        if let Some(description) = param("error_description").or_else(|| param("error")) {
            return Err(AuthError::OAuth(description));
        }

        let access_token = param("access_token")
            .ok_or_else(|| AuthError::OAuth("redirect did not include an access token".into()))?;
        let refresh_token = param("refresh_token")
            .ok_or_else(|| AuthError::OAuth("redirect did not include a refresh token".into()))?;
        let expires_at = param("expires_at")
            .and_then(|value| value.parse::<i64>().ok())
            .or_else(|| {
                param("expires_in")
                    .and_then(|value| value.parse::<i64>().ok())
                    .map(|seconds| unix_timestamp_now().saturating_add(seconds))
            })
            .ok_or_else(|| AuthError::OAuth("redirect did not include an expiry".into()))?;

        Ok(Self {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    pub(super) fn into_session(self, user: AuthUser) -> AuthSession {
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at,
            user,
        }
    }
}

impl fmt::Debug for OAuthRedirect {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OAuthRedirect")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
