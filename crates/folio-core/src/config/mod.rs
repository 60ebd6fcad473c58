//! Backend connection settings shared by the CLI and the share server.
//!
//! The Supabase URL and anon key are public values: they ship with every
//! client and only grant what the row-level policies allow. Service-role
//! keys must never be stored here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option, trim_trailing_slash};
use crate::{Error, Result};

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const SITE_URL_ENV: &str = "FOLIO_SITE_URL";

/// Where the hosted backend lives and which public origin serves share links
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Origin used when building share links (`{site_url}/shared/{id}`)
    #[serde(default)]
    pub site_url: Option<String>,
}

impl BackendConfig {
    /// Validate and normalize raw values.
    pub fn new(
        supabase_url: impl AsRef<str>,
        supabase_anon_key: impl AsRef<str>,
        site_url: Option<String>,
    ) -> Result<Self> {
        let supabase_url = normalize_http_url(supabase_url.as_ref(), "Supabase URL")?;
        let supabase_anon_key = supabase_anon_key.as_ref().trim().to_string();
        if supabase_anon_key.is_empty() {
            return Err(Error::Config(
                "Supabase anon key must not be empty".to_string(),
            ));
        }
        let site_url = normalize_text_option(site_url)
            .map(|url| normalize_http_url(&url, "site URL"))
            .transpose()?;

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            site_url,
        })
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `FOLIO_SITE_URL` from a
    /// lookup function (usually the process environment).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = normalize_text_option(lookup(SUPABASE_URL_ENV))
            .ok_or_else(|| Error::Config(format!("{SUPABASE_URL_ENV} is required")))?;
        let anon_key = normalize_text_option(lookup(SUPABASE_ANON_KEY_ENV))
            .ok_or_else(|| Error::Config(format!("{SUPABASE_ANON_KEY_ENV} is required")))?;
        Self::new(url, anon_key, lookup(SITE_URL_ENV))
    }

    /// `PostgREST` base URL (`{supabase_url}/rest/v1`).
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }

    /// Origin for share links, if one is configured.
    #[must_use]
    pub fn share_origin(&self) -> Option<&str> {
        self.site_url.as_deref()
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BackendConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[REDACTED]")
            .field("site_url", &self.site_url)
            .finish()
    }
}

fn normalize_http_url(raw: &str, label: &str) -> Result<String> {
    let trimmed = trim_trailing_slash(raw.trim());
    if trimmed.is_empty() {
        return Err(Error::Config(format!("{label} must not be empty")));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Config(format!(
            "{label} must include http:// or https://"
        )));
    }
    url::Url::parse(trimmed).map_err(|error| Error::Config(format!("{label}: {error}")))?;
    Ok(trimmed.to_string())
}
