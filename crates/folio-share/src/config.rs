use std::collections::HashMap;
use std::env;
use std::fmt;

use folio_core::config::{BackendConfig, SUPABASE_ANON_KEY_ENV, SUPABASE_URL_ENV};
use thiserror::Error;

const BIND_ADDR_ENV: &str = "FOLIO_SHARE_BIND_ADDR";
const CACHE_MAX_AGE_ENV: &str = "SHARE_CACHE_MAX_AGE_SECS";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_CACHE_MAX_AGE_SECS: &str = "60";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub backend: BackendConfig,
    /// `Cache-Control: public, max-age=<n>` on found shared pages
    pub cache_max_age_secs: u64,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("supabase_url", &self.backend.supabase_url)
            .field("supabase_anon_key", &"[REDACTED]")
            .field("cache_max_age_secs", &self.cache_max_age_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, BIND_ADDR_ENV, DEFAULT_BIND_ADDR);

        let supabase_url = required_trimmed(&lookup, SUPABASE_URL_ENV)?;
        let supabase_anon_key = required_trimmed(&lookup, SUPABASE_ANON_KEY_ENV)?;
        let backend = BackendConfig::new(supabase_url, supabase_anon_key, None)
            .map_err(|error| ConfigError::Invalid(error.to_string()))?;

        let cache_max_age_secs =
            value_or_default(&lookup, CACHE_MAX_AGE_ENV, DEFAULT_CACHE_MAX_AGE_SECS)
                .parse::<u64>()
                .map_err(|_| {
                    ConfigError::Invalid(format!("{CACHE_MAX_AGE_ENV} must be a non-negative integer"))
                })?;

        Ok(Self {
            bind_addr,
            backend,
            cache_max_age_secs,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn required_trimmed(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional_trimmed(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
