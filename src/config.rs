//! Gateway configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Everything is read once at startup into a typed `AppConfig`. Parsing goes
//! through a key-lookup closure so tests can feed a map instead of mutating
//! the process environment.

use std::path::PathBuf;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "./web";
pub const DEFAULT_STORAGE_BUCKET: &str = "finup-bucket";
pub const DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Older deployments set one of these instead of `BACKEND_URL`.
const LEGACY_BACKEND_URL_KEYS: [&str; 2] = ["NEXT_PUBLIC_BACKEND_URL", "NEXT_PUBLIC_API_URL"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Object storage bucket used for provider documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub url: String,
    pub api_key: String,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend_url: String,
    pub port: u16,
    pub production: bool,
    pub cookie_secure: bool,
    pub static_dir: PathBuf,
    pub timeouts: BackendTimeouts,
    /// `None` disables document uploads.
    pub storage: Option<StorageConfig>,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `BACKEND_URL`: default `http://localhost:8000`
    /// - `PORT`: default 3000
    /// - `APP_ENV`: `production` turns on secure cookies
    /// - `COOKIE_SECURE`: explicit override of the above
    /// - `STATIC_DIR`: default `./web`
    /// - `BACKEND_REQUEST_TIMEOUT_SECS` / `BACKEND_CONNECT_TIMEOUT_SECS`
    /// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `SUPABASE_BUCKET`
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = resolve_backend_url(&lookup);

        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let production = lookup("APP_ENV").is_some_and(|v| v.trim().eq_ignore_ascii_case("production"));
        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?,
            None => production,
        };

        let static_dir = lookup("STATIC_DIR").map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        let timeouts = BackendTimeouts {
            request_secs: parse_or(
                "BACKEND_REQUEST_TIMEOUT_SECS",
                lookup("BACKEND_REQUEST_TIMEOUT_SECS"),
                DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_or(
                "BACKEND_CONNECT_TIMEOUT_SECS",
                lookup("BACKEND_CONNECT_TIMEOUT_SECS"),
                DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS,
            )?,
        };

        let storage = match (lookup("SUPABASE_URL"), lookup("SUPABASE_ANON_KEY")) {
            (Some(url), Some(api_key)) if !url.trim().is_empty() && !api_key.trim().is_empty() => Some(StorageConfig {
                url: url.trim().trim_end_matches('/').to_string(),
                api_key,
                bucket: lookup("SUPABASE_BUCKET").unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
            }),
            _ => None,
        };

        Ok(Self { backend_url, port, production, cookie_secure, static_dir, timeouts, storage })
    }
}

fn resolve_backend_url<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup("BACKEND_URL")
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            LEGACY_BACKEND_URL_KEYS.iter().find_map(|&key| {
                let value = lookup(key).filter(|v| !v.trim().is_empty())?;
                tracing::warn!(key, "legacy backend url variable in use; set BACKEND_URL instead");
                Some(value)
            })
        })
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    raw.trim().trim_end_matches('/').to_string()
}

/// Parse a boolean-ish environment value (`1/true/yes/on`, `0/false/no/off`).
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
