//! Application configuration

pub mod prompts;

use std::env;
use std::path::PathBuf;

use crate::session::DEFAULT_SESSION_TTL;

pub use prompts::PromptSet;

/// Variable holding the provider API key. Startup halts without it.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub session_ttl_secs: u64,
    pub prompts_file: Option<PathBuf>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set. Please ensure it is defined in your .env file.")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value: raw })?,
            None => 3000,
        };

        let request_timeout_secs =
            positive_secs(&lookup, "HH_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let session_ttl_secs =
            positive_secs(&lookup, "HH_SESSION_TTL_SECS", DEFAULT_SESSION_TTL.as_secs())?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
            api_key,
            base_url: lookup("HH_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            model: lookup("HH_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            request_timeout_secs,
            session_ttl_secs,
            prompts_file: lookup("HH_PROMPTS_FILE").map(PathBuf::from),
        })
    }
}

fn positive_secs<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidValue { name, value: raw }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert_eq!(
            err.to_string(),
            "GEMINI_API_KEY is not set. Please ensure it is defined in your .env file."
        );
    }

    #[test]
    fn test_blank_api_key_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[(API_KEY_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[(API_KEY_VAR, "k")])).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert!(config.base_url.contains("generativelanguage.googleapis.com"));
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.session_ttl_secs, 3600);
        assert!(config.prompts_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (API_KEY_VAR, "k"),
            ("PORT", "8080"),
            ("HH_BASE_URL", "http://localhost:9000/v1/"),
            ("HH_MODEL", "gemini-1.5-pro"),
            ("HH_REQUEST_TIMEOUT_SECS", "5"),
            ("HH_SESSION_TTL_SECS", "900"),
            ("HH_PROMPTS_FILE", "prompts.toml"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.session_ttl_secs, 900);
        assert_eq!(config.prompts_file, Some(PathBuf::from("prompts.toml")));
    }

    #[test]
    fn test_invalid_port_and_timeout() {
        let err = Config::from_lookup(lookup_from(&[(API_KEY_VAR, "k"), ("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));

        let err = Config::from_lookup(lookup_from(&[
            (API_KEY_VAR, "k"),
            ("HH_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: "HH_REQUEST_TIMEOUT_SECS", .. }
        ));

        let err = Config::from_lookup(lookup_from(&[
            (API_KEY_VAR, "k"),
            ("HH_SESSION_TTL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: "HH_SESSION_TTL_SECS", .. }
        ));
    }
}
