use std::str::FromStr;

use analyzers::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use analyzers::{Backend, GeminiBackend, GeminiConfig, MockBackend};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;

/// Large enough for the data URI of a 100 MB image (base64 adds a third).
pub const DEFAULT_MAX_BODY_MB: usize = 150;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Gemini,
    Mock,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(BackendKind::Gemini),
            "mock" => Ok(BackendKind::Mock),
            other => Err(format!("expected 'gemini' or 'mock', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub backend: BackendKind,
    pub gemini: GeminiConfig,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend: BackendKind::Gemini,
            gemini: GeminiConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; unset and blank values
    /// fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get("PORT") {
            Some(value) => parse("PORT", value)?,
            None => DEFAULT_PORT,
        };

        let backend = match get("STEGANOSHIELD_BACKEND") {
            Some(value) => parse("STEGANOSHIELD_BACKEND", value)?,
            None => BackendKind::Gemini,
        };

        let max_body_mb: usize = match get("STEGANOSHIELD_MAX_BODY_MB") {
            Some(value) => parse("STEGANOSHIELD_MAX_BODY_MB", value)?,
            None => DEFAULT_MAX_BODY_MB,
        };

        let gemini = GeminiConfig {
            api_base: get("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        Ok(Self {
            port,
            backend,
            gemini,
            max_body_bytes: max_body_mb.saturating_mul(1024 * 1024),
        })
    }

    pub fn build_backend(&self) -> Backend {
        match self.backend {
            BackendKind::Gemini => Backend::Gemini(GeminiBackend::new(self.gemini.clone())),
            BackendKind::Mock => Backend::Mock(MockBackend::new()),
        }
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        assert_eq!(config(&[]).unwrap(), ServerConfig::default());
    }

    #[test]
    fn reads_gemini_settings() {
        let cfg = config(&[
            ("GEMINI_API_BASE", "http://localhost:9000/v1beta/"),
            ("GOOGLE_API_KEY", "google-key"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.gemini.api_base, "http://localhost:9000/v1beta");
        assert_eq!(cfg.gemini.api_key.as_deref(), Some("google-key"));
        assert_eq!(cfg.gemini.model, "gemini-1.5-pro");
    }

    #[test]
    fn gemini_key_takes_precedence_and_blank_is_unset() {
        let cfg = config(&[("GEMINI_API_KEY", "gemini-key"), ("GOOGLE_API_KEY", "google-key")]).unwrap();
        assert_eq!(cfg.gemini.api_key.as_deref(), Some("gemini-key"));

        let cfg = config(&[("GEMINI_API_KEY", "   ")]).unwrap();
        assert_eq!(cfg.gemini.api_key, None);
    }

    #[test]
    fn selects_mock_backend() {
        let cfg = config(&[("STEGANOSHIELD_BACKEND", "Mock"), ("STEGANOSHIELD_MAX_BODY_MB", "10")]).unwrap();
        assert_eq!(cfg.backend, BackendKind::Mock);
        assert_eq!(cfg.max_body_bytes, 10 * 1024 * 1024);
        assert!(matches!(cfg.build_backend(), Backend::Mock(_)));
    }

    #[test]
    fn rejects_bad_values() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config(&[("STEGANOSHIELD_BACKEND", "openai")]).is_err());
        assert!(config(&[("STEGANOSHIELD_MAX_BODY_MB", "-1")]).is_err());
    }
}
