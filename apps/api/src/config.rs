// Application configuration
//
// Read once at startup from the environment (after `.env` is loaded). A
// missing model configuration is a startup error, never a per-request one.

use std::time::Duration;
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no model configured: set XAI_API_KEY or GOOGLE_API_KEY, or AGENT_BACKEND=template")]
    MissingModel,

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Hosted model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Xai,
    Google,
}

impl LlmProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Xai => "grok-beta",
            LlmProvider::Google => "gemini-pro",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            LlmProvider::Xai => "https://api.x.ai/v1/chat/completions",
            LlmProvider::Google => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
}

/// Which executor answers for the agents
#[derive(Debug, Clone, PartialEq)]
pub enum AgentBackend {
    Llm(LlmSettings),
    /// Canned replies and keyword routing, no network
    Template,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: Level,
    pub port: u16,
    pub database_url: Option<String>,
    pub backend: AgentBackend,
    pub hop_timeout: Duration,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 8000;
    pub const DEFAULT_HOP_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Reads configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match get("LOG_LEVEL") {
            Some(value) => value
                .parse::<Level>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "LOG_LEVEL",
                    value,
                })?,
            None => Level::INFO,
        };

        let port = parse_or("PORT", get("PORT"), Self::DEFAULT_PORT)?;

        let hop_timeout_secs = parse_or(
            "HOP_TIMEOUT_SECS",
            get("HOP_TIMEOUT_SECS"),
            Self::DEFAULT_HOP_TIMEOUT_SECS,
        )?;
        if hop_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "HOP_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let backend = match get("AGENT_BACKEND").as_deref().map(str::to_lowercase) {
            Some(ref kind) if kind == "template" => AgentBackend::Template,
            Some(ref kind) if kind != "llm" => {
                return Err(ConfigError::InvalidValue {
                    name: "AGENT_BACKEND",
                    value: kind.clone(),
                })
            }
            _ => AgentBackend::Llm(llm_settings(&get)?),
        };

        Ok(Self {
            log_level,
            port,
            database_url: get("DATABASE_URL"),
            backend,
            hop_timeout: Duration::from_secs(hop_timeout_secs),
        })
    }
}

fn llm_settings<G>(get: &G) -> Result<LlmSettings, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    // xAI wins when both keys are present
    let (provider, api_key) = match (get("XAI_API_KEY"), get("GOOGLE_API_KEY")) {
        (Some(key), _) => (LlmProvider::Xai, key),
        (None, Some(key)) => (LlmProvider::Google, key),
        (None, None) => return Err(ConfigError::MissingModel),
    };

    let temperature = parse_or(
        "LLM_TEMPERATURE",
        get("LLM_TEMPERATURE"),
        AppConfig::DEFAULT_TEMPERATURE,
    )?;
    if !(0.0..=2.0).contains(&temperature) {
        return Err(ConfigError::InvalidValue {
            name: "LLM_TEMPERATURE",
            value: temperature.to_string(),
        });
    }

    Ok(LlmSettings {
        provider,
        api_key,
        endpoint: get("LLM_ENDPOINT").unwrap_or_else(|| provider.default_endpoint().to_string()),
        model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
        temperature,
    })
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn missing_model_fails_fast() {
        assert_eq!(config(&[]), Err(ConfigError::MissingModel));
    }

    #[test]
    fn template_backend_needs_no_key() {
        let config = config(&[("AGENT_BACKEND", "template")]).unwrap();

        assert_eq!(config.backend, AgentBackend::Template);
        assert_eq!(config.port, 8000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.hop_timeout, Duration::from_secs(30));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn xai_is_preferred_over_google() {
        let config = config(&[("XAI_API_KEY", "xai"), ("GOOGLE_API_KEY", "google")]).unwrap();

        match config.backend {
            AgentBackend::Llm(settings) => {
                assert_eq!(settings.provider, LlmProvider::Xai);
                assert_eq!(settings.api_key, "xai");
                assert_eq!(settings.model, "grok-beta");
                assert_eq!(settings.temperature, 0.7);
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn google_settings_and_overrides() {
        let config = config(&[
            ("GOOGLE_API_KEY", "google"),
            ("LLM_MODEL", "gemini-1.5-flash"),
            ("LLM_TEMPERATURE", "0.2"),
            ("HOP_TIMEOUT_SECS", "5"),
            ("LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(config.hop_timeout, Duration::from_secs(5));
        assert_eq!(config.log_level, Level::DEBUG);
        match config.backend {
            AgentBackend::Llm(settings) => {
                assert_eq!(settings.provider, LlmProvider::Google);
                assert_eq!(settings.model, "gemini-1.5-flash");
                assert_eq!(settings.temperature, 0.2);
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config(&[("AGENT_BACKEND", "template"), ("PORT", "eighty")]),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("AGENT_BACKEND", "template"), ("HOP_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidValue { name: "HOP_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            config(&[("XAI_API_KEY", "k"), ("LLM_TEMPERATURE", "7")]),
            Err(ConfigError::InvalidValue { name: "LLM_TEMPERATURE", .. })
        ));
        assert!(matches!(
            config(&[("AGENT_BACKEND", "carrier-pigeon")]),
            Err(ConfigError::InvalidValue { name: "AGENT_BACKEND", .. })
        ));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("AGENT_BACKEND", "template"), ("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }
}
