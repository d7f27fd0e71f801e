use crate::error::{Error, Result};
use clap::ValueEnum;
use std::fmt;

pub const DEFAULT_TRANSCRIPT_API_URL: &str = "https://yt.vl.comp.polyu.edu.hk";
pub const DEFAULT_TRANSCRIPT_API_PASSWORD: &str = "for_demo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Provider {
    #[default]
    Github,
    Openrouter,
}

impl Provider {
    fn env_prefix(self) -> &'static str {
        match self {
            Provider::Github => "GITHUB",
            Provider::Openrouter => "OPENROUTER",
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Provider::Github),
            "openrouter" => Ok(Provider::Openrouter),
            other => Err(Error::custom(format!(
                "Unknown provider '{other}'; expected 'github' or 'openrouter'"
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Github => f.write_str("github"),
            Provider::Openrouter => f.write_str("openrouter"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
}

// Keeps the key out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptApiConfig {
    pub base_url: String,
    pub password: String,
}

impl Default for TranscriptApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TRANSCRIPT_API_URL.to_string(),
            password: DEFAULT_TRANSCRIPT_API_PASSWORD.to_string(),
        }
    }
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub github: Option<ProviderConfig>,
    pub openrouter: Option<ProviderConfig>,
    pub transcript_api: TranscriptApiConfig,
}

impl Config {
    /// Reads the process environment; `.env` is loaded by `main` beforehand.
    pub fn from_env(provider_override: Option<Provider>) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), provider_override)
    }

    pub fn from_lookup<F>(lookup: F, provider_override: Option<Provider>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match provider_override {
            Some(p) => p,
            None => get("VIDSUM_PROVIDER")
                .map(|raw| Provider::parse(&raw))
                .transpose()?
                .unwrap_or_default(),
        };

        let config = Self {
            provider,
            github: provider_from(&get, Provider::Github),
            openrouter: provider_from(&get, Provider::Openrouter),
            transcript_api: TranscriptApiConfig {
                base_url: get("TRANSCRIPT_API_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_TRANSCRIPT_API_URL.to_string()),
                password: get("TRANSCRIPT_API_PASSWORD")
                    .unwrap_or_else(|| DEFAULT_TRANSCRIPT_API_PASSWORD.to_string()),
            },
        };

        // Fail at startup rather than on the first button press.
        config.active_provider().map_err(|_| {
            let prefix = provider.env_prefix();
            let missing = ["API_KEY", "API_ENDPOINT", "API_MODEL_NAME"]
                .iter()
                .map(|suffix| format!("{prefix}_{suffix}"))
                .find(|key| get(key.as_str()).is_none())
                .unwrap_or_else(|| format!("{prefix}_API_KEY"));
            Error::MissingConfig(missing)
        })?;

        Ok(config)
    }

    pub fn active_provider(&self) -> Result<&ProviderConfig> {
        let selected = match self.provider {
            Provider::Github => self.github.as_ref(),
            Provider::Openrouter => self.openrouter.as_ref(),
        };
        selected.ok_or_else(|| Error::MissingConfig(format!("{} provider", self.provider)))
    }
}

fn provider_from<G>(get: &G, provider: Provider) -> Option<ProviderConfig>
where
    G: Fn(&str) -> Option<String>,
{
    let prefix = provider.env_prefix();
    Some(ProviderConfig {
        api_key: get(format!("{prefix}_API_KEY").as_str())?,
        endpoint: get(format!("{prefix}_API_ENDPOINT").as_str())?,
        model: get(format!("{prefix}_API_MODEL_NAME").as_str())?,
    })
}
