use crate::core::error::HomechatError;
use crate::providers::{ollama, openai};
use crate::todo::DEFAULT_TODO_URL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_DEVICE_HOST: &str = "192.168.0.29";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.
You can use tools to help you for things that need real time data.
Your name is Eva,
you use short and concise sentences to answer user queries.
If you are given a task, you complete it with a single word response.
If you don't know the answer, you respond with \"I don't know\" and a short description.
You are mildly sarcastic and friendly.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Ollama,
    OpenAI,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Ollama => ollama::DEFAULT_BASE_URL,
            Provider::OpenAI => openai::DEFAULT_BASE_URL,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Ollama => ollama::DEFAULT_MODEL,
            Provider::OpenAI => openai::DEFAULT_MODEL,
        }
    }
}

impl FromStr for Provider {
    type Err = HomechatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAI),
            other => Err(HomechatError::Config(format!("Unsupported provider: {}", other))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Ollama => write!(f, "ollama"),
            Provider::OpenAI => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub host: String,
    /// Endpoint path for `blink`; the stock device has none.
    pub blink_path: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DEVICE_HOST.to_string(),
            blink_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub chat_secs: u64,
    pub tool_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            chat_secs: 120,
            tool_secs: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn chat(&self) -> Duration {
        Duration::from_secs(self.chat_secs.max(1))
    }

    pub fn tool(&self) -> Duration {
        Duration::from_secs(self.tool_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub active_provider: Option<Provider>,
    pub providers: HashMap<Provider, ProviderConfig>,
    pub device: DeviceConfig,
    pub todo_url: String,
    pub timeouts: TimeoutConfig,
    pub system_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_provider: None,
            providers: HashMap::new(),
            device: DeviceConfig::default(),
            todo_url: DEFAULT_TODO_URL.to_string(),
            timeouts: TimeoutConfig::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join(".homechat").join("config.yaml")
    }

    /// Loads the user config, writing a default file on first run.
    pub fn load() -> Result<Config, HomechatError> {
        let path = Self::config_path();
        if path.exists() {
            return Self::load_from(&path);
        }

        let config = Config::default();
        if let Err(e) = config.save_to(&path) {
            warn!(path = %path.display(), error = %e, "could not write default config");
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Config, HomechatError> {
        let contents = fs::read_to_string(path)?;
        serde_yml::from_str::<Config>(&contents)
            .map_err(|e| HomechatError::Config(format!("Parse {}: {}", path.display(), e)))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), HomechatError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    pub fn provider(&self) -> Provider {
        self.active_provider.unwrap_or_default()
    }

    /// Settings for `provider` with defaults filled in. The OpenAI key falls
    /// back to `OPENAI_API_KEY`.
    pub fn provider_config(&self, provider: Provider) -> ProviderConfig {
        let configured = self.providers.get(&provider).cloned().unwrap_or_default();
        let api_key = configured.api_key.or_else(|| match provider {
            Provider::OpenAI => std::env::var("OPENAI_API_KEY").ok(),
            Provider::Ollama => None,
        });
        ProviderConfig {
            api_key,
            base_url: Some(
                configured
                    .base_url
                    .unwrap_or_else(|| provider.default_base_url().to_string()),
            ),
            model: Some(
                configured
                    .model
                    .unwrap_or_else(|| provider.default_model().to_string()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "active_provider: openai\nproviders:\n  openai:\n    model: gpt-4o\ndevice:\n  host: 10.0.0.5\n"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.provider(), Provider::OpenAI);
        assert_eq!(config.device.host, "10.0.0.5");
        assert_eq!(config.device.blink_path, None);
        assert_eq!(config.todo_url, DEFAULT_TODO_URL);
        assert_eq!(config.timeouts, TimeoutConfig::default());
        let settings = config.provider_config(Provider::OpenAI);
        assert_eq!(settings.model.as_deref(), Some("gpt-4o"));
        assert_eq!(settings.base_url.as_deref(), Some(openai::DEFAULT_BASE_URL));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeouts: soon").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, HomechatError::Config(_)));
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.active_provider = Some(Provider::Ollama);
        config.device.blink_path = Some("blink".into());

        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn defaults_to_ollama() {
        let config = Config::default();
        assert_eq!(config.provider(), Provider::Ollama);
        let ollama = config.provider_config(Provider::Ollama);
        assert_eq!(ollama.model.as_deref(), Some("llama3.1"));
        assert_eq!(ollama.base_url.as_deref(), Some("http://localhost:11434"));
    }

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert!("gemini".parse::<Provider>().is_err());
    }
}
