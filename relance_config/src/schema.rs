use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use relance_core::{AgentConfig, ClientProfile, ProfileStore, Tone};

use crate::ConfigError;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "RELANCE_CONFIG";

/// Environment variable overriding `providers.gemini.api_key`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Value `init` writes for the key; never a usable credential.
pub const API_KEY_PLACEHOLDER: &str = "your-gemini-api-key-here";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    pub clients: BTreeMap<String, ClientRecord>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub harness: HarnessConfig,
}

/// One entry of the `clients` section, as written in the file.
///
/// Fields stay optional here so a missing one can be reported by name
/// instead of as a generic parse failure.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ClientRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formality_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrasing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_label: Option<String>,
}

impl ClientRecord {
    pub fn to_profile(&self, id: &str) -> Result<ClientProfile, ConfigError> {
        let required = |value: &Option<String>, field: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingField {
                    client: id.to_string(),
                    field,
                })
        };

        Ok(ClientProfile {
            id: id.to_string(),
            client_name: required(&self.client_name, "client_name")?,
            closing_line: required(&self.closing_line, "closing_line")?,
            tone: self.tone.as_deref().map_or(Tone::Default, Tone::parse),
            formality_level: self
                .formality_level
                .clone()
                .unwrap_or_else(|| "medium".to_string()),
            phrasing: self.phrasing.clone().unwrap_or_else(|| "direct".to_string()),
            payment_label: self
                .payment_label
                .clone()
                .unwrap_or_else(|| "payment".to_string()),
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "GeminiConfig::default_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
        }
    }
}

impl GeminiConfig {
    fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpeechConfig {
    /// Language code passed to the speech service
    #[serde(default = "SpeechConfig::default_language")]
    pub language: String,
    /// Directory holding `<sha256>.<language>.mp3` files
    #[serde(default = "SpeechConfig::default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: Self::default_language(),
            cache_dir: Self::default_cache_dir(),
        }
    }
}

impl SpeechConfig {
    fn default_language() -> String {
        "en".to_string()
    }

    fn default_cache_dir() -> PathBuf {
        PathBuf::from("audio_cache")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HarnessConfig {
    /// Sessions evaluated in parallel
    #[serde(default = "HarnessConfig::default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "HarnessConfig::default_report_path")]
    pub report_path: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            concurrency: Self::default_concurrency(),
            report_path: Self::default_report_path(),
        }
    }
}

impl HarnessConfig {
    const fn default_concurrency() -> usize {
        4
    }

    fn default_report_path() -> PathBuf {
        PathBuf::from("test_report.md")
    }
}

impl Config {
    /// `~/relance`
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        Ok(dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join("relance"))
    }

    /// Explicit path, else `$RELANCE_CONFIG`, else `~/relance/config.json`.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;

        info!(
            "Loaded config from {} ({} clients)",
            path.display(),
            config.clients.len()
        );
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clients.is_empty() {
            return Err(ConfigError::NoClients);
        }
        if self.agent.max_history == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.max_history",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.agent.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.harness.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "harness.concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        for (id, record) in &self.clients {
            record.to_profile(id)?;
        }
        Ok(())
    }

    pub fn profile_store(&self) -> Result<ProfileStore, ConfigError> {
        let profiles = self
            .clients
            .iter()
            .map(|(id, record)| record.to_profile(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProfileStore::new(profiles)?)
    }

    /// API key from `$GEMINI_API_KEY`, falling back to the config file.
    ///
    /// Blank values and the `init` placeholder count as absent.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.api_key_with_override(std::env::var(API_KEY_ENV).ok())
    }

    pub fn api_key_with_override(&self, env_value: Option<String>) -> Result<String, ConfigError> {
        let non_blank = |key: String| {
            let key = key.trim().to_string();
            (!key.is_empty() && key != API_KEY_PLACEHOLDER).then_some(key)
        };
        env_value
            .and_then(non_blank)
            .or_else(|| self.providers.gemini.api_key.clone().and_then(non_blank))
            .ok_or(ConfigError::MissingCredential)
    }

    /// Write the starter template to `path`, refusing to overwrite.
    pub fn create_config(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, CONFIG_TEMPLATE).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Created config file at {}", path.display());
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "agent": {
    "model": "gemini-1.5-flash",
    "max_history": 10,
    "request_timeout_secs": 30,
    "closing_words": ["goodbye", "bye", "see you", "that's all", "hang up", "au revoir", "à bientôt"]
  },
  "clients": {
    "dell": {
      "client_name": "Dell Technologies",
      "tone": "formal",
      "formality_level": "high",
      "phrasing": "precise and courteous",
      "payment_label": "an immediate card payment",
      "closing_line": "Thank you for your time. Dell Technologies wishes you a good day."
    },
    "microsoft": {
      "client_name": "Microsoft",
      "tone": "professional",
      "formality_level": "medium",
      "phrasing": "direct",
      "payment_label": "an online payment",
      "closing_line": "Thank you, and have a good day on behalf of Microsoft."
    },
    "amazon": {
      "client_name": "Amazon",
      "tone": "collaborative",
      "formality_level": "low",
      "phrasing": "friendly and solution-oriented",
      "payment_label": "a payment through your account",
      "closing_line": "Thank you for working this out with us. Amazon wishes you a great day."
    }
  },
  "providers": {
    "gemini": {
      "api_key": "your-gemini-api-key-here"
    }
  },
  "speech": {
    "language": "en",
    "cache_dir": "audio_cache"
  },
  "harness": {
    "concurrency": 4,
    "report_path": "test_report.md"
  }
}"#;
