use super::super::{
    GatewayConfig, ObservabilityConfig, PersonaConfig, SearchConfig, StorageConfig, VisionConfig,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Timeout applied to orchestrated (persona) completion calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Timeout applied to passthrough relay calls for non-reserved models.
    #[serde(default = "default_raw_request_timeout_secs")]
    pub raw_request_timeout_secs: u64,

    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub persona: PersonaConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_base_url() -> String {
    "https://api.deepseek.com/v1".into()
}

fn default_model() -> String {
    "deepseek-chat".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    200
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_raw_request_timeout_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = directories::UserDirs::new().map_or_else(
            || PathBuf::from(".nekorelay"),
            |u| u.home_dir().join(".nekorelay"),
        );

        Self {
            config_path: data_dir.join("config.toml"),
            data_dir,
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            raw_request_timeout_secs: default_raw_request_timeout_secs(),
            vision: VisionConfig::default(),
            search: SearchConfig::default(),
            persona: PersonaConfig::default(),
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Validation("max_tokens must be > 0".into()));
        }
        if self.request_timeout_secs == 0 || self.raw_request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request timeouts must be > 0 seconds".into(),
            ));
        }
        self.vision.validate()?;
        self.search.validate()?;
        self.persona.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Resolved path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        let configured = PathBuf::from(&self.storage.path);
        if configured.is_absolute() {
            configured
        } else {
            self.data_dir.join(configured)
        }
    }

    /// The completion provider is unusable without a key.
    pub fn needs_api_key(&self) -> bool {
        self.api_key.as_deref().is_none_or(str::is_empty)
    }
}
