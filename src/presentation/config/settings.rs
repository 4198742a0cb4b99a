use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::DEFAULT_DISPATCH_TIMEOUT;
use crate::domain::AllowedExtensions;
use crate::infrastructure::audio::{
    DEFAULT_LOCAL_MODEL_ID, OPENAI_DEFAULT_BASE_URL, OPENAI_DEFAULT_MODEL,
    OPENAI_MAX_UPLOAD_BYTES, PrimaryProvider, RemoteProviderConfig,
};

use super::Environment;

const DEFAULT_MAX_REQUEST_BYTES: usize = 2 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub transcription: TranscriptionSettings,
    pub remote: RemoteSettings,
    pub local: LocalSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Defaults, then `appsettings.{environment}` if present, then `APP_*`
    /// variables with `__` between nested keys (`APP_REMOTE__API_KEY`).
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&environment.settings_file()).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("transcription.allowed_extensions")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// `None` unless remote is the primary provider, is enabled and has a key.
    pub fn remote_provider_config(&self) -> Option<RemoteProviderConfig> {
        if self.transcription.primary != PrimaryProvider::Remote || !self.remote.enabled {
            return None;
        }

        let Some(api_key) = self.remote.resolved_api_key() else {
            tracing::warn!("Remote transcription enabled without an API key; using local only");
            return None;
        };

        Some(RemoteProviderConfig {
            api_key,
            base_url: Some(self.remote.base_url.clone()),
            model: Some(self.remote.model.clone()),
            max_upload_bytes: self.remote.max_upload_bytes,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_request_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    pub primary: PrimaryProvider,
    pub timeout_secs: u64,
    pub allowed_extensions: Vec<String>,
}

impl TranscriptionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn allowed_extensions(&self) -> AllowedExtensions {
        AllowedExtensions::new(self.allowed_extensions.iter().map(String::as_str))
    }
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            primary: PrimaryProvider::Local,
            timeout_secs: DEFAULT_DISPATCH_TIMEOUT.as_secs(),
            allowed_extensions: AllowedExtensions::default()
                .iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_upload_bytes: u64,
}

impl RemoteSettings {
    /// Falls back to `OPENAI_API_KEY` when no key is configured.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: OPENAI_DEFAULT_BASE_URL.to_string(),
            model: OPENAI_DEFAULT_MODEL.to_string(),
            max_upload_bytes: OPENAI_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub model_id: String,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_LOCAL_MODEL_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub scratch_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().join("whisperdesk"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}
