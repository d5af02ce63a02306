use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MurmurError, Result};

/// Top-level configuration for the Murmur journal.
///
/// Loaded from `~/.murmur/config.toml` by default. Every section falls back to
/// its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MurmurConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub journal: JournalConfig,
}

impl MurmurConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MurmurConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MurmurError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.murmur/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API binds to.
    pub bind_address: String,
    /// API port.
    pub port: u16,
    /// Extra origins allowed by CORS (the journal page when served elsewhere).
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3040,
            allowed_origins: Vec::new(),
        }
    }
}

/// Speech recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Locale tag passed to the recognition engine.
    pub language: String,
    /// Consecutive network errors tolerated before giving up.
    pub max_network_retries: u32,
    /// Fixed delay between network retries in milliseconds.
    pub retry_delay_ms: u64,
    /// Hostnames treated as local development.
    pub local_hosts: Vec<String>,
    /// Number of debug lines kept for display by the voice control.
    pub debug_log_capacity: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            max_network_retries: 3,
            retry_delay_ms: 1000,
            local_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            debug_log_capacity: 50,
        }
    }
}

/// Journal entry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Maximum accepted entry length in bytes.
    pub max_entry_bytes: usize,
    /// Maximum number of entries returned by a list request.
    pub list_limit: u64,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            max_entry_bytes: 64 * 1024,
            list_limit: 500,
        }
    }
}
