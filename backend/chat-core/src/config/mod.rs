//! Client configuration.
//!
//! Loaded from `{config_dir}/ichat.toml`. Every field has a default so a
//! missing file (or missing section) yields a usable config. The agent
//! password is never part of the file; see [`ClientConfig::credentials`].

use crate::DEFAULT_SERVER_URL;
use crate::error::config::ConfigError;

use common::{ErrorLocation, RedactedSecret};
use models::{Credentials, CredentialsBuilder};

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "ichat.toml";
const CONFIG_DIR_NAME: &str = "ichat";
const CONFIG_DIR_ENV_VAR: &str = "ICHAT_CONFIG_DIR";
pub const PASSWORD_ENV_VAR: &str = "ICHAT_PASSWORD";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_guest")]
    pub guest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            guest: default_guest(),
            nickname: None,
            username: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Minimum gap between two outgoing typing pings for one channel.
    #[serde(default = "default_typing_cooldown_ms")]
    pub cooldown_ms: u64,
    /// How long a view should show "is typing" for an inbound ping.
    #[serde(default = "default_typing_display_ms")]
    pub display_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_typing_cooldown_ms(),
            display_ms: default_typing_display_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelModesConfig {
    /// Delay a view should wait before rendering a mode snapshot.
    #[serde(default = "default_modes_settle_ms")]
    pub settle_ms: u64,
}

impl Default for ChannelModesConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_modes_settle_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub typing: TypingConfig,

    #[serde(default)]
    pub channel_modes: ChannelModesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_guest() -> bool {
    true
}
fn default_typing_cooldown_ms() -> u64 {
    5000
}
fn default_typing_display_ms() -> u64 {
    4000
}
fn default_modes_settle_ms() -> u64 {
    500
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ClientConfig {
    /// Resolve the config directory.
    ///
    /// `ICHAT_CONFIG_DIR` wins; otherwise `{platform config dir}/ichat`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirectoryNotFound`] if the platform has no
    /// config directory and no override is set.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV_VAR) {
            info!("Using {CONFIG_DIR_ENV_VAR} override: {custom_dir}");
            return Ok(PathBuf::from(custom_dir));
        }

        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or_else(|| ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Full path of the config file inside `config_dir`.
    pub fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE_NAME)
    }

    /// Load config from `{config_dir}/ichat.toml`.
    ///
    /// # Returns
    ///
    /// Returns `Ok(ClientConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::file_path(config_dir);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::Read {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: ClientConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML: {}", e);
            ConfigError::Parse {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to `{config_dir}/ichat.toml` using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = Self::file_path(config_dir);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, text).map_err(|e| ConfigError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.server.url).map_err(|e| ConfigError::Validation {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Invalid server url {}: {e}", self.server.url),
        })?;

        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(ConfigError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Server url must use ws:// or wss://: {}", self.server.url),
            });
        }

        if self.server.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: "connect_timeout_secs must be non-zero".to_string(),
            });
        }

        if self.typing.cooldown_ms == 0 || self.typing.display_ms == 0 {
            return Err(ConfigError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: "typing windows must be non-zero".to_string(),
            });
        }

        if let Some(ref level) = self.logging.level
            && LevelFilter::from_str(level).is_err()
        {
            return Err(ConfigError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Unknown log level: {level}"),
            });
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.server.connect_timeout_secs)
    }

    pub fn typing_cooldown(&self) -> Duration {
        Duration::from_millis(self.typing.cooldown_ms)
    }

    pub fn typing_display(&self) -> Duration {
        Duration::from_millis(self.typing.display_ms)
    }

    pub fn modes_settle(&self) -> Duration {
        Duration::from_millis(self.channel_modes.settle_ms)
    }

    /// Configured log level, if any. Invalid values were rejected by `validate`.
    pub fn log_level(&self) -> Option<LevelFilter> {
        self.logging
            .level
            .as_deref()
            .and_then(|level| LevelFilter::from_str(level).ok())
    }

    /// Build login credentials from the identity section.
    ///
    /// Agent logins read the password from `ICHAT_PASSWORD`, after loading a
    /// `.env` file from the working directory if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Environment`] if the password variable is
    /// unset or not unicode, and [`ConfigError::Validation`] if the identity
    /// is incomplete.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let mut builder = CredentialsBuilder::default().with_guest(self.identity.guest);

        if let Some(ref nickname) = self.identity.nickname {
            builder = builder.with_nickname(nickname);
        }

        if !self.identity.guest {
            if let Ok(path) = dotenvy::dotenv() {
                debug!("Loaded .env from: {:?}", path);
            }

            let password = env::var(PASSWORD_ENV_VAR).map_err(|e| ConfigError::Environment {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("{PASSWORD_ENV_VAR}: {e}"),
            })?;

            builder = builder.with_password(RedactedSecret::new(password));

            if let Some(ref username) = self.identity.username {
                builder = builder.with_username(username);
            }
        }

        builder.build().map_err(|e| ConfigError::Validation {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })
    }
}
