//! Bot configuration file.

use federal_error::{ConfigError, FederalResult};
use federal_moderation::ModerationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Everything read from `federal.toml`.
///
/// The moderation sections (`[guild]`, `[punishments]`, `[blacklist]`,
/// `[tickets]`, `[access]`, `[embeds]`) sit at the top level next to
/// `[keepalive]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Guild, channel and role identities
    #[serde(flatten)]
    pub moderation: ModerationConfig,
    /// Keep-alive HTTP endpoint
    #[serde(default)]
    pub keepalive: KeepAliveConfig,
}

/// Keep-alive endpoint settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeepAliveConfig {
    /// TCP port bound on all interfaces
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl BotConfig {
    /// Load and validate the configuration from a TOML file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> FederalResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        debug!(
            guild = %config.moderation.guild.guild_id,
            data_dir = %config.moderation.data_dir().display(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> FederalResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.moderation.validate()?;
        Ok(config)
    }
}
