//! Moderation configuration: guild, channel and role identities.

use crate::ids::{ChannelId, GuildId, RoleId};
use federal_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the moderation components need to know about the guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Guild-wide settings
    pub guild: GuildConfig,
    /// Punishment registry settings
    pub punishments: PunishmentConfig,
    /// Blacklist settings
    pub blacklist: BlacklistConfig,
    /// Ticket desk settings
    pub tickets: TicketConfig,
    /// Access panel settings
    pub access: AccessConfig,
    /// User embed manager settings
    #[serde(default)]
    pub embeds: EmbedConfig,
}

/// Guild-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// The single guild the bot serves
    pub guild_id: GuildId,
    /// Staff role allowed to manage tickets
    pub staff_role: RoleId,
    /// Directory holding the record files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("banco")
}

/// Role mapped to each punishment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunishmentRoles {
    /// "leve" role
    pub leve: RoleId,
    /// "media" role
    pub media: RoleId,
    /// "grave" role
    pub grave: RoleId,
    /// "exoneração" role
    pub exoneracao: RoleId,
}

/// Punishment registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunishmentConfig {
    /// Channel holding the pinned punishment panel
    pub panel_channel: ChannelId,
    /// Channel receiving audit embeds
    pub log_channel: ChannelId,
    /// Category roles
    pub roles: PunishmentRoles,
    /// Image shown on the panel and audit embeds
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Blacklist settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistConfig {
    /// Channel holding the pinned blacklist summary
    pub panel_channel: ChannelId,
    /// Image shown on the summary
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Ticket desk settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Channel holding the desk panel
    pub desk_channel: ChannelId,
    /// Category new ticket channels are created under
    pub category: ChannelId,
    /// Channel receiving closed-ticket transcripts
    pub log_channel: ChannelId,
    /// Delay between a close trigger and retirement
    #[serde(default = "default_close_delay")]
    pub close_delay_secs: u64,
    /// Image shown on the desk panel
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_close_delay() -> u64 {
    10
}

impl TicketConfig {
    /// Close delay as a duration.
    pub fn close_delay(&self) -> Duration {
        Duration::from_secs(self.close_delay_secs)
    }
}

/// Access panel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Channel holding the access panel
    pub panel_channel: ChannelId,
    /// Role granted and revoked by the panel
    pub role: RoleId,
    /// Channel the role unlocks, mentioned in the grant reply
    pub announced_channel: ChannelId,
    /// Image shown on the panel
    #[serde(default)]
    pub image_url: Option<String>,
}

/// User embed manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// How long a draft waits for a channel mention
    #[serde(default = "default_collector_timeout")]
    pub collector_timeout_secs: u64,
}

fn default_collector_timeout() -> u64 {
    60
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            collector_timeout_secs: default_collector_timeout(),
        }
    }
}

impl EmbedConfig {
    /// Collector window as a duration.
    pub fn collector_timeout(&self) -> Duration {
        Duration::from_secs(self.collector_timeout_secs)
    }
}

impl ModerationConfig {
    /// Reject configurations that cannot work: zero ids and zero delays.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ids = [
            ("guild.guild_id", self.guild.guild_id.get()),
            ("guild.staff_role", self.guild.staff_role.get()),
            ("punishments.panel_channel", self.punishments.panel_channel.get()),
            ("punishments.log_channel", self.punishments.log_channel.get()),
            ("punishments.roles.leve", self.punishments.roles.leve.get()),
            ("punishments.roles.media", self.punishments.roles.media.get()),
            ("punishments.roles.grave", self.punishments.roles.grave.get()),
            ("punishments.roles.exoneracao", self.punishments.roles.exoneracao.get()),
            ("blacklist.panel_channel", self.blacklist.panel_channel.get()),
            ("tickets.desk_channel", self.tickets.desk_channel.get()),
            ("tickets.category", self.tickets.category.get()),
            ("tickets.log_channel", self.tickets.log_channel.get()),
            ("access.panel_channel", self.access.panel_channel.get()),
            ("access.role", self.access.role.get()),
            ("access.announced_channel", self.access.announced_channel.get()),
        ];
        if let Some((name, _)) = ids.iter().find(|(_, id)| *id == 0) {
            return Err(ConfigError::new(format!("{name} must be a non-zero id")));
        }
        if self.tickets.close_delay_secs == 0 {
            return Err(ConfigError::new("tickets.close_delay_secs must be positive"));
        }
        if self.embeds.collector_timeout_secs == 0 {
            return Err(ConfigError::new(
                "embeds.collector_timeout_secs must be positive",
            ));
        }
        Ok(())
    }

    /// Path of a record file inside the data directory.
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.guild.data_dir.join(name)
    }

    /// Data directory.
    pub fn data_dir(&self) -> &Path {
        &self.guild.data_dir
    }
}
