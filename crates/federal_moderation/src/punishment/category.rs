use crate::config::PunishmentRoles;
use crate::ids::RoleId;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// Sanction tier. Each tier maps to one role and a validity in days.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
pub enum PunishmentCategory {
    /// Three-day warning
    #[serde(rename = "leve")]
    #[strum(serialize = "leve")]
    Leve,
    /// Five-day warning
    #[serde(rename = "media")]
    #[strum(serialize = "media")]
    Media,
    /// Seven-day warning
    #[serde(rename = "grave")]
    #[strum(serialize = "grave")]
    Grave,
    /// Dismissal from the corporation; never expires, never revoked
    #[serde(rename = "exoneração", alias = "exoneracao")]
    #[strum(serialize = "exoneração")]
    Exoneracao,
}

impl PunishmentCategory {
    /// Parse a staff-typed tag, case-insensitively.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "leve" => Some(Self::Leve),
            "media" | "média" => Some(Self::Media),
            "grave" => Some(Self::Grave),
            "exoneração" | "exoneracao" => Some(Self::Exoneracao),
            _ => None,
        }
    }

    /// Validity in days; zero means no expiry.
    pub fn days(self) -> i64 {
        match self {
            Self::Leve => 3,
            Self::Media => 5,
            Self::Grave => 7,
            Self::Exoneracao => 0,
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Leve => "Advertência Leve",
            Self::Media => "Advertência Média",
            Self::Grave => "Advertência Grave",
            Self::Exoneracao => "Exoneração",
        }
    }

    /// Whether staff may lift it through the removal flow.
    pub fn is_revocable(self) -> bool {
        !matches!(self, Self::Exoneracao)
    }

    /// Role bound to this tier.
    pub fn role(self, roles: &PunishmentRoles) -> RoleId {
        match self {
            Self::Leve => roles.leve,
            Self::Media => roles.media,
            Self::Grave => roles.grave,
            Self::Exoneracao => roles.exoneracao,
        }
    }

    /// Validity as a duration, `None` for non-expiring tiers.
    pub fn validity(self) -> Option<chrono::Duration> {
        match self.days() {
            0 => None,
            days => Some(chrono::Duration::days(days)),
        }
    }

    /// Roles of every tier.
    pub fn all_roles(roles: &PunishmentRoles) -> Vec<RoleId> {
        Self::iter().map(|c| c.role(roles)).collect()
    }
}
