//! Platform snowflake identifiers.
//!
//! Identifiers are stored as decimal strings in record files and accept either
//! a string or a number when read back.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            derive_more::Display, derive_more::From,
        )]
        #[display("{_0}")]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(SnowflakeVisitor).map(Self)
            }
        }
    };
}

struct SnowflakeVisitor;

impl Visitor<'_> for SnowflakeVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a snowflake as string or integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom("negative snowflake"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        v.parse().map_err(E::custom)
    }
}

snowflake!(
    /// A guild (server). Its id doubles as the `@everyone` role id.
    GuildId
);
snowflake!(
    /// A user or guild member.
    UserId
);
snowflake!(
    /// A guild role.
    RoleId
);
snowflake!(
    /// A text channel, category or direct channel.
    ChannelId
);
snowflake!(
    /// A posted message.
    MessageId
);

impl GuildId {
    /// The guild-default (`@everyone`) role.
    pub fn everyone_role(self) -> RoleId {
        RoleId(self.0)
    }
}

impl UserId {
    /// `<@id>` mention markup.
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}

impl RoleId {
    /// `<@&id>` mention markup.
    pub fn mention(self) -> String {
        format!("<@&{}>", self.0)
    }
}

impl ChannelId {
    /// `<#id>` mention markup.
    pub fn mention(self) -> String {
        format!("<#{}>", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_ids_round_trip_as_strings() {
        let json = serde_json::to_string(&UserId(707959058228969485)).unwrap();
        assert_eq!(json, "\"707959058228969485\"");
    }

    #[test]
    fn test_ids_accept_numbers() {
        let id: RoleId = serde_json::from_str("1398531144022102177").unwrap();
        assert_eq!(id, RoleId(1398531144022102177));
    }

    #[test]
    fn test_ids_work_as_map_keys() {
        let map: BTreeMap<ChannelId, u8> = serde_json::from_str(r#"{"12": 1}"#).unwrap();
        assert_eq!(map.get(&ChannelId(12)), Some(&1));
    }
}
