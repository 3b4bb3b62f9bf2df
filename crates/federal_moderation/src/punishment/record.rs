use super::PunishmentCategory;
use crate::ids::{MessageId, RoleId, UserId};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One applied sanction.
///
/// Field names and millisecond timestamps match the record files written by
/// earlier versions of the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Punishment {
    /// Unique token
    pub id: String,
    /// Punished member
    pub member_id: UserId,
    /// Display name captured when the punishment was applied
    pub member_name: String,
    /// Tier
    pub punishment_type: PunishmentCategory,
    /// Role granted for the tier
    pub role_id: RoleId,
    /// Free-text reason
    pub reason: String,
    /// Issuer
    pub punisher_id: UserId,
    /// Issue time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub punished_at: DateTime<Utc>,
    /// Expiry, absent for non-expiring tiers
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Audit message, once sent
    #[serde(default)]
    pub log_message_id: Option<MessageId>,
}

impl Punishment {
    /// Whether staff may lift it.
    pub fn is_revocable(&self) -> bool {
        self.punishment_type.is_revocable()
    }
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Unique token: base-36 millisecond timestamp followed by five random
/// base-36 characters.
pub fn generate_token(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let mut token = base36(millis);
    token.extend((0..5).map(|_| char::from(BASE36[rng.gen_range(0..36)])));
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
    }

    #[test]
    fn test_token_shape() {
        let now = DateTime::from_timestamp_millis(1_722_000_000_000).unwrap();
        let token = generate_token(now);
        assert!(token.starts_with(&base36(1_722_000_000_000)));
        assert_eq!(token.len(), base36(1_722_000_000_000).len() + 5);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_reads_legacy_record() {
        let json = r#"{
            "id": "lz1abcde",
            "memberId": "707959058228969485",
            "memberName": "Investigador Chefe Gustavo #135",
            "punishmentType": "leve",
            "roleId": "1398531144022102177",
            "reason": "Atraso",
            "punisherId": "1",
            "punishedAt": 1722000000000,
            "expiresAt": 1722259200000,
            "logMessageId": null
        }"#;
        let record: Punishment = serde_json::from_str(json).unwrap();
        assert_eq!(record.punishment_type, PunishmentCategory::Leve);
        assert_eq!(
            record.expires_at.unwrap() - record.punished_at,
            chrono::Duration::days(3)
        );
        assert!(record.log_message_id.is_none());
    }
}
