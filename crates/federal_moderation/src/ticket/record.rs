use crate::ids::{ChannelId, UserId};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

const BRASILIA_OFFSET_SECS: i32 = 3 * 3600;

/// Support request category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TicketCategory {
    /// General questions and support
    SuporteGeral,
    /// Bug reports
    Bugs,
    /// Promotions
    Upamentos,
    /// Reports against members
    DenunciaMembros,
}

impl TicketCategory {
    /// Kebab-case tag.
    pub fn tag(self) -> &'static str {
        self.into()
    }

    /// Human label derived from the tag.
    pub fn label(self) -> String {
        format_label(self.tag())
    }

    /// One-line description shown in the desk menu.
    pub fn description(self) -> &'static str {
        match self {
            Self::SuporteGeral => "Esclareça dúvidas e solicite suporte",
            Self::Bugs => "Reporte Bugs ou problemas com o BOT",
            Self::Upamentos => "Informe-se sobre upamentos",
            Self::DenunciaMembros => "Denuncie membros da corporação",
        }
    }
}

/// Split on `-` and capitalise every segment: `suporte-geral` → `Suporte Geral`.
pub fn format_label(tag: &str) -> String {
    tag.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One captured message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Author tag
    pub author: String,
    /// Message text
    pub content: String,
    /// Post time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// An open support conversation, keyed by its channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Backing channel
    pub channel_id: ChannelId,
    /// Member who opened it
    pub owner_id: UserId,
    /// Category
    #[serde(rename = "type")]
    pub category: TicketCategory,
    /// Reason given on opening
    pub reason: String,
    /// Opening time
    pub created_at: DateTime<Utc>,
    /// Append-only message log
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
}

fn brasilia() -> FixedOffset {
    FixedOffset::west_opt(BRASILIA_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// `dd/mm/yyyy HH:MM:SS` in Brasília time.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&brasilia())
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}

/// `dd/mm/yyyy` in Brasília time.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&brasilia()).format("%d/%m/%Y").to_string()
}

impl Ticket {
    /// Flat text rendering, one `[time] author: content` line per message.
    pub fn render_transcript(&self) -> String {
        self.transcript
            .iter()
            .map(|e| format!("[{}] {}: {}", format_timestamp(e.timestamp), e.author, e.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_labels() {
        assert_eq!(format_label("suporte-geral"), "Suporte Geral");
        assert_eq!(format_label("bugs"), "Bugs");
        assert_eq!(TicketCategory::DenunciaMembros.label(), "Denuncia Membros");
    }

    #[test]
    fn test_tags_parse_back() {
        for category in TicketCategory::iter() {
            assert_eq!(category.tag().parse::<TicketCategory>().unwrap(), category);
        }
        assert!("vendas".parse::<TicketCategory>().is_err());
    }

    #[test]
    fn test_transcript_lines() {
        let at = DateTime::parse_from_rfc3339("2025-08-02T15:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let ticket = Ticket {
            channel_id: ChannelId::from(1),
            owner_id: UserId::from(2),
            category: TicketCategory::Bugs,
            reason: "r".to_string(),
            created_at: at,
            transcript: vec![
                TranscriptEntry {
                    author: "ana".to_string(),
                    content: "oi".to_string(),
                    timestamp: at,
                },
                TranscriptEntry {
                    author: "beto".to_string(),
                    content: "olá".to_string(),
                    timestamp: at,
                },
            ],
        };
        assert_eq!(
            ticket.render_transcript(),
            "[02/08/2025 12:04:05] ana: oi\n[02/08/2025 12:04:05] beto: olá"
        );
    }

    #[test]
    fn test_reads_legacy_ticket() {
        let json = r#"{
            "channelId": "55",
            "ownerId": "66",
            "type": "suporte-geral",
            "reason": "Dúvida",
            "createdAt": "2025-08-02T15:04:05.123Z",
            "transcript": [{"author": "ana", "content": "oi", "timestamp": 1754147045123}]
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.category, TicketCategory::SuporteGeral);
        assert_eq!(ticket.transcript.len(), 1);
    }
}
