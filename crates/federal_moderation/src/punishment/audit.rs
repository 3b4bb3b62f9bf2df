//! Audit-log embeds for applied and lifted punishments.

use super::{Punishment, PunishmentCategory};
use crate::ids::UserId;
use crate::message::{Embed, colors};
use chrono::{DateTime, Utc};

const COMPOUND_RANK_WORDS: [&str; 4] = ["chefe", "supervisor", "sub", "coordenador"];

const KNOWN_RANKS: [&str; 16] = [
    "investigador",
    "perito",
    "delegado",
    "agente",
    "escrivão",
    "chefe",
    "supervisor",
    "subcoordenador",
    "coordenador",
    "soldado",
    "cabo",
    "sargento",
    "tenente",
    "capitão",
    "major",
    "coronel",
];

const UNSPECIFIED: &str = "Não especificado";

/// A display name split into its role-play parts,
/// e.g. `"Investigador Chefe Gustavo #135"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QraName {
    /// Numeric QRA id after the trailing `#`
    pub qra_id: Option<String>,
    /// Rank words
    pub rank: String,
    /// Remaining name
    pub name: String,
}

impl QraName {
    /// Split a display name.
    pub fn parse(display_name: &str) -> Self {
        let (base, qra_id) = split_qra_id(display_name);

        let (mut rank, mut name) = match base.split_once(' ') {
            Some((first, rest)) => {
                let rest = rest.trim();
                match rest.split_once(char::is_whitespace) {
                    Some((second, tail))
                        if COMPOUND_RANK_WORDS.contains(&second.to_lowercase().as_str()) =>
                    {
                        (format!("{first} {second}"), tail.trim().to_string())
                    }
                    _ => (first.to_string(), rest.to_string()),
                }
            }
            None => (UNSPECIFIED.to_string(), base.to_string()),
        };

        if name.is_empty() || name == rank {
            let first = base.split(' ').next().unwrap_or_default();
            if KNOWN_RANKS.contains(&first.to_lowercase().as_str()) {
                rank = first.to_string();
                name = base[first.len()..].trim().to_string();
                if name.is_empty() {
                    name = "N/A".to_string();
                }
            } else {
                rank = UNSPECIFIED.to_string();
                name = base.to_string();
            }
        }

        Self { qra_id, rank, name }
    }
}

fn split_qra_id(display_name: &str) -> (&str, Option<String>) {
    if let Some((head, digits)) = display_name.rsplit_once('#')
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
    {
        return (head.trim(), Some(digits.to_string()));
    }
    (display_name, None)
}

fn ceil_days(span: chrono::Duration) -> i64 {
    let ms = span.num_milliseconds();
    let day = chrono::Duration::days(1).num_milliseconds();
    (ms + day - 1).div_euclid(day)
}

fn common_fields(record: &Punishment, embed: Embed, missing_qra: &str) -> Embed {
    let qra = QraName::parse(&record.member_name);
    embed
        .field("QRA do Punido:", record.member_id.mention(), true)
        .field("Nome do Punido:", qra.name, true)
        .field(
            "ID do Punido:",
            format!("`{}`", qra.qra_id.as_deref().unwrap_or(missing_qra)),
            false,
        )
        .field("Cargo:", qra.rank, true)
        .field("Motivo:", record.reason.clone(), false)
        .field("Punição:", record.role_id.mention(), true)
        .field("Quem Puniu:", record.punisher_id.mention(), true)
}

fn base_embed(title: &str, color: u32, image: Option<&str>, now: DateTime<Utc>) -> Embed {
    let embed = Embed::new().title(title).color(color).timestamp(now);
    match image {
        Some(url) => embed.image(url),
        None => embed,
    }
}

/// Embed posted to the audit channel when a punishment is applied.
pub fn applied_embed(record: &Punishment, image: Option<&str>, now: DateTime<Utc>) -> Embed {
    let embed = base_embed("🚫 Punição Adicionada", colors::RED, image, now);
    let embed = common_fields(record, embed, "N/A (não encontrado)");
    let expiry = match (record.punishment_type, record.expires_at) {
        (PunishmentCategory::Exoneracao, _) => "♾️ (Nunca)".to_string(),
        (_, Some(expires_at)) => format!("Em {} dias", ceil_days(expires_at - now)),
        (_, None) => "Não se aplica".to_string(),
    };
    embed.field("Expira em:", expiry, true)
}

/// Replacement embed once a punishment is lifted.
pub fn removed_embed(
    record: &Punishment,
    remover: UserId,
    image: Option<&str>,
    now: DateTime<Utc>,
) -> Embed {
    let embed = base_embed("🚫 Punição Removida", colors::GREEN, image, now);
    let embed = common_fields(record, embed, "N/A (não encontrado no QRA original)")
        .field("Quem Removeu:", remover.mention(), true);
    let expiry = match (record.punishment_type, record.expires_at) {
        (PunishmentCategory::Exoneracao, _) => "♾️ (Nunca)".to_string(),
        (_, Some(expires_at)) => format!(
            "Originalmente em {} dias",
            ceil_days(expires_at - record.punished_at)
        ),
        (_, None) => "Não se aplica".to_string(),
    };
    embed.field("Expira em:", expiry, true)
}
