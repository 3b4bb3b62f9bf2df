//! Free-text member identity resolution.
//!
//! Staff type members into modals as a mention, a raw id or a name. The
//! resolver tries, in order: the `<@id>`/`<@!id>` mention wrapper, a bare
//! numeric id, then a case-insensitive exact match against display name,
//! handle, tag and nickname of every current member.

use crate::ids::UserId;
use crate::platform::{Member, Platform};
use federal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?(\d+)>$").expect("Valid mention regex"));

/// Outcome of resolving a free-text identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one identity matched.
    Resolved(UserId),
    /// Several members matched by name; candidates in member-list order.
    Ambiguous(Vec<UserId>),
    /// Nothing matched.
    NotFound,
}

impl Resolution {
    /// The identity acted upon: the single match, or the first candidate.
    pub fn first(&self) -> Option<UserId> {
        match self {
            Self::Resolved(id) => Some(*id),
            Self::Ambiguous(ids) => ids.first().copied(),
            Self::NotFound => None,
        }
    }
}

/// Resolve `input` without touching the member list (mention or bare id).
pub fn parse_direct(input: &str) -> Option<UserId> {
    let input = input.trim();
    if let Some(caps) = MENTION.captures(input) {
        return caps.get(1).and_then(|m| m.as_str().parse().ok());
    }
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return input.parse().ok();
    }
    None
}

/// Match `input` against member names, case-insensitively and exactly.
pub fn match_by_name(input: &str, members: &[Member]) -> Resolution {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Resolution::NotFound;
    }
    let matches: Vec<UserId> = members
        .iter()
        .filter(|m| {
            m.display_name.to_lowercase() == needle
                || m.username.to_lowercase() == needle
                || m.tag.to_lowercase() == needle
                || m
                    .nickname
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase() == needle)
        })
        .map(|m| m.id)
        .collect();
    match matches.as_slice() {
        [] => Resolution::NotFound,
        [id] => Resolution::Resolved(*id),
        _ => Resolution::Ambiguous(matches),
    }
}

/// Three-stage resolution against the live member list.
#[instrument(skip(platform))]
pub async fn resolve(platform: &dyn Platform, input: &str) -> ModerationResult<Resolution> {
    if let Some(id) = parse_direct(input) {
        debug!(%id, "Resolved identity directly");
        return Ok(Resolution::Resolved(id));
    }
    let members = platform.members().await?;
    let resolution = match_by_name(input, &members);
    debug!(?resolution, candidates = members.len(), "Resolved identity by name");
    Ok(resolution)
}

/// Resolve `input` to a current guild member.
///
/// Ambiguous names act on the first candidate and log the alternatives.
/// Fails with `Resolution` when nothing matches or the match is no longer a
/// member.
pub async fn resolve_member(platform: &dyn Platform, input: &str) -> ModerationResult<Member> {
    let resolution = resolve(platform, input).await?;
    if let Resolution::Ambiguous(candidates) = &resolution {
        warn!(input, ?candidates, "Ambiguous member name, using first match");
    }
    let Some(id) = resolution.first() else {
        return Err(ModerationError::new(ModerationErrorKind::Resolution(
            "Não foi possível encontrar o membro especificado. Use a menção (@membro) ou o ID do membro."
                .to_string(),
        )));
    };
    platform.member(id).await?.ok_or_else(|| {
        ModerationError::new(ModerationErrorKind::Resolution(
            "O membro com o ID fornecido não foi encontrado no servidor.".to_string(),
        ))
    })
}
