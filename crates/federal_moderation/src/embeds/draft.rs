use crate::ids::{ChannelId, MessageId};
use crate::message::{Embed, colors};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// Colour used when the submitted one is missing or malformed.
pub const DEFAULT_COLOR: &str = "#3498DB";

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Valid colour regex"));

/// Content of a user-authored embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedDraft {
    /// Title
    pub title: String,
    /// Body
    pub description: String,
    /// `#RRGGBB`
    pub color: String,
    /// Absolute image URL
    #[serde(default)]
    pub image: Option<String>,
    /// Footer text
    #[serde(default)]
    pub footer_text: Option<String>,
}

impl EmbedDraft {
    /// Build a draft from raw modal input, normalising colour and image.
    pub fn from_input(
        title: &str,
        description: &str,
        color: Option<&str>,
        image: Option<&str>,
        footer_text: Option<&str>,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            color: normalize_color(color),
            image: image
                .map(str::trim)
                .filter(|i| Url::parse(i).is_ok())
                .map(str::to_string),
            footer_text: footer_text
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        }
    }

    /// Colour as an RGB value.
    pub fn rgb(&self) -> u32 {
        u32::from_str_radix(self.color.trim_start_matches('#'), 16)
            .unwrap_or(colors::DEFAULT_BLUE)
    }

    /// Render the draft.
    pub fn to_embed(&self) -> Embed {
        let mut embed = Embed::new()
            .title(self.title.as_str())
            .description(self.description.as_str())
            .color(self.rgb());
        if let Some(image) = &self.image {
            embed = embed.image(image.as_str());
        }
        if let Some(footer) = self.footer_text.as_deref().filter(|f| !f.is_empty()) {
            embed = embed.footer(footer);
        }
        embed
    }
}

/// Keep `color` when it is `#RRGGBB`, otherwise fall back to [`DEFAULT_COLOR`].
pub fn normalize_color(color: Option<&str>) -> String {
    match color.map(str::trim) {
        Some(c) if HEX_COLOR.is_match(c) => c.to_string(),
        _ => DEFAULT_COLOR.to_string(),
    }
}

/// A sent embed and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEmbed {
    /// Embed content
    pub embed_data: EmbedDraft,
    /// Channel the embed was sent to
    pub channel_id: ChannelId,
    /// Message carrying the embed
    pub message_id: MessageId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_fallback() {
        assert_eq!(normalize_color(Some("#ff0000")), "#ff0000");
        assert_eq!(normalize_color(Some("red")), DEFAULT_COLOR);
        assert_eq!(normalize_color(Some("#12345")), DEFAULT_COLOR);
        assert_eq!(normalize_color(None), DEFAULT_COLOR);
    }

    #[test]
    fn test_relative_image_dropped() {
        let draft = EmbedDraft::from_input("T", "D", None, Some("not a url"), Some(""));
        assert_eq!(draft.image, None);
        assert_eq!(draft.footer_text, None);
        let draft = EmbedDraft::from_input("T", "D", None, Some("https://x.io/a.png"), None);
        assert_eq!(draft.image.as_deref(), Some("https://x.io/a.png"));
    }

    #[test]
    fn test_rgb() {
        let draft = EmbedDraft::from_input("T", "D", Some("#00FF00"), None, None);
        assert_eq!(draft.rgb(), 0x00FF00);
        assert_eq!(draft.to_embed().color, Some(0x00FF00));
    }

    #[test]
    fn test_reads_stored_record() {
        let raw = r##"{
            "embedData": {"title":"T","description":"D","color":"#3498DB","image":null,"footerText":"","guildId":"1"},
            "channelId":"5","messageId":"6"
        }"##;
        let record: UserEmbed = serde_json::from_str(raw).unwrap();
        assert_eq!(record.channel_id, ChannelId(5));
        assert!(record.embed_data.to_embed().footer.is_none());
    }
}
