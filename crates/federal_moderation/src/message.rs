//! Platform-neutral outgoing message model.
//!
//! Components build these descriptions; the platform adapter turns them into
//! real embeds, buttons and select menus.

use chrono::{DateTime, Utc};
use derive_setters::Setters;

/// Embed colours used across the panels.
pub mod colors {
    /// Punishment panel (orange).
    pub const PANEL_ORANGE: u32 = 0xFFA500;
    /// Punishment applied, blacklist panel (red).
    pub const RED: u32 = 0xFF0000;
    /// Punishment removed (green).
    pub const GREEN: u32 = 0x00FF00;
    /// Default user embed colour.
    pub const DEFAULT_BLUE: u32 = 0x3498DB;
}

/// A single embed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field name
    pub name: String,
    /// Field value
    pub value: String,
    /// Render side by side with neighbours
    pub inline: bool,
}

/// Rich embed description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Setters)]
#[setters(into, strip_option)]
pub struct Embed {
    /// Title line
    pub title: Option<String>,
    /// Body text
    pub description: Option<String>,
    /// RGB colour
    pub color: Option<u32>,
    /// Large image URL
    pub image: Option<String>,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// Footer text
    pub footer: Option<String>,
    /// Timestamp shown in the footer
    pub timestamp: Option<DateTime<Utc>>,
    /// Fields in display order
    #[setters(skip)]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Empty embed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Look up a field value by name.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Button colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    /// Blurple
    Primary,
    /// Grey
    Secondary,
    /// Green
    Success,
    /// Red
    Danger,
}

/// An interactive button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Identifier routed back on click
    pub custom_id: String,
    /// Visible label
    pub label: String,
    /// Colour
    pub style: ButtonStyle,
    /// Unicode emoji shown before the label
    pub emoji: Option<String>,
}

impl Button {
    /// Create a button without emoji.
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: label.into(),
            style,
            emoji: None,
        }
    }

    /// Attach a unicode emoji.
    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}

/// One option of a string select menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Visible label
    pub label: String,
    /// Value routed back on selection
    pub value: String,
    /// Secondary line
    pub description: Option<String>,
}

/// A string select menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectMenu {
    /// Identifier routed back on selection
    pub custom_id: String,
    /// Placeholder text
    pub placeholder: String,
    /// Options (the platform accepts at most 25)
    pub options: Vec<SelectOption>,
}

/// A row of interactive components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentRow {
    /// Up to five buttons
    Buttons(Vec<Button>),
    /// A single select menu
    Select(SelectMenu),
}

impl ComponentRow {
    /// Every custom id in the row.
    pub fn custom_ids(&self) -> Vec<&str> {
        match self {
            Self::Buttons(buttons) => buttons.iter().map(|b| b.custom_id.as_str()).collect(),
            Self::Select(menu) => vec![menu.custom_id.as_str()],
        }
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to readers
    pub filename: String,
    /// Raw content
    pub data: Vec<u8>,
}

/// A message to send or an edit to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Plain text content
    pub content: Option<String>,
    /// Embeds
    pub embeds: Vec<Embed>,
    /// Component rows
    pub components: Vec<ComponentRow>,
    /// File attachments
    pub attachments: Vec<Attachment>,
}

impl OutgoingMessage {
    /// Text-only message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Single-embed message.
    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    /// Set the text content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Append a component row.
    pub fn with_row(mut self, row: ComponentRow) -> Self {
        self.components.push(row);
        self
    }

    /// Append a file attachment.
    pub fn with_attachment(mut self, filename: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachments.push(Attachment {
            filename: filename.into(),
            data,
        });
        self
    }

    /// Title of the first embed, if any.
    pub fn first_embed_title(&self) -> Option<&str> {
        self.embeds.first().and_then(|e| e.title.as_deref())
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
