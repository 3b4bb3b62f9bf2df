//! Inbound interactions and the single acknowledgement each one receives.

use crate::ids::{ChannelId, RoleId, UserId};
use crate::message::{ComponentRow, Embed};
use async_trait::async_trait;
use federal_error::PlatformResult;
use std::collections::HashMap;

/// What the member did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    /// Slash command invocation
    Command {
        /// Command name without the slash
        name: String,
    },
    /// Button click
    Button {
        /// Button custom id
        custom_id: String,
    },
    /// String select choice
    Select {
        /// Menu custom id
        custom_id: String,
        /// Chosen values
        values: Vec<String>,
    },
    /// Modal submission
    Modal {
        /// Modal custom id
        custom_id: String,
        /// Text input values keyed by input custom id
        fields: HashMap<String, String>,
    },
}

/// Guild-level permissions of the acting member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorPermissions {
    /// Administrator
    pub administrator: bool,
    /// Manage Roles
    pub manage_roles: bool,
}

/// An inbound platform interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// What happened
    pub kind: InteractionKind,
    /// Acting user
    pub user: UserId,
    /// Acting user's handle
    pub username: String,
    /// Acting user's tag
    pub user_tag: String,
    /// Roles held by the acting member
    pub roles: Vec<RoleId>,
    /// Guild permissions of the acting member
    pub permissions: ActorPermissions,
    /// Channel the interaction happened in
    pub channel: ChannelId,
    /// Token for follow-up messages
    pub token: String,
}

impl Interaction {
    /// Custom id of a component or modal interaction.
    pub fn custom_id(&self) -> Option<&str> {
        match &self.kind {
            InteractionKind::Command { .. } => None,
            InteractionKind::Button { custom_id }
            | InteractionKind::Select { custom_id, .. }
            | InteractionKind::Modal { custom_id, .. } => Some(custom_id),
        }
    }

    /// Command name of a slash command invocation.
    pub fn command_name(&self) -> Option<&str> {
        match &self.kind {
            InteractionKind::Command { name } => Some(name),
            _ => None,
        }
    }

    /// Submitted value of a modal text input (trimmed).
    pub fn field(&self, id: &str) -> Option<&str> {
        match &self.kind {
            InteractionKind::Modal { fields, .. } => fields.get(id).map(|v| v.trim()),
            _ => None,
        }
    }

    /// First selected value of a select menu.
    pub fn selected(&self) -> Option<&str> {
        match &self.kind {
            InteractionKind::Select { values, .. } => values.first().map(String::as_str),
            _ => None,
        }
    }

    /// Whether the actor holds `role`.
    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// Text input style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStyle {
    /// Single line
    Short,
    /// Multi line
    Paragraph,
}

/// A modal text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    /// Identifier of the submitted field
    pub custom_id: String,
    /// Label
    pub label: String,
    /// Single or multi line
    pub style: InputStyle,
    /// Must be filled
    pub required: bool,
    /// Prefilled value
    pub value: Option<String>,
    /// Placeholder text
    pub placeholder: Option<String>,
}

impl TextInput {
    /// Required input.
    pub fn required(custom_id: &str, label: &str, style: InputStyle) -> Self {
        Self {
            custom_id: custom_id.to_string(),
            label: label.to_string(),
            style,
            required: true,
            value: None,
            placeholder: None,
        }
    }

    /// Optional input.
    pub fn optional(custom_id: &str, label: &str, style: InputStyle) -> Self {
        Self {
            required: false,
            ..Self::required(custom_id, label, style)
        }
    }

    /// Prefill the input.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set a placeholder.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// A modal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    /// Identifier routed back on submission
    pub custom_id: String,
    /// Title
    pub title: String,
    /// Inputs, one per row
    pub inputs: Vec<TextInput>,
}

/// Reply content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Text content
    pub content: String,
    /// Visible only to the actor
    pub ephemeral: bool,
    /// Embeds
    pub embeds: Vec<Embed>,
    /// Component rows
    pub components: Vec<ComponentRow>,
}

impl Reply {
    /// Reply only the actor sees.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            ..Self::default()
        }
    }

    /// Reply everyone in the channel sees.
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
            ..Self::default()
        }
    }

    /// Append a component row.
    pub fn with_row(mut self, row: ComponentRow) -> Self {
        self.components.push(row);
        self
    }
}

/// The one acknowledgement an interaction receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// New reply message
    Message(Reply),
    /// Open a modal
    Modal(Modal),
    /// Replace the message the component belongs to
    Update(Reply),
}

impl Response {
    /// Ephemeral text reply.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::Message(Reply::ephemeral(content))
    }

    /// Public text reply.
    pub fn public(content: impl Into<String>) -> Self {
        Self::Message(Reply::public(content))
    }

    /// Text of a message or update response.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Message(reply) | Self::Update(reply) => Some(&reply.content),
            Self::Modal(_) => None,
        }
    }
}

/// Early acknowledgement sent before a slow handler runs.
///
/// The platform only waits a few seconds for the first acknowledgement, so
/// handlers that touch channels, roles or records defer and deliver their
/// result by editing the original response afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferral {
    /// Show a pending reply that the result replaces
    Reply {
        /// Visible only to the actor
        ephemeral: bool,
    },
    /// Keep the component message until the result replaces it
    Update,
}

/// Delivers acknowledgements for one interaction.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Acknowledge now and deliver the result later.
    async fn defer(&self, deferral: Deferral) -> PlatformResult<()>;

    /// Send the single acknowledgement.
    async fn respond(&self, response: &Response) -> PlatformResult<()>;

    /// Replace the deferred acknowledgement with the result.
    async fn edit_original(&self, reply: &Reply) -> PlatformResult<()>;
}
