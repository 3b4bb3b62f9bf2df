//! The chat platform capability consumed by the moderation core.
//!
//! The core never talks to the gateway directly. Everything it needs from the
//! platform (fetching members, sending and pinning messages, channel and role
//! changes) goes through [`Platform`], which the serenity adapter implements
//! for production and `testing::MockPlatform` implements for tests.

use crate::ids::{ChannelId, MessageId, RoleId, UserId};
use crate::message::OutgoingMessage;
use async_trait::async_trait;
use federal_error::PlatformResult;

/// A guild member as seen by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member identity
    pub id: UserId,
    /// Account handle
    pub username: String,
    /// Name shown in the guild (nickname, global name or handle)
    pub display_name: String,
    /// Guild nickname, if set
    pub nickname: Option<String>,
    /// Legacy `name#discriminator` tag, or the handle for migrated accounts
    pub tag: String,
    /// Roles currently held (never includes `@everyone`)
    pub roles: Vec<RoleId>,
    /// Bot account
    pub bot: bool,
}

impl Member {
    /// Whether the member currently holds `role`.
    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// A user account (possibly no longer a member).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Account identity
    pub id: UserId,
    /// Account handle
    pub username: String,
    /// Legacy tag or handle
    pub tag: String,
}

/// A message already posted in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    /// Message identity
    pub id: MessageId,
    /// Author identity
    pub author: UserId,
    /// Titles of the message's embeds, in order
    pub embed_titles: Vec<Option<String>>,
}

impl PostedMessage {
    /// Title of the first embed.
    pub fn first_embed_title(&self) -> Option<&str> {
        self.embed_titles.first().and_then(|t| t.as_deref())
    }
}

/// Channel permission toggled by overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// See the channel
    ViewChannel,
    /// Post in the channel
    SendMessages,
}

/// Who a permission overwrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverwriteTarget {
    /// A role (the guild id targets `@everyone`)
    Role(RoleId),
    /// A single member
    Member(UserId),
}

/// A channel-level permission overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionOverwrite {
    /// Target of the overwrite
    pub target: OverwriteTarget,
    /// Explicitly allowed permissions
    pub allow: Vec<Permission>,
    /// Explicitly denied permissions
    pub deny: Vec<Permission>,
}

/// Parameters for creating a private text channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Channel name
    pub name: String,
    /// Parent category
    pub category: Option<ChannelId>,
    /// Overwrites applied at creation
    pub overwrites: Vec<PermissionOverwrite>,
}

/// A non-bot message observed in a guild channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Message identity
    pub id: MessageId,
    /// Channel it was posted in
    pub channel: ChannelId,
    /// Author identity
    pub author: UserId,
    /// Author tag, as recorded in transcripts
    pub author_tag: String,
    /// Author is a bot
    pub author_bot: bool,
    /// Text content
    pub content: String,
    /// Creation time
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Inbound capability the moderation core depends on.
///
/// Implementations map "does not exist" to `Ok(None)` where the signature
/// allows it and every other failure to a [`PlatformError`](federal_error::PlatformError).
#[async_trait]
pub trait Platform: Send + Sync {
    /// Identity of the bot account.
    fn bot_id(&self) -> UserId;

    /// Fetch a current guild member.
    async fn member(&self, user: UserId) -> PlatformResult<Option<Member>>;

    /// All current guild members.
    async fn members(&self) -> PlatformResult<Vec<Member>>;

    /// Fetch a user account.
    async fn user(&self, user: UserId) -> PlatformResult<Option<User>>;

    /// Messages pinned in `channel`.
    async fn pinned_messages(&self, channel: ChannelId) -> PlatformResult<Vec<PostedMessage>>;

    /// Send a message and return its id.
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> PlatformResult<MessageId>;

    /// Replace the content of a message.
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        edit: OutgoingMessage,
    ) -> PlatformResult<()>;

    /// Delete a message.
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()>;

    /// Pin a message.
    async fn pin_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()>;

    /// Create a text channel.
    async fn create_channel(&self, spec: ChannelSpec) -> PlatformResult<ChannelId>;

    /// Delete a channel.
    async fn delete_channel(&self, channel: ChannelId) -> PlatformResult<()>;

    /// Whether `user` has a member overwrite allowing them to view `channel`.
    async fn member_can_view(&self, channel: ChannelId, user: UserId) -> PlatformResult<bool>;

    /// Set the member overwrite for `user` on `channel`.
    async fn set_member_overwrite(
        &self,
        channel: ChannelId,
        user: UserId,
        allow: Vec<Permission>,
        deny: Vec<Permission>,
    ) -> PlatformResult<()>;

    /// Remove the member overwrite for `user` on `channel`.
    async fn clear_member_overwrite(&self, channel: ChannelId, user: UserId) -> PlatformResult<()>;

    /// Grant a role.
    async fn add_role(&self, user: UserId, role: RoleId, reason: &str) -> PlatformResult<()>;

    /// Revoke a role.
    async fn remove_role(&self, user: UserId, role: RoleId, reason: &str) -> PlatformResult<()>;

    /// Deliver a direct message.
    async fn send_direct(&self, user: UserId, message: OutgoingMessage) -> PlatformResult<()>;

    /// Send an ephemeral follow-up to an already acknowledged interaction.
    async fn follow_up(&self, interaction_token: &str, content: &str) -> PlatformResult<()>;
}
