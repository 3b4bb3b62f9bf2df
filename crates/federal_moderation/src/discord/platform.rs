//! [`Platform`] implementation over serenity's HTTP client.

use super::conversions::{self, snowflake};
use crate::ids::{ChannelId, GuildId, MessageId, RoleId, UserId};
use crate::message::OutgoingMessage;
use crate::platform::{
    ChannelSpec, Member, OverwriteTarget, Permission, Platform, PostedMessage, User,
};
use async_trait::async_trait;
use federal_error::{PlatformError, PlatformResult};
use serenity::all as sy;
use serenity::http::Http;
use std::sync::Arc;
use tracing::{debug, instrument};

const MEMBER_PAGE: u64 = 1000;

/// Serenity-backed platform bound to one guild.
pub struct SerenityPlatform {
    http: Arc<Http>,
    guild: sy::GuildId,
    bot: UserId,
}

impl SerenityPlatform {
    /// Bind to `guild` acting as the bot account `bot`.
    pub fn new(http: Arc<Http>, guild: GuildId, bot: UserId) -> PlatformResult<Self> {
        Ok(Self {
            http,
            guild: snowflake("connect", guild.get())?,
            bot,
        })
    }
}

fn failed(operation: &str) -> impl FnOnce(serenity::Error) -> PlatformError + '_ {
    move |e| PlatformError::new(operation, e.to_string())
}

fn is_not_found(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Http(e) => e.status_code().is_some_and(|s| s.as_u16() == 404),
        _ => false,
    }
}

/// Map a 404 to `None` and any other failure to a [`PlatformError`].
fn optional<T>(operation: &str, result: serenity::Result<T>) -> PlatformResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_not_found(&e) => Ok(None),
        Err(e) => Err(PlatformError::new(operation, e.to_string())),
    }
}

#[async_trait]
impl Platform for SerenityPlatform {
    fn bot_id(&self) -> UserId {
        self.bot
    }

    #[instrument(skip(self))]
    async fn member(&self, user: UserId) -> PlatformResult<Option<Member>> {
        let id: sy::UserId = snowflake("member", user.get())?;
        let found = optional("member", self.guild.member(&self.http, id).await)?;
        Ok(found.map(|m| conversions::member(&m)))
    }

    #[instrument(skip(self))]
    async fn members(&self) -> PlatformResult<Vec<Member>> {
        let mut all = Vec::new();
        let mut after: Option<sy::UserId> = None;
        loop {
            let page = self
                .guild
                .members(&self.http, Some(MEMBER_PAGE), after)
                .await
                .map_err(failed("members"))?;
            let full = page.len() as u64 == MEMBER_PAGE;
            after = page.last().map(|m| m.user.id);
            all.extend(page.iter().map(conversions::member));
            if !full {
                break;
            }
        }
        debug!(count = all.len(), "Fetched guild members");
        Ok(all)
    }

    #[instrument(skip(self))]
    async fn user(&self, user: UserId) -> PlatformResult<Option<User>> {
        let id: sy::UserId = snowflake("user", user.get())?;
        let found = optional("user", id.to_user(&self.http).await)?;
        Ok(found.map(|u| conversions::user(&u)))
    }

    #[instrument(skip(self))]
    async fn pinned_messages(&self, channel: ChannelId) -> PlatformResult<Vec<PostedMessage>> {
        let id: sy::ChannelId = snowflake("pinned_messages", channel.get())?;
        let pins = id.pins(&self.http).await.map_err(failed("pinned_messages"))?;
        Ok(pins.iter().map(conversions::posted).collect())
    }

    #[instrument(skip(self, message))]
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> PlatformResult<MessageId> {
        let id: sy::ChannelId = snowflake("send_message", channel.get())?;
        let sent = id
            .send_message(&self.http, conversions::create_message(&message))
            .await
            .map_err(failed("send_message"))?;
        Ok(MessageId(sent.id.get()))
    }

    #[instrument(skip(self, edit))]
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        edit: OutgoingMessage,
    ) -> PlatformResult<()> {
        let id: sy::ChannelId = snowflake("edit_message", channel.get())?;
        let message: sy::MessageId = snowflake("edit_message", message.get())?;
        id.edit_message(&self.http, message, conversions::edit_message(&edit))
            .await
            .map_err(failed("edit_message"))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()> {
        let id: sy::ChannelId = snowflake("delete_message", channel.get())?;
        let message: sy::MessageId = snowflake("delete_message", message.get())?;
        id.delete_message(&self.http, message)
            .await
            .map_err(failed("delete_message"))
    }

    #[instrument(skip(self))]
    async fn pin_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()> {
        let id: sy::ChannelId = snowflake("pin_message", channel.get())?;
        let message: sy::MessageId = snowflake("pin_message", message.get())?;
        id.pin(&self.http, message).await.map_err(failed("pin_message"))
    }

    #[instrument(skip(self, spec), fields(name = %spec.name))]
    async fn create_channel(&self, spec: ChannelSpec) -> PlatformResult<ChannelId> {
        let mut overwrites = Vec::with_capacity(spec.overwrites.len());
        for overwrite in &spec.overwrites {
            let kind = match overwrite.target {
                OverwriteTarget::Role(role) => {
                    sy::PermissionOverwriteType::Role(snowflake("create_channel", role.get())?)
                }
                OverwriteTarget::Member(user) => {
                    sy::PermissionOverwriteType::Member(snowflake("create_channel", user.get())?)
                }
            };
            overwrites.push(sy::PermissionOverwrite {
                allow: conversions::permissions(&overwrite.allow),
                deny: conversions::permissions(&overwrite.deny),
                kind,
            });
        }
        let mut builder = sy::CreateChannel::new(spec.name)
            .kind(sy::ChannelType::Text)
            .permissions(overwrites);
        if let Some(category) = spec.category {
            builder = builder.category(snowflake::<sy::ChannelId>("create_channel", category.get())?);
        }
        let created = self
            .guild
            .create_channel(&self.http, builder)
            .await
            .map_err(failed("create_channel"))?;
        Ok(ChannelId(created.id.get()))
    }

    #[instrument(skip(self))]
    async fn delete_channel(&self, channel: ChannelId) -> PlatformResult<()> {
        let id: sy::ChannelId = snowflake("delete_channel", channel.get())?;
        id.delete(&self.http).await.map_err(failed("delete_channel"))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn member_can_view(&self, channel: ChannelId, user: UserId) -> PlatformResult<bool> {
        let id: sy::ChannelId = snowflake("member_can_view", channel.get())?;
        let member: sy::UserId = snowflake("member_can_view", user.get())?;
        let resolved = id
            .to_channel(&self.http)
            .await
            .map_err(failed("member_can_view"))?;
        let Some(guild_channel) = resolved.guild() else {
            return Ok(false);
        };
        Ok(guild_channel.permission_overwrites.iter().any(|o| {
            o.kind == sy::PermissionOverwriteType::Member(member)
                && o.allow.contains(sy::Permissions::VIEW_CHANNEL)
        }))
    }

    #[instrument(skip(self))]
    async fn set_member_overwrite(
        &self,
        channel: ChannelId,
        user: UserId,
        allow: Vec<Permission>,
        deny: Vec<Permission>,
    ) -> PlatformResult<()> {
        let id: sy::ChannelId = snowflake("set_member_overwrite", channel.get())?;
        let member: sy::UserId = snowflake("set_member_overwrite", user.get())?;
        id.create_permission(
            &self.http,
            sy::PermissionOverwrite {
                allow: conversions::permissions(&allow),
                deny: conversions::permissions(&deny),
                kind: sy::PermissionOverwriteType::Member(member),
            },
        )
        .await
        .map_err(failed("set_member_overwrite"))
    }

    #[instrument(skip(self))]
    async fn clear_member_overwrite(&self, channel: ChannelId, user: UserId) -> PlatformResult<()> {
        let id: sy::ChannelId = snowflake("clear_member_overwrite", channel.get())?;
        let member: sy::UserId = snowflake("clear_member_overwrite", user.get())?;
        id.delete_permission(&self.http, sy::PermissionOverwriteType::Member(member))
            .await
            .map_err(failed("clear_member_overwrite"))
    }

    #[instrument(skip(self))]
    async fn add_role(&self, user: UserId, role: RoleId, reason: &str) -> PlatformResult<()> {
        let member: sy::UserId = snowflake("add_role", user.get())?;
        let role: sy::RoleId = snowflake("add_role", role.get())?;
        self.http
            .add_member_role(self.guild, member, role, Some(reason))
            .await
            .map_err(failed("add_role"))
    }

    #[instrument(skip(self))]
    async fn remove_role(&self, user: UserId, role: RoleId, reason: &str) -> PlatformResult<()> {
        let member: sy::UserId = snowflake("remove_role", user.get())?;
        let role: sy::RoleId = snowflake("remove_role", role.get())?;
        self.http
            .remove_member_role(self.guild, member, role, Some(reason))
            .await
            .map_err(failed("remove_role"))
    }

    #[instrument(skip(self, message))]
    async fn send_direct(&self, user: UserId, message: OutgoingMessage) -> PlatformResult<()> {
        let id: sy::UserId = snowflake("send_direct", user.get())?;
        id.direct_message(&self.http, conversions::create_message(&message))
            .await
            .map_err(failed("send_direct"))?;
        Ok(())
    }

    #[instrument(skip(self, interaction_token, content))]
    async fn follow_up(&self, interaction_token: &str, content: &str) -> PlatformResult<()> {
        let followup = sy::CreateInteractionResponseFollowup::new()
            .content(content)
            .ephemeral(true);
        self.http
            .create_followup_message(interaction_token, &followup, Vec::new())
            .await
            .map_err(failed("follow_up"))?;
        Ok(())
    }
}
