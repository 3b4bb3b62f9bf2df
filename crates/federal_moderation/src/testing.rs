//! In-memory platform double.
//!
//! `MockPlatform` keeps guild state (members, channels, messages, overwrites)
//! in memory and records every side effect so tests can assert on them.
//! Any operation can be made to fail with [`MockPlatform::fail`].

use crate::config::{
    AccessConfig, BlacklistConfig, EmbedConfig, GuildConfig, ModerationConfig, PunishmentConfig,
    PunishmentRoles, TicketConfig,
};
use crate::ids::{ChannelId, GuildId, MessageId, RoleId, UserId};
use crate::interaction::{Deferral, Reply, Responder, Response};
use crate::message::OutgoingMessage;
use crate::platform::{
    ChannelSpec, Member, OverwriteTarget, Permission, Platform, PostedMessage, User,
};
use async_trait::async_trait;
use federal_error::{PlatformError, PlatformResult};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

/// Bot identity used by [`MockPlatform::new`].
pub const BOT_ID: UserId = UserId(999);

/// A message stored by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockMessage {
    /// Message identity
    pub id: MessageId,
    /// Author
    pub author: UserId,
    /// Current content
    pub content: OutgoingMessage,
    /// Pinned flag
    pub pinned: bool,
}

/// A channel stored by the mock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockChannel {
    /// Channel name
    pub name: String,
    /// Parent category
    pub category: Option<ChannelId>,
    /// Member overwrites: (allow, deny)
    pub member_overwrites: HashMap<UserId, (Vec<Permission>, Vec<Permission>)>,
    /// Role overwrites: (allow, deny)
    pub role_overwrites: HashMap<RoleId, (Vec<Permission>, Vec<Permission>)>,
    /// Messages in send order
    pub messages: Vec<MockMessage>,
}

/// A recorded role change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    /// Role granted
    Added(UserId, RoleId),
    /// Role revoked
    Removed(UserId, RoleId),
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    members: Vec<Member>,
    users: HashMap<UserId, User>,
    channels: BTreeMap<ChannelId, MockChannel>,
    deleted_channels: Vec<ChannelId>,
    direct_messages: Vec<(UserId, OutgoingMessage)>,
    follow_ups: Vec<(String, String)>,
    role_changes: Vec<RoleChange>,
    failing: HashSet<String>,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check(&self, operation: &str) -> PlatformResult<()> {
        if self.failing.contains(operation) {
            return Err(PlatformError::new(operation, "injected failure"));
        }
        Ok(())
    }

    fn channel_mut(&mut self, channel: ChannelId) -> PlatformResult<&mut MockChannel> {
        self.channels
            .get_mut(&channel)
            .ok_or_else(|| PlatformError::new("channel", format!("Unknown Channel {channel}")))
    }

    fn member_mut(&mut self, user: UserId) -> PlatformResult<&mut Member> {
        self.members
            .iter_mut()
            .find(|m| m.id == user)
            .ok_or_else(|| PlatformError::new("member", format!("Unknown Member {user}")))
    }
}

/// In-memory [`Platform`] implementation.
#[derive(Debug)]
pub struct MockPlatform {
    bot: UserId,
    state: Mutex<MockState>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// Empty guild with bot identity [`BOT_ID`].
    pub fn new() -> Self {
        Self {
            bot: BOT_ID,
            state: Mutex::new(MockState {
                next_id: 10_000,
                ..MockState::default()
            }),
        }
    }

    /// Add a guild member (and the matching user account).
    pub fn add_member(&self, member: Member) {
        let mut state = self.state.lock();
        state.users.insert(
            member.id,
            User {
                id: member.id,
                username: member.username.clone(),
                tag: member.tag.clone(),
            },
        );
        state.members.retain(|m| m.id != member.id);
        state.members.push(member);
    }

    /// Remove a member from the guild; the user account stays fetchable.
    pub fn kick(&self, user: UserId) {
        self.state.lock().members.retain(|m| m.id != user);
    }

    /// Create an empty channel with a known id.
    pub fn add_channel(&self, channel: ChannelId) {
        self.state.lock().channels.entry(channel).or_default();
    }

    /// Make every later call of `operation` fail.
    pub fn fail(&self, operation: &str) {
        self.state.lock().failing.insert(operation.to_string());
    }

    /// Stop failing `operation`.
    pub fn recover(&self, operation: &str) {
        self.state.lock().failing.remove(operation);
    }

    /// Current member snapshot.
    pub fn member_snapshot(&self, user: UserId) -> Option<Member> {
        self.state.lock().members.iter().find(|m| m.id == user).cloned()
    }

    /// Roles currently held by `user`.
    pub fn roles_of(&self, user: UserId) -> Vec<RoleId> {
        self.member_snapshot(user).map(|m| m.roles).unwrap_or_default()
    }

    /// Messages in `channel`, in send order.
    pub fn messages(&self, channel: ChannelId) -> Vec<MockMessage> {
        self.state
            .lock()
            .channels
            .get(&channel)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Pinned messages in `channel`.
    pub fn pinned(&self, channel: ChannelId) -> Vec<MockMessage> {
        self.messages(channel).into_iter().filter(|m| m.pinned).collect()
    }

    /// Snapshot of a channel.
    pub fn channel(&self, channel: ChannelId) -> Option<MockChannel> {
        self.state.lock().channels.get(&channel).cloned()
    }

    /// Whether `channel` currently exists.
    pub fn channel_exists(&self, channel: ChannelId) -> bool {
        self.state.lock().channels.contains_key(&channel)
    }

    /// Channels deleted so far.
    pub fn deleted_channels(&self) -> Vec<ChannelId> {
        self.state.lock().deleted_channels.clone()
    }

    /// Channels created under `category`.
    pub fn channels_in(&self, category: ChannelId) -> Vec<ChannelId> {
        self.state
            .lock()
            .channels
            .iter()
            .filter(|(_, c)| c.category == Some(category))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Direct messages delivered to `user`.
    pub fn direct_messages(&self, user: UserId) -> Vec<OutgoingMessage> {
        self.state
            .lock()
            .direct_messages
            .iter()
            .filter(|(to, _)| *to == user)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Follow-ups sent, as (interaction token, content).
    pub fn follow_ups(&self) -> Vec<(String, String)> {
        self.state.lock().follow_ups.clone()
    }

    /// Every role change, in order.
    pub fn role_changes(&self) -> Vec<RoleChange> {
        self.state.lock().role_changes.clone()
    }
}

/// An acknowledgement recorded by [`RecordingResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Deferred before handling
    Deferred(Deferral),
    /// Answered directly
    Responded(Response),
    /// Deferred acknowledgement replaced
    Edited(Reply),
}

/// Responder that records acknowledgements in delivery order.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    log: Mutex<Vec<Acknowledgement>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingResponder {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acknowledgements so far.
    pub fn acknowledgements(&self) -> Vec<Acknowledgement> {
        self.log.lock().clone()
    }

    /// Make every later call of `operation` (`defer`, `respond`,
    /// `edit_original`) fail.
    pub fn fail(&self, operation: &str) {
        self.failing.lock().insert(operation.to_string());
    }

    fn record(&self, operation: &str, ack: Acknowledgement) -> PlatformResult<()> {
        if self.failing.lock().contains(operation) {
            return Err(PlatformError::new(operation, "injected failure"));
        }
        self.log.lock().push(ack);
        Ok(())
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn defer(&self, deferral: Deferral) -> PlatformResult<()> {
        self.record("defer", Acknowledgement::Deferred(deferral))
    }

    async fn respond(&self, response: &Response) -> PlatformResult<()> {
        self.record("respond", Acknowledgement::Responded(response.clone()))
    }

    async fn edit_original(&self, reply: &Reply) -> PlatformResult<()> {
        self.record("edit_original", Acknowledgement::Edited(reply.clone()))
    }
}

/// Configuration with small fixed ids, storing records under `data_dir`.
///
/// | Setting | Id |
/// |---------|----|
/// | guild / staff role | 1 / 10 |
/// | punishment panel / log | 100 / 101 |
/// | leve / media / grave / exoneração roles | 21 / 22 / 23 / 24 |
/// | blacklist panel | 110 |
/// | ticket desk / category / log | 120 / 121 / 122 |
/// | access panel / role / announced channel | 130 / 31 / 131 |
pub fn sample_config(data_dir: impl Into<PathBuf>) -> ModerationConfig {
    ModerationConfig {
        guild: GuildConfig {
            guild_id: GuildId::from(1),
            staff_role: RoleId::from(10),
            data_dir: data_dir.into(),
        },
        punishments: PunishmentConfig {
            panel_channel: ChannelId::from(100),
            log_channel: ChannelId::from(101),
            roles: PunishmentRoles {
                leve: RoleId::from(21),
                media: RoleId::from(22),
                grave: RoleId::from(23),
                exoneracao: RoleId::from(24),
            },
            image_url: None,
        },
        blacklist: BlacklistConfig {
            panel_channel: ChannelId::from(110),
            image_url: None,
        },
        tickets: TicketConfig {
            desk_channel: ChannelId::from(120),
            category: ChannelId::from(121),
            log_channel: ChannelId::from(122),
            close_delay_secs: 10,
            image_url: None,
        },
        access: AccessConfig {
            panel_channel: ChannelId::from(130),
            role: RoleId::from(31),
            announced_channel: ChannelId::from(131),
            image_url: None,
        },
        embeds: EmbedConfig::default(),
    }
}

/// A non-bot member with identical handle, tag and display name.
pub fn member(id: u64, name: &str) -> Member {
    Member {
        id: UserId(id),
        username: name.to_lowercase(),
        display_name: name.to_string(),
        nickname: None,
        tag: name.to_lowercase(),
        roles: Vec::new(),
        bot: false,
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn bot_id(&self) -> UserId {
        self.bot
    }

    async fn member(&self, user: UserId) -> PlatformResult<Option<Member>> {
        let state = self.state.lock();
        state.check("member")?;
        Ok(state.members.iter().find(|m| m.id == user).cloned())
    }

    async fn members(&self) -> PlatformResult<Vec<Member>> {
        let state = self.state.lock();
        state.check("members")?;
        Ok(state.members.clone())
    }

    async fn user(&self, user: UserId) -> PlatformResult<Option<User>> {
        let state = self.state.lock();
        state.check("user")?;
        Ok(state.users.get(&user).cloned())
    }

    async fn pinned_messages(&self, channel: ChannelId) -> PlatformResult<Vec<PostedMessage>> {
        let mut state = self.state.lock();
        state.check("pinned_messages")?;
        let channel = state.channel_mut(channel)?;
        Ok(channel
            .messages
            .iter()
            .filter(|m| m.pinned)
            .map(|m| PostedMessage {
                id: m.id,
                author: m.author,
                embed_titles: m.content.embeds.iter().map(|e| e.title.clone()).collect(),
            })
            .collect())
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> PlatformResult<MessageId> {
        let mut state = self.state.lock();
        state.check("send_message")?;
        let id = MessageId(state.next_id());
        let author = self.bot;
        state.channel_mut(channel)?.messages.push(MockMessage {
            id,
            author,
            content: message,
            pinned: false,
        });
        Ok(id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        edit: OutgoingMessage,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("edit_message")?;
        let stored = state
            .channel_mut(channel)?
            .messages
            .iter_mut()
            .find(|m| m.id == message)
            .ok_or_else(|| PlatformError::new("edit_message", "Unknown Message"))?;
        stored.content = edit;
        Ok(())
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("delete_message")?;
        let messages = &mut state.channel_mut(channel)?.messages;
        let before = messages.len();
        messages.retain(|m| m.id != message);
        if messages.len() == before {
            return Err(PlatformError::new("delete_message", "Unknown Message"));
        }
        Ok(())
    }

    async fn pin_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("pin_message")?;
        let stored = state
            .channel_mut(channel)?
            .messages
            .iter_mut()
            .find(|m| m.id == message)
            .ok_or_else(|| PlatformError::new("pin_message", "Unknown Message"))?;
        stored.pinned = true;
        Ok(())
    }

    async fn create_channel(&self, spec: ChannelSpec) -> PlatformResult<ChannelId> {
        let mut state = self.state.lock();
        state.check("create_channel")?;
        let id = ChannelId(state.next_id());
        let mut channel = MockChannel {
            name: spec.name,
            category: spec.category,
            ..MockChannel::default()
        };
        for overwrite in spec.overwrites {
            let entry = (overwrite.allow, overwrite.deny);
            match overwrite.target {
                OverwriteTarget::Member(user) => {
                    channel.member_overwrites.insert(user, entry);
                }
                OverwriteTarget::Role(role) => {
                    channel.role_overwrites.insert(role, entry);
                }
            }
        }
        state.channels.insert(id, channel);
        Ok(id)
    }

    async fn delete_channel(&self, channel: ChannelId) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("delete_channel")?;
        if state.channels.remove(&channel).is_none() {
            return Err(PlatformError::new("delete_channel", "Unknown Channel"));
        }
        state.deleted_channels.push(channel);
        Ok(())
    }

    async fn member_can_view(&self, channel: ChannelId, user: UserId) -> PlatformResult<bool> {
        let mut state = self.state.lock();
        state.check("member_can_view")?;
        Ok(state
            .channel_mut(channel)?
            .member_overwrites
            .get(&user)
            .is_some_and(|(allow, _)| allow.contains(&Permission::ViewChannel)))
    }

    async fn set_member_overwrite(
        &self,
        channel: ChannelId,
        user: UserId,
        allow: Vec<Permission>,
        deny: Vec<Permission>,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("set_member_overwrite")?;
        state
            .channel_mut(channel)?
            .member_overwrites
            .insert(user, (allow, deny));
        Ok(())
    }

    async fn clear_member_overwrite(&self, channel: ChannelId, user: UserId) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("clear_member_overwrite")?;
        state.channel_mut(channel)?.member_overwrites.remove(&user);
        Ok(())
    }

    async fn add_role(&self, user: UserId, role: RoleId, _reason: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("add_role")?;
        let member = state.member_mut(user)?;
        if !member.roles.contains(&role) {
            member.roles.push(role);
        }
        state.role_changes.push(RoleChange::Added(user, role));
        Ok(())
    }

    async fn remove_role(&self, user: UserId, role: RoleId, _reason: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("remove_role")?;
        state.member_mut(user)?.roles.retain(|r| *r != role);
        state.role_changes.push(RoleChange::Removed(user, role));
        Ok(())
    }

    async fn send_direct(&self, user: UserId, message: OutgoingMessage) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("send_direct")?;
        state.direct_messages.push((user, message));
        Ok(())
    }

    async fn follow_up(&self, interaction_token: &str, content: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("follow_up")?;
        state
            .follow_ups
            .push((interaction_token.to_string(), content.to_string()));
        Ok(())
    }
}
