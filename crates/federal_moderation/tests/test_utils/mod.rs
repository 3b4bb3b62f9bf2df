//! Shared fixtures for moderation integration tests.

#![allow(dead_code)]

use chrono::Utc;
use federal_moderation::config::ModerationConfig;
use federal_moderation::interaction::{ActorPermissions, Interaction, InteractionKind};
use federal_moderation::platform::{IncomingMessage, Member};
use federal_moderation::testing::{MockPlatform, sample_config};
use federal_moderation::{ChannelId, MessageId, RoleId};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

/// Mock guild with every configured channel created and records stored in a
/// temporary directory.
pub struct Guild {
    pub dir: TempDir,
    pub platform: Arc<MockPlatform>,
    pub config: ModerationConfig,
}

impl Guild {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = sample_config(dir.path().join("banco"));
        let platform = Arc::new(MockPlatform::new());
        for channel in [
            config.punishments.panel_channel,
            config.punishments.log_channel,
            config.blacklist.panel_channel,
            config.tickets.desk_channel,
            config.tickets.log_channel,
            config.access.panel_channel,
            config.access.announced_channel,
        ] {
            platform.add_channel(channel);
        }
        Self {
            dir,
            platform,
            config,
        }
    }

    pub fn staff_role(&self) -> RoleId {
        self.config.guild.staff_role
    }

    /// Add a member holding `roles`.
    pub fn member(&self, id: u64, name: &str, roles: &[RoleId]) -> Member {
        let mut member = federal_moderation::testing::member(id, name);
        member.roles = roles.to_vec();
        self.platform.add_member(member.clone());
        member
    }
}

pub fn interaction(actor: &Member, channel: ChannelId, kind: InteractionKind) -> Interaction {
    Interaction {
        kind,
        user: actor.id,
        username: actor.username.clone(),
        user_tag: actor.tag.clone(),
        roles: actor.roles.clone(),
        permissions: ActorPermissions::default(),
        channel,
        token: format!("token-{}", actor.id),
    }
}

pub fn command(actor: &Member, channel: ChannelId, name: &str) -> Interaction {
    interaction(
        actor,
        channel,
        InteractionKind::Command {
            name: name.to_string(),
        },
    )
}

pub fn button(actor: &Member, channel: ChannelId, custom_id: &str) -> Interaction {
    interaction(
        actor,
        channel,
        InteractionKind::Button {
            custom_id: custom_id.to_string(),
        },
    )
}

pub fn select(actor: &Member, channel: ChannelId, custom_id: &str, value: &str) -> Interaction {
    interaction(
        actor,
        channel,
        InteractionKind::Select {
            custom_id: custom_id.to_string(),
            values: vec![value.to_string()],
        },
    )
}

pub fn modal(
    actor: &Member,
    channel: ChannelId,
    custom_id: &str,
    fields: &[(&str, &str)],
) -> Interaction {
    interaction(
        actor,
        channel,
        InteractionKind::Modal {
            custom_id: custom_id.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        },
    )
}

/// Grant Manage Roles to an interaction.
pub fn with_manage_roles(mut interaction: Interaction) -> Interaction {
    interaction.permissions.manage_roles = true;
    interaction
}

/// Grant Administrator to an interaction.
pub fn with_admin(mut interaction: Interaction) -> Interaction {
    interaction.permissions.administrator = true;
    interaction
}

pub fn message(author: &Member, channel: ChannelId, content: &str) -> IncomingMessage {
    IncomingMessage {
        id: MessageId(1),
        channel,
        author: author.id,
        author_tag: author.tag.clone(),
        author_bot: author.bot,
        content: content.to_string(),
        timestamp: Utc::now(),
    }
}
