//! Conversions between serenity models and the moderation core types.

use crate::ids::{ChannelId, MessageId, RoleId, UserId};
use crate::interaction::{
    ActorPermissions, Deferral, InputStyle, Interaction, InteractionKind, Modal, Reply, Response,
};
use crate::message::{ButtonStyle, ComponentRow, Embed, OutgoingMessage};
use crate::platform::{IncomingMessage, Member, Permission, PostedMessage, User};
use chrono::{DateTime, Utc};
use federal_error::{PlatformError, PlatformResult};
use serenity::all as sy;
use std::collections::HashMap;
use std::num::NonZeroU64;

/// Convert a raw snowflake into a serenity id. Zero is not a valid snowflake.
pub fn snowflake<T: From<NonZeroU64>>(operation: &str, raw: u64) -> PlatformResult<T> {
    NonZeroU64::new(raw)
        .map(T::from)
        .ok_or_else(|| PlatformError::new(operation, "zero is not a valid snowflake"))
}

/// Legacy `name#discriminator` tag, or the handle for migrated accounts.
pub fn user_tag(user: &sy::User) -> String {
    user.tag()
}

/// Core view of a guild member.
pub fn member(member: &sy::Member) -> Member {
    Member {
        id: UserId(member.user.id.get()),
        username: member.user.name.clone(),
        display_name: member.display_name().to_string(),
        nickname: member.nick.clone(),
        tag: user_tag(&member.user),
        roles: member.roles.iter().map(|r| RoleId(r.get())).collect(),
        bot: member.user.bot,
    }
}

/// Core view of a user account.
pub fn user(user: &sy::User) -> User {
    User {
        id: UserId(user.id.get()),
        username: user.name.clone(),
        tag: user_tag(user),
    }
}

/// Core view of a posted message.
pub fn posted(message: &sy::Message) -> PostedMessage {
    PostedMessage {
        id: MessageId(message.id.get()),
        author: UserId(message.author.id.get()),
        embed_titles: message.embeds.iter().map(|e| e.title.clone()).collect(),
    }
}

fn timestamp(ts: &sy::Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or_else(Utc::now)
}

/// Core view of a guild message.
pub fn incoming(message: &sy::Message) -> IncomingMessage {
    IncomingMessage {
        id: MessageId(message.id.get()),
        channel: ChannelId(message.channel_id.get()),
        author: UserId(message.author.id.get()),
        author_tag: user_tag(&message.author),
        author_bot: message.author.bot,
        content: message.content.clone(),
        timestamp: timestamp(&message.timestamp),
    }
}

/// Serenity permission bits for core permissions.
pub fn permissions(list: &[Permission]) -> sy::Permissions {
    list.iter().fold(sy::Permissions::empty(), |acc, p| {
        acc | match p {
            Permission::ViewChannel => sy::Permissions::VIEW_CHANNEL,
            Permission::SendMessages => sy::Permissions::SEND_MESSAGES,
        }
    })
}

fn actor_permissions(member: Option<&sy::Member>) -> ActorPermissions {
    member
        .and_then(|m| m.permissions)
        .map(|p| ActorPermissions {
            administrator: p.administrator(),
            manage_roles: p.administrator() || p.manage_roles(),
        })
        .unwrap_or_default()
}

fn base_interaction(
    kind: InteractionKind,
    user: &sy::User,
    member: Option<&sy::Member>,
    channel: sy::ChannelId,
    token: &str,
) -> Interaction {
    Interaction {
        kind,
        user: UserId(user.id.get()),
        username: user.name.clone(),
        user_tag: user_tag(user),
        roles: member
            .map(|m| m.roles.iter().map(|r| RoleId(r.get())).collect())
            .unwrap_or_default(),
        permissions: actor_permissions(member),
        channel: ChannelId(channel.get()),
        token: token.to_string(),
    }
}

/// Core view of a gateway interaction. Pings and autocomplete are ignored.
pub fn interaction(interaction: &sy::Interaction) -> Option<Interaction> {
    match interaction {
        sy::Interaction::Command(command) => Some(base_interaction(
            InteractionKind::Command {
                name: command.data.name.clone(),
            },
            &command.user,
            command.member.as_deref(),
            command.channel_id,
            &command.token,
        )),
        sy::Interaction::Component(component) => {
            let custom_id = component.data.custom_id.clone();
            let kind = match &component.data.kind {
                sy::ComponentInteractionDataKind::Button => InteractionKind::Button { custom_id },
                sy::ComponentInteractionDataKind::StringSelect { values } => {
                    InteractionKind::Select {
                        custom_id,
                        values: values.clone(),
                    }
                }
                _ => return None,
            };
            Some(base_interaction(
                kind,
                &component.user,
                component.member.as_ref(),
                component.channel_id,
                &component.token,
            ))
        }
        sy::Interaction::Modal(modal) => {
            let fields: HashMap<String, String> = modal
                .data
                .components
                .iter()
                .flat_map(|row| row.components.iter())
                .filter_map(|component| match component {
                    sy::ActionRowComponent::InputText(input) => Some((
                        input.custom_id.clone(),
                        input.value.clone().unwrap_or_default(),
                    )),
                    _ => None,
                })
                .collect();
            Some(base_interaction(
                InteractionKind::Modal {
                    custom_id: modal.data.custom_id.clone(),
                    fields,
                },
                &modal.user,
                modal.member.as_ref(),
                modal.channel_id,
                &modal.token,
            ))
        }
        _ => None,
    }
}

/// Serenity embed builder for a core embed.
pub fn embed(embed: &Embed) -> sy::CreateEmbed {
    let mut out = sy::CreateEmbed::new();
    if let Some(title) = &embed.title {
        out = out.title(title);
    }
    if let Some(description) = &embed.description {
        out = out.description(description);
    }
    if let Some(color) = embed.color {
        out = out.colour(color);
    }
    if let Some(image) = &embed.image {
        out = out.image(image);
    }
    if let Some(thumbnail) = &embed.thumbnail {
        out = out.thumbnail(thumbnail);
    }
    if let Some(footer) = &embed.footer {
        out = out.footer(sy::CreateEmbedFooter::new(footer));
    }
    if let Some(ts) = embed
        .timestamp
        .and_then(|t| sy::Timestamp::from_unix_timestamp(t.timestamp()).ok())
    {
        out = out.timestamp(ts);
    }
    for field in &embed.fields {
        out = out.field(&field.name, &field.value, field.inline);
    }
    out
}

fn button_style(style: ButtonStyle) -> sy::ButtonStyle {
    match style {
        ButtonStyle::Primary => sy::ButtonStyle::Primary,
        ButtonStyle::Secondary => sy::ButtonStyle::Secondary,
        ButtonStyle::Success => sy::ButtonStyle::Success,
        ButtonStyle::Danger => sy::ButtonStyle::Danger,
    }
}

/// Serenity action row for a core component row.
pub fn action_row(row: &ComponentRow) -> sy::CreateActionRow {
    match row {
        ComponentRow::Buttons(buttons) => sy::CreateActionRow::Buttons(
            buttons
                .iter()
                .map(|b| {
                    let button = sy::CreateButton::new(&b.custom_id)
                        .label(&b.label)
                        .style(button_style(b.style));
                    match &b.emoji {
                        Some(emoji) => button.emoji(sy::ReactionType::Unicode(emoji.clone())),
                        None => button,
                    }
                })
                .collect(),
        ),
        ComponentRow::Select(menu) => {
            let options = menu
                .options
                .iter()
                .map(|o| {
                    let option = sy::CreateSelectMenuOption::new(&o.label, &o.value);
                    match &o.description {
                        Some(description) => option.description(description),
                        None => option,
                    }
                })
                .collect();
            sy::CreateActionRow::SelectMenu(
                sy::CreateSelectMenu::new(
                    &menu.custom_id,
                    sy::CreateSelectMenuKind::String { options },
                )
                .placeholder(&menu.placeholder),
            )
        }
    }
}

/// Serenity builder for a new message.
pub fn create_message(message: &OutgoingMessage) -> sy::CreateMessage {
    let mut out = sy::CreateMessage::new()
        .embeds(message.embeds.iter().map(embed).collect())
        .components(message.components.iter().map(action_row).collect());
    if let Some(content) = &message.content {
        out = out.content(content);
    }
    for attachment in &message.attachments {
        out = out.add_file(sy::CreateAttachment::bytes(
            attachment.data.clone(),
            attachment.filename.clone(),
        ));
    }
    out
}

/// Serenity builder replacing a message's content.
pub fn edit_message(message: &OutgoingMessage) -> sy::EditMessage {
    let out = sy::EditMessage::new()
        .embeds(message.embeds.iter().map(embed).collect())
        .components(message.components.iter().map(action_row).collect());
    match &message.content {
        Some(content) => out.content(content),
        None => out,
    }
}

fn response_message(reply: &Reply) -> sy::CreateInteractionResponseMessage {
    sy::CreateInteractionResponseMessage::new()
        .content(&reply.content)
        .ephemeral(reply.ephemeral)
        .embeds(reply.embeds.iter().map(embed).collect())
        .components(reply.components.iter().map(action_row).collect())
}

fn modal(modal: &Modal) -> sy::CreateModal {
    let rows = modal
        .inputs
        .iter()
        .map(|input| {
            let style = match input.style {
                InputStyle::Short => sy::InputTextStyle::Short,
                InputStyle::Paragraph => sy::InputTextStyle::Paragraph,
            };
            let mut text = sy::CreateInputText::new(style, &input.label, &input.custom_id)
                .required(input.required);
            if let Some(value) = &input.value {
                text = text.value(value);
            }
            if let Some(placeholder) = &input.placeholder {
                text = text.placeholder(placeholder);
            }
            sy::CreateActionRow::InputText(text)
        })
        .collect();
    sy::CreateModal::new(&modal.custom_id, &modal.title).components(rows)
}

/// Serenity builder for the single acknowledgement of an interaction.
pub fn response(response: &Response) -> sy::CreateInteractionResponse {
    match response {
        Response::Message(reply) => sy::CreateInteractionResponse::Message(response_message(reply)),
        Response::Update(reply) => {
            sy::CreateInteractionResponse::UpdateMessage(response_message(reply))
        }
        Response::Modal(m) => sy::CreateInteractionResponse::Modal(modal(m)),
    }
}

/// Serenity builder for an early acknowledgement.
pub fn deferral(deferral: Deferral) -> sy::CreateInteractionResponse {
    match deferral {
        Deferral::Reply { ephemeral } => sy::CreateInteractionResponse::Defer(
            sy::CreateInteractionResponseMessage::new().ephemeral(ephemeral),
        ),
        Deferral::Update => sy::CreateInteractionResponse::Acknowledge,
    }
}

/// Serenity builder replacing a deferred acknowledgement.
pub fn edit_original(reply: &Reply) -> sy::EditInteractionResponse {
    sy::EditInteractionResponse::new()
        .content(&reply.content)
        .embeds(reply.embeds.iter().map(embed).collect())
        .components(reply.components.iter().map(action_row).collect())
}
