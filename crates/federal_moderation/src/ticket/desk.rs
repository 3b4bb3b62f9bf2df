use super::close::CloseScheduler;
use super::record::{Ticket, TicketCategory, TranscriptEntry, format_date, format_timestamp};
use crate::config::TicketConfig;
use crate::ids::{ChannelId, GuildId, RoleId, UserId};
use crate::message::{Button, ButtonStyle, ComponentRow, Embed, OutgoingMessage};
use crate::platform::{
    ChannelSpec, IncomingMessage, Member, OverwriteTarget, Permission, PermissionOverwrite,
    Platform,
};
use crate::resolver::resolve_member;
use chrono::Utc;
use federal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use federal_storage::JsonStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Ticket record file name inside the data directory.
pub const TICKETS_FILE: &str = "tickets.json";

/// Control-panel button ids posted in every ticket channel.
pub mod buttons {
    /// Close without reason
    pub const CLOSE: &str = "fechar_ticket";
    /// Close with a reason (staff)
    pub const CLOSE_WITH_REASON: &str = "fechar_ticket_motivo";
    /// Ping the owner
    pub const NOTIFY_OWNER: &str = "notificar_usuario";
    /// Ping the staff role
    pub const NOTIFY_STAFF: &str = "notificar_equipe";
    /// Grant a member access (staff)
    pub const ADD_MEMBER: &str = "adicionar_membro";
    /// Revoke a member's access (staff)
    pub const REMOVE_MEMBER: &str = "remover_membro";
}

/// Who triggered a close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closer {
    /// Identity
    pub id: UserId,
    /// Tag shown in the summary
    pub tag: String,
}

/// Result of a close trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Retirement scheduled after the close delay
    Scheduled,
    /// A retirement was already pending; nothing new was scheduled
    AlreadyPending,
}

/// Ticket lifecycle: `NONE → OPEN → CLOSING → removed`.
pub struct TicketDesk {
    store: JsonStore<BTreeMap<ChannelId, Ticket>>,
    platform: Arc<dyn Platform>,
    config: TicketConfig,
    guild: GuildId,
    staff_role: RoleId,
    scheduler: CloseScheduler,
}

fn ticket_not_found() -> ModerationError {
    ModerationError::new(ModerationErrorKind::NotFound(
        "O ticket não foi encontrado. Talvez já tenha sido fechado.".to_string(),
    ))
}

/// `<category>-<handle>` with the handle lowercased and stripped to `[a-z0-9]`.
pub fn channel_name(category: TicketCategory, username: &str) -> String {
    let handle: String = username
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    format!("{}-{}", category.tag(), handle)
}

impl TicketDesk {
    /// Create a desk persisting to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        platform: Arc<dyn Platform>,
        config: TicketConfig,
        guild: GuildId,
        staff_role: RoleId,
    ) -> Self {
        Self {
            store: JsonStore::new(path),
            platform,
            config,
            guild,
            staff_role,
            scheduler: CloseScheduler::new(),
        }
    }

    /// Desk configuration.
    pub fn config(&self) -> &TicketConfig {
        &self.config
    }

    /// Staff role allowed to manage tickets.
    pub fn staff_role(&self) -> RoleId {
        self.staff_role
    }

    /// Pending retirements.
    pub fn scheduler(&self) -> &CloseScheduler {
        &self.scheduler
    }

    /// The open ticket backed by `channel`.
    pub fn ticket(&self, channel: ChannelId) -> Option<Ticket> {
        self.store.load().remove(&channel)
    }

    /// Every open ticket.
    pub fn tickets(&self) -> Vec<Ticket> {
        self.store.load().into_values().collect()
    }

    /// Open a ticket for `owner`: create the private channel, write the record
    /// and post the control message.
    #[instrument(skip(self, owner, reason), fields(owner = %owner.id))]
    pub async fn open(
        &self,
        owner: &Member,
        category_tag: &str,
        reason: &str,
    ) -> ModerationResult<Ticket> {
        let category: TicketCategory = category_tag.parse().map_err(|_| {
            ModerationError::new(ModerationErrorKind::InvalidInput(
                "Tipo de atendimento inválido.".to_string(),
            ))
        })?;

        let access = vec![Permission::ViewChannel, Permission::SendMessages];
        let channel = self
            .platform
            .create_channel(ChannelSpec {
                name: channel_name(category, &owner.username),
                category: Some(self.config.category),
                overwrites: vec![
                    PermissionOverwrite {
                        target: OverwriteTarget::Role(self.guild.everyone_role()),
                        allow: Vec::new(),
                        deny: vec![Permission::ViewChannel],
                    },
                    PermissionOverwrite {
                        target: OverwriteTarget::Member(owner.id),
                        allow: access.clone(),
                        deny: Vec::new(),
                    },
                    PermissionOverwrite {
                        target: OverwriteTarget::Role(self.staff_role),
                        allow: access,
                        deny: Vec::new(),
                    },
                ],
            })
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create ticket channel"))?;

        let ticket = Ticket {
            channel_id: channel,
            owner_id: owner.id,
            category,
            reason: reason.to_string(),
            created_at: Utc::now(),
            transcript: Vec::new(),
        };
        let written = self.store.try_update(|tickets| {
            if tickets.contains_key(&channel) {
                return Err(ModerationError::new(ModerationErrorKind::AlreadyPresent(
                    "Já existe um ticket neste canal.".to_string(),
                )));
            }
            tickets.insert(channel, ticket.clone());
            Ok(())
        });
        if let Err(e) = written {
            error!(error = %e, %channel, "Failed to record ticket, discarding channel");
            if let Err(cleanup) = self.platform.delete_channel(channel).await {
                warn!(error = %cleanup, %channel, "Failed to delete orphaned ticket channel");
            }
            return Err(e);
        }
        info!(%channel, %category, "Ticket opened");

        self.platform
            .send_message(channel, self.control_message(&ticket))
            .await
            .inspect_err(|e| {
                error!(error = %e, %channel, "Ticket recorded but control message failed")
            })?;
        Ok(ticket)
    }

    fn control_message(&self, ticket: &Ticket) -> OutgoingMessage {
        let embed = Embed::new()
            .title(format!("> 🔵 TICKET - {}", ticket.category.label()))
            .description(format!(
                "🔎 **Motivo Informado:** {}\n\n\
                 ➡️ O atendimento foi iniciado. A Corregedoria Federal analisará seu pedido em breve.\n\n\
                 > Enquanto aguarda, fique atento às notificações no canal e utilize os botões abaixo caso precise interagir.",
                ticket.reason
            ));
        OutgoingMessage::embed(embed)
            .with_content(format!(
                "Você Abriu um Suporte com a Equipe da Corregedoria Federal\n|| {} | {} ||",
                ticket.owner_id.mention(),
                self.staff_role.mention()
            ))
            .with_row(ComponentRow::Buttons(vec![
                Button::new(buttons::CLOSE, "Fechar Ticket", ButtonStyle::Danger).emoji("🔒"),
                Button::new(buttons::CLOSE_WITH_REASON, "Fechar com Motivo", ButtonStyle::Danger)
                    .emoji("🛑"),
                Button::new(buttons::NOTIFY_OWNER, "Notificar Você", ButtonStyle::Primary)
                    .emoji("🔔"),
                Button::new(buttons::NOTIFY_STAFF, "Chamar Equipe", ButtonStyle::Secondary)
                    .emoji("📣"),
                Button::new(buttons::ADD_MEMBER, "Adicionar Membro", ButtonStyle::Success)
                    .emoji("➕"),
            ]))
            .with_row(ComponentRow::Buttons(vec![
                Button::new(buttons::REMOVE_MEMBER, "Remover Membro", ButtonStyle::Danger)
                    .emoji("➖"),
            ]))
    }

    /// Append a non-bot message to its ticket's transcript.
    ///
    /// Returns whether the message belonged to an open ticket.
    pub fn capture(&self, message: &IncomingMessage) -> ModerationResult<bool> {
        if message.author_bot {
            return Ok(false);
        }
        let entry = TranscriptEntry {
            author: message.author_tag.clone(),
            content: message.content.clone(),
            timestamp: message.timestamp,
        };
        let appended = self.store.modify(|tickets| {
            tickets.get_mut(&message.channel)?.transcript.push(entry);
            Some(())
        })?;
        if appended.is_some() {
            debug!(channel = %message.channel, "Transcript entry appended");
        }
        Ok(appended.is_some())
    }

    /// Give the member named by `input` access to the ticket in `channel`.
    #[instrument(skip(self))]
    pub async fn add_member(&self, channel: ChannelId, input: &str) -> ModerationResult<Member> {
        self.ticket(channel).ok_or_else(ticket_not_found)?;
        let target = resolve_member(self.platform.as_ref(), input).await?;
        if self.platform.member_can_view(channel, target.id).await? {
            return Err(ModerationError::new(ModerationErrorKind::AlreadyPresent(
                format!("O membro {} já possui acesso a este ticket.", target.id.mention()),
            )));
        }
        self.platform
            .set_member_overwrite(
                channel,
                target.id,
                vec![Permission::ViewChannel, Permission::SendMessages],
                Vec::new(),
            )
            .await?;
        info!(%channel, member = %target.id, "Member added to ticket");
        Ok(target)
    }

    /// Revoke the access of the member named by `input`.
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        channel: ChannelId,
        input: &str,
    ) -> ModerationResult<Member> {
        let ticket = self.ticket(channel).ok_or_else(ticket_not_found)?;
        let target = resolve_member(self.platform.as_ref(), input).await?;
        if target.id == ticket.owner_id {
            return Err(ModerationError::new(ModerationErrorKind::OwnerProtected(
                "Você não pode remover o criador do ticket.".to_string(),
            )));
        }
        if !self.platform.member_can_view(channel, target.id).await? {
            return Err(ModerationError::new(ModerationErrorKind::NotPresent(
                format!("O membro {} já não possui acesso a este ticket.", target.id.mention()),
            )));
        }
        self.platform.clear_member_overwrite(channel, target.id).await?;
        info!(%channel, member = %target.id, "Member removed from ticket");
        Ok(target)
    }

    /// Begin closing the ticket in `channel`.
    ///
    /// Posts the closing notice, hides the channel from the owner and
    /// schedules retirement after the close delay.
    #[instrument(skip(self, closer, reason), fields(closer = %closer.id))]
    pub async fn close(
        self: &Arc<Self>,
        channel: ChannelId,
        closer: Closer,
        reason: Option<String>,
    ) -> ModerationResult<CloseOutcome> {
        let ticket = self.ticket(channel).ok_or_else(ticket_not_found)?;
        if self.scheduler.is_pending(channel) {
            info!(%channel, "Close already in progress");
            return Ok(CloseOutcome::AlreadyPending);
        }

        let delay = self.config.close_delay();
        if let Err(e) = self
            .platform
            .send_message(
                channel,
                OutgoingMessage::text(format!(
                    "Fechando ticket em {} segundos...",
                    delay.as_secs()
                )),
            )
            .await
        {
            warn!(error = %e, "Failed to post closing notice");
        }
        if let Err(e) = self
            .platform
            .set_member_overwrite(
                channel,
                ticket.owner_id,
                Vec::new(),
                vec![Permission::ViewChannel],
            )
            .await
        {
            warn!(error = %e, "Failed to hide ticket from owner");
        }

        let desk = Arc::clone(self);
        let scheduled = self.scheduler.schedule(channel, delay, async move {
            if let Err(e) = desk.retire(channel, &closer, reason.as_deref()).await {
                error!(error = %e, %channel, "Ticket retirement failed");
            }
        });
        info!(%channel, delay_secs = delay.as_secs(), "Ticket closing");
        Ok(if scheduled {
            CloseOutcome::Scheduled
        } else {
            CloseOutcome::AlreadyPending
        })
    }

    /// Retire the ticket now: remove the record, deliver the transcript to the
    /// log channel and the owner, then delete the channel.
    ///
    /// Returns `None` when the record was already gone.
    #[instrument(skip(self, closer, close_reason), fields(closer = %closer.id))]
    pub async fn retire(
        &self,
        channel: ChannelId,
        closer: &Closer,
        close_reason: Option<&str>,
    ) -> ModerationResult<Option<Ticket>> {
        let removed = self.store.modify(|tickets| tickets.remove(&channel))?;
        let Some(ticket) = removed else {
            warn!(%channel, "Ticket record already retired");
            return Ok(None);
        };
        info!(%channel, entries = ticket.transcript.len(), "Ticket record removed");

        let owner = match self.platform.user(ticket.owner_id).await {
            Ok(owner) => owner,
            Err(e) => {
                warn!(error = %e, "Failed to fetch ticket owner");
                None
            }
        };
        let now = Utc::now();
        let owner_line = match &owner {
            Some(user) => format!("{} ({})", user.id.mention(), user.tag),
            None => "Desconhecido".to_string(),
        };
        let mut description = format!(
            "Olá, seu ticket foi encerrado. Abaixo estão os detalhes do atendimento.\n\n\
             📁 Tipo de Ticket: {}\n\
             📝 Motivo da Abertura: {}\n",
            ticket.category.label(),
            ticket.reason
        );
        if let Some(reason) = close_reason {
            description.push_str(&format!("ℹ️ Motivo: {reason}\n"));
        }
        description.push_str(&format!(
            "🔎 ID do Ticket: `{channel}`\n\
             👤 Autor do Ticket: {owner_line}\n\
             🔒 Encerrado Por: {} ({})\n\
             📅 Data e Hora de Encerramento: {}",
            closer.id.mention(),
            closer.tag,
            format_timestamp(now)
        ));
        let summary = Embed::new()
            .title(format!(
                "Transcrição do Ticket: {} - {}",
                ticket.category.label(),
                owner.as_ref().map_or("Desconhecido", |u| u.username.as_str())
            ))
            .description(description)
            .footer(format!("Polícia Federal Ticket | {}", format_date(now)));
        let delivery = OutgoingMessage::embed(summary).with_attachment(
            format!("transcript-{channel}.txt"),
            ticket.render_transcript().into_bytes(),
        );

        if let Err(e) = self
            .platform
            .send_message(self.config.log_channel, delivery.clone())
            .await
        {
            warn!(error = %e, "Failed to post transcript to log channel");
        }
        if owner.is_some()
            && let Err(e) = self.platform.send_direct(ticket.owner_id, delivery).await
        {
            warn!(error = %e, owner = %ticket.owner_id, "Could not DM transcript to owner");
        }
        if let Err(e) = self.platform.delete_channel(channel).await {
            warn!(error = %e, %channel, "Failed to delete ticket channel");
        }
        info!(%channel, "Ticket retired");
        Ok(Some(ticket))
    }
}
