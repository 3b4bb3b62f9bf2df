use super::desk::{CloseOutcome, Closer, TicketDesk, buttons};
use super::record::TicketCategory;
use crate::interaction::{Deferral, InputStyle, Interaction, InteractionKind, Modal, Response, TextInput};
use crate::message::{ComponentRow, Embed, OutgoingMessage, SelectMenu, SelectOption, colors};
use crate::panel::{PanelOutcome, PanelReconciler};
use crate::platform::{IncomingMessage, Member, Platform};
use crate::router::{InteractionHandler, MessageListener};
use async_trait::async_trait;
use federal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::instrument;

/// Title marker of the pinned desk panel.
pub const PANEL_MARKER: &str = "PAINEL DE ATENDIMENTO";

const CATEGORY_SELECT: &str = "ticket_select";
const OPEN_MODAL_PREFIX: &str = "ticket_modal_";
const CLOSE_REASON_MODAL: &str = "close_ticket_reason_modal";
const ADD_MEMBER_MODAL: &str = "add_member_modal";
const REMOVE_MEMBER_MODAL: &str = "remove_member_modal";

const FIELD_REASON: &str = "ticket_reason";
const FIELD_CLOSE_REASON: &str = "close_reason_input";
const FIELD_ADD_MEMBER: &str = "member_id_input";
const FIELD_REMOVE_MEMBER: &str = "remove_member_id_input";

const CONTROL_BUTTONS: [&str; 6] = [
    buttons::CLOSE,
    buttons::CLOSE_WITH_REASON,
    buttons::NOTIFY_OWNER,
    buttons::NOTIFY_STAFF,
    buttons::ADD_MEMBER,
    buttons::REMOVE_MEMBER,
];

/// Desk panel, ticket control buttons and transcript capture.
pub struct TicketHandler {
    desk: Arc<TicketDesk>,
    platform: Arc<dyn Platform>,
    panels: PanelReconciler,
}

impl TicketHandler {
    /// Create the handler.
    pub fn new(desk: Arc<TicketDesk>, platform: Arc<dyn Platform>, panels: PanelReconciler) -> Self {
        Self {
            desk,
            platform,
            panels,
        }
    }

    /// The desk behind the panel.
    pub fn desk(&self) -> &Arc<TicketDesk> {
        &self.desk
    }

    /// Desk panel content.
    pub fn panel(&self) -> OutgoingMessage {
        let mut embed = Embed::new()
            .title(format!("📢 {PANEL_MARKER} - POLICIA FEDERAL"))
            .color(colors::PANEL_ORANGE)
            .description(
                "📁 Selecione abaixo o tipo de atendimento que deseja para abrir seu ticket.\n\n\
                 🔎 Pedimos que tenha paciência e aguarde o atendimento da nossa equipe.",
            );
        if let Some(image) = &self.desk.config().image_url {
            embed = embed.image(image.as_str());
        }
        let options = TicketCategory::iter()
            .map(|c| SelectOption {
                label: c.label(),
                value: c.tag().to_string(),
                description: Some(c.description().to_string()),
            })
            .collect();
        OutgoingMessage::embed(embed).with_row(ComponentRow::Select(SelectMenu {
            custom_id: CATEGORY_SELECT.to_string(),
            placeholder: "Selecione o tipo de Atendimento".to_string(),
            options,
        }))
    }

    /// Create the pinned desk panel if it is missing.
    pub async fn ensure_panel(&self) -> ModerationResult<PanelOutcome> {
        self.panels
            .ensure_panel(self.desk.config().desk_channel, PANEL_MARKER, || self.panel())
            .await
    }

    fn require_staff(&self, interaction: &Interaction, message: &str) -> ModerationResult<()> {
        if interaction.has_role(self.desk.staff_role()) {
            Ok(())
        } else {
            Err(ModerationError::new(ModerationErrorKind::Permission(
                message.to_string(),
            )))
        }
    }

    fn single_input_modal(custom_id: &str, title: &str, input: TextInput) -> Response {
        Response::Modal(Modal {
            custom_id: custom_id.to_string(),
            title: title.to_string(),
            inputs: vec![input],
        })
    }

    async fn open(&self, interaction: &Interaction, tag: &str) -> ModerationResult<Response> {
        let owner = match self.platform.member(interaction.user).await? {
            Some(member) => member,
            None => Member {
                id: interaction.user,
                username: interaction.username.clone(),
                display_name: interaction.username.clone(),
                nickname: None,
                tag: interaction.user_tag.clone(),
                roles: interaction.roles.clone(),
                bot: false,
            },
        };
        let reason = interaction.field(FIELD_REASON).unwrap_or_default();
        let ticket = self.desk.open(&owner, tag, reason).await?;
        Ok(Response::ephemeral(format!(
            "Seu ticket foi aberto em {}!",
            ticket.channel_id.mention()
        )))
    }

    async fn close(
        &self,
        interaction: &Interaction,
        reason: Option<String>,
    ) -> ModerationResult<Response> {
        let closer = Closer {
            id: interaction.user,
            tag: interaction.user_tag.clone(),
        };
        let outcome = self.desk.close(interaction.channel, closer, reason).await?;
        Ok(Response::ephemeral(match outcome {
            CloseOutcome::Scheduled => format!(
                "🔒 O ticket será fechado em {} segundos.",
                self.desk.config().close_delay_secs
            ),
            CloseOutcome::AlreadyPending => "🔒 Este ticket já está sendo fechado.".to_string(),
        }))
    }

    async fn control_button(&self, interaction: &Interaction) -> ModerationResult<Response> {
        let ticket = self
            .desk
            .ticket(interaction.channel)
            .ok_or_else(|| {
                ModerationError::new(ModerationErrorKind::NotFound(
                    "Este não é um canal de ticket válido ou o ticket já foi fechado.".to_string(),
                ))
            })?;
        match interaction.custom_id().unwrap_or_default() {
            buttons::CLOSE => self.close(interaction, None).await,
            buttons::CLOSE_WITH_REASON => {
                self.require_staff(interaction, "Apenas a equipe pode usar este botão.")?;
                Ok(Self::single_input_modal(
                    CLOSE_REASON_MODAL,
                    "Motivo do Fechamento:",
                    TextInput::required(
                        FIELD_CLOSE_REASON,
                        "Informe o motivo do fechamento do ticket.",
                        InputStyle::Paragraph,
                    ),
                ))
            }
            buttons::NOTIFY_OWNER => Ok(Response::public(format!(
                "🔔 | Olá {} você está sendo notificado pela equipe.",
                ticket.owner_id.mention()
            ))),
            buttons::NOTIFY_STAFF => Ok(Response::public(format!(
                "📣 | Olá {} o Usuário está solicitando sua presença.",
                self.desk.staff_role().mention()
            ))),
            buttons::ADD_MEMBER => {
                self.require_staff(interaction, "Apenas a equipe pode adicionar membros.")?;
                Ok(Self::single_input_modal(
                    ADD_MEMBER_MODAL,
                    "Adicionar Membro ao Ticket",
                    TextInput::required(
                        FIELD_ADD_MEMBER,
                        "Mencione o membro ou insira o ID:",
                        InputStyle::Short,
                    ),
                ))
            }
            buttons::REMOVE_MEMBER => {
                self.require_staff(interaction, "Apenas a equipe pode remover membros.")?;
                Ok(Self::single_input_modal(
                    REMOVE_MEMBER_MODAL,
                    "Remover Membro do Ticket",
                    TextInput::required(
                        FIELD_REMOVE_MEMBER,
                        "Mencione o membro ou insira o ID:",
                        InputStyle::Short,
                    ),
                ))
            }
            other => Err(ModerationError::new(ModerationErrorKind::NotFound(format!(
                "Ação desconhecida: {other}"
            )))),
        }
    }

    async fn modal(&self, interaction: &Interaction, custom_id: &str) -> ModerationResult<Response> {
        if let Some(tag) = custom_id.strip_prefix(OPEN_MODAL_PREFIX) {
            return self.open(interaction, tag).await;
        }
        match custom_id {
            CLOSE_REASON_MODAL => {
                self.require_staff(interaction, "Apenas a equipe pode usar este botão.")?;
                let reason = interaction
                    .field(FIELD_CLOSE_REASON)
                    .unwrap_or_default()
                    .to_string();
                self.close(interaction, Some(reason)).await
            }
            ADD_MEMBER_MODAL => {
                self.require_staff(interaction, "Apenas a equipe pode adicionar membros.")?;
                let input = interaction.field(FIELD_ADD_MEMBER).unwrap_or_default();
                let member = self.desk.add_member(interaction.channel, input).await?;
                Ok(Response::public(format!(
                    "✅ | Membro {} Adicionado ao ticket por {}.",
                    member.id.mention(),
                    interaction.user.mention()
                )))
            }
            REMOVE_MEMBER_MODAL => {
                self.require_staff(interaction, "Apenas a equipe pode remover membros.")?;
                let input = interaction.field(FIELD_REMOVE_MEMBER).unwrap_or_default();
                let member = self.desk.remove_member(interaction.channel, input).await?;
                Ok(Response::public(format!(
                    "➖ | Membro {} Removido do ticket por {}.",
                    member.id.mention(),
                    interaction.user.mention()
                )))
            }
            other => Err(ModerationError::new(ModerationErrorKind::NotFound(format!(
                "Ação desconhecida: {other}"
            )))),
        }
    }
}

#[async_trait]
impl InteractionHandler for TicketHandler {
    fn name(&self) -> &str {
        "tickets"
    }

    fn claims(&self, interaction: &Interaction) -> bool {
        match (&interaction.kind, interaction.custom_id()) {
            (InteractionKind::Select { .. }, Some(id)) => id == CATEGORY_SELECT,
            (InteractionKind::Modal { .. }, Some(id)) => {
                id.starts_with(OPEN_MODAL_PREFIX)
                    || matches!(id, CLOSE_REASON_MODAL | ADD_MEMBER_MODAL | REMOVE_MEMBER_MODAL)
            }
            (InteractionKind::Button { .. }, Some(id)) => {
                CONTROL_BUTTONS.contains(&id) && self.desk.ticket(interaction.channel).is_some()
            }
            _ => false,
        }
    }

    fn deferral(&self, interaction: &Interaction) -> Option<Deferral> {
        match (&interaction.kind, interaction.custom_id()) {
            (InteractionKind::Modal { .. }, Some(ADD_MEMBER_MODAL | REMOVE_MEMBER_MODAL)) => {
                Some(Deferral::Reply { ephemeral: false })
            }
            (InteractionKind::Modal { .. }, Some(_))
            | (InteractionKind::Button { .. }, Some(buttons::CLOSE)) => {
                Some(Deferral::Reply { ephemeral: true })
            }
            _ => None,
        }
    }

    #[instrument(skip(self, interaction), fields(user = %interaction.user, channel = %interaction.channel, id = ?interaction.custom_id()))]
    async fn handle(&self, interaction: &Interaction) -> ModerationResult<Response> {
        match (&interaction.kind, interaction.custom_id()) {
            (InteractionKind::Select { .. }, Some(CATEGORY_SELECT)) => {
                let tag = interaction.selected().unwrap_or_default();
                Ok(Self::single_input_modal(
                    &format!("{OPEN_MODAL_PREFIX}{tag}"),
                    "Informe o motivo:",
                    TextInput::required(
                        FIELD_REASON,
                        "Qual o motivo do seu atendimento?",
                        InputStyle::Paragraph,
                    ),
                ))
            }
            (InteractionKind::Modal { .. }, Some(id)) => self.modal(interaction, id).await,
            (InteractionKind::Button { .. }, Some(_)) => self.control_button(interaction).await,
            _ => Err(ModerationError::new(ModerationErrorKind::NotFound(
                "Ação desconhecida.".to_string(),
            ))),
        }
    }
}

#[async_trait]
impl MessageListener for TicketHandler {
    fn name(&self) -> &str {
        "tickets"
    }

    async fn on_message(&self, message: &IncomingMessage) -> ModerationResult<bool> {
        self.desk.capture(message)
    }
}
