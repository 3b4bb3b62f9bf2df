use super::{PunishmentCategory, PunishmentRegistry, RoleRevocation};
use crate::interaction::{Deferral, InputStyle, Interaction, InteractionKind, Modal, Reply, Response, TextInput};
use crate::message::{
    Button, ButtonStyle, ComponentRow, Embed, OutgoingMessage, SelectMenu, SelectOption, colors,
    truncate_chars,
};
use crate::panel::{PanelOutcome, PanelReconciler};
use crate::router::InteractionHandler;
use async_trait::async_trait;
use chrono::Utc;
use federal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, instrument};

/// Title marker of the pinned punishment panel.
pub const PANEL_MARKER: &str = "SISTEMA DE PUNIÇÕES";

const APPLY_BUTTON: &str = "punish_apply";
const REMOVE_BUTTON: &str = "punish_remove";
const APPLY_MODAL: &str = "punish_apply_modal";
const REMOVE_SELECT: &str = "punish_remove_select";

const FIELD_TARGET: &str = "punish_qra";
const FIELD_REASON: &str = "punish_reason";
const FIELD_TYPE: &str = "punish_type";

/// Punishment panel buttons, apply modal and removal select.
pub struct PunishmentHandler {
    registry: Arc<PunishmentRegistry>,
    panels: PanelReconciler,
}

impl PunishmentHandler {
    /// Create the handler.
    pub fn new(registry: Arc<PunishmentRegistry>, panels: PanelReconciler) -> Self {
        Self { registry, panels }
    }

    /// The registry behind the panel.
    pub fn registry(&self) -> &Arc<PunishmentRegistry> {
        &self.registry
    }

    /// Panel content.
    pub fn panel(&self) -> OutgoingMessage {
        let config = self.registry.config();
        let tiers: String = PunishmentCategory::iter()
            .map(|c| {
                let duration = match c.days() {
                    0 => c.label().to_string(),
                    days => format!("{days} dias"),
                };
                format!("> {} - {}\n", c.role(&config.roles).mention(), duration)
            })
            .collect();
        let mut embed = Embed::new()
            .title(format!("⚠️ {PANEL_MARKER} POLICIA FEDERAL"))
            .description(format!(
                "> Abaixo temos o sistema de punições da policia federal e suas respectivas punições abaixo:\n\
                 {tiers}\n\
                 > Ao selecionar **Exoneração** o mesmo será expulso automaticamente da corporação.\n"
            ))
            .color(colors::PANEL_ORANGE)
            .timestamp(Utc::now());
        if let Some(image) = &config.image_url {
            embed = embed.image(image.as_str());
        }
        OutgoingMessage::embed(embed).with_row(ComponentRow::Buttons(vec![
            Button::new(APPLY_BUTTON, "Aplicar Punição", ButtonStyle::Danger).emoji("🚫"),
            Button::new(REMOVE_BUTTON, "Remover Punição", ButtonStyle::Success).emoji("✅"),
        ]))
    }

    /// Create the pinned panel if it is missing.
    pub async fn ensure_panel(&self) -> ModerationResult<PanelOutcome> {
        self.panels
            .ensure_panel(self.registry.config().panel_channel, PANEL_MARKER, || self.panel())
            .await
    }

    fn apply_modal() -> Modal {
        Modal {
            custom_id: APPLY_MODAL.to_string(),
            title: "Aplicar Punição".to_string(),
            inputs: vec![
                TextInput::required(
                    FIELD_TARGET,
                    "Membro Punido (ID do dc ou Menção)",
                    InputStyle::Short,
                )
                .placeholder("Ex: 707959058228969485 ou <@707959058228969485>"),
                TextInput::required(FIELD_REASON, "Motivo da Punição", InputStyle::Paragraph),
                TextInput::required(FIELD_TYPE, "Tipo de Punição:", InputStyle::Short)
                    .placeholder("Leve | Media | Grave | Exoneração"),
            ],
        }
    }

    fn removal_menu(&self) -> Response {
        let removable = self.registry.list_removable();
        if removable.is_empty() {
            return Response::ephemeral(
                "Não há punições removíveis ativas no momento (Punições de Exoneração não podem ser removidas por este painel).",
            );
        }
        let options = removable
            .iter()
            .take(25)
            .map(|p| SelectOption {
                label: truncate_chars(
                    &format!("{} ({})", p.member_name, p.punishment_type.label()),
                    100,
                ),
                value: p.id.clone(),
                description: Some(format!("Motivo: {}...", truncate_chars(&p.reason, 50))),
            })
            .collect();
        Response::Message(
            Reply::ephemeral(
                "Selecione a punição que deseja remover (Punições de Exoneração não aparecem aqui):",
            )
            .with_row(ComponentRow::Select(SelectMenu {
                custom_id: REMOVE_SELECT.to_string(),
                placeholder: "Selecione uma punição para remover".to_string(),
                options,
            })),
        )
    }

    async fn apply(&self, interaction: &Interaction) -> ModerationResult<Response> {
        require_manage_roles(interaction, "Você não tem permissão para aplicar punições.")?;
        let target = interaction.field(FIELD_TARGET).unwrap_or_default();
        let reason = interaction.field(FIELD_REASON).unwrap_or_default();
        let tag = interaction.field(FIELD_TYPE).unwrap_or_default();

        let applied = self
            .registry
            .apply(target, tag, reason, interaction.user)
            .await?;
        if applied.role_sync_error.is_some() {
            return Ok(Response::ephemeral(
                "❌ Punição aplicada, mas houve um erro ao gerenciar cargos. Verifique as permissões do bot.",
            ));
        }
        let record = applied.record;
        Ok(Response::ephemeral(format!(
            "✅ Punição de **{}** aplicada a {}. Motivo: {}",
            record.punishment_type.label(),
            record.member_id.mention(),
            record.reason
        )))
    }

    async fn remove(&self, interaction: &Interaction) -> ModerationResult<Response> {
        require_manage_roles(interaction, "Você não tem permissão para remover punições.")?;
        let token = interaction.selected().unwrap_or_default();
        let (record, revocation) = self.registry.remove(token, interaction.user).await?;
        let member = record.member_id.mention();
        let content = match revocation {
            RoleRevocation::Revoked => format!("✅ Cargo de punição removido de {member}."),
            RoleRevocation::NotHeld => {
                "✅ Punição removida do registro, mas o membro não possui mais o cargo de punição."
                    .to_string()
            }
            RoleRevocation::MemberGone => {
                "✅ Punição removida do registro. Membro não encontrado no servidor.".to_string()
            }
            RoleRevocation::Failed(_) => "❌ Punição removida do registro, mas houve um erro ao remover o cargo do membro. Verifique as permissões do bot.".to_string(),
        };
        Ok(Response::Update(Reply::ephemeral(content)))
    }
}

fn require_manage_roles(interaction: &Interaction, message: &str) -> ModerationResult<()> {
    if interaction.permissions.manage_roles || interaction.permissions.administrator {
        Ok(())
    } else {
        Err(ModerationError::new(ModerationErrorKind::Permission(
            message.to_string(),
        )))
    }
}

#[async_trait]
impl InteractionHandler for PunishmentHandler {
    fn name(&self) -> &str {
        "punishments"
    }

    fn claims(&self, interaction: &Interaction) -> bool {
        matches!(
            (&interaction.kind, interaction.custom_id()),
            (InteractionKind::Button { .. }, Some(APPLY_BUTTON | REMOVE_BUTTON))
                | (InteractionKind::Modal { .. }, Some(APPLY_MODAL))
                | (InteractionKind::Select { .. }, Some(REMOVE_SELECT))
        )
    }

    fn deferral(&self, interaction: &Interaction) -> Option<Deferral> {
        match interaction.custom_id() {
            Some(APPLY_MODAL) => Some(Deferral::Reply { ephemeral: true }),
            Some(REMOVE_SELECT) => Some(Deferral::Update),
            _ => None,
        }
    }

    #[instrument(skip(self, interaction), fields(user = %interaction.user, id = ?interaction.custom_id()))]
    async fn handle(&self, interaction: &Interaction) -> ModerationResult<Response> {
        match interaction.custom_id() {
            Some(APPLY_BUTTON) => Ok(Response::Modal(Self::apply_modal())),
            Some(REMOVE_BUTTON) => Ok(self.removal_menu()),
            Some(APPLY_MODAL) => self.apply(interaction).await,
            Some(REMOVE_SELECT) => self.remove(interaction).await,
            other => {
                info!(?other, "Unrecognised punishment interaction");
                Err(ModerationError::new(ModerationErrorKind::NotFound(
                    "Ação desconhecida.".to_string(),
                )))
            }
        }
    }
}
