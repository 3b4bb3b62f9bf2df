//! Self-service access to the city prisons channel.

use crate::config::AccessConfig;
use crate::ids::{RoleId, UserId};
use crate::interaction::{Deferral, Interaction, InteractionKind, Response};
use crate::message::{Button, ButtonStyle, ComponentRow, Embed, OutgoingMessage, colors};
use crate::panel::{PanelOutcome, PanelReconciler};
use crate::platform::Platform;
use crate::router::InteractionHandler;
use async_trait::async_trait;
use federal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use std::sync::Arc;
use tracing::{info, instrument};

/// Title marker of the pinned access panel.
pub const PANEL_MARKER: &str = "Acesso Restrito";

const GRANT_BUTTON: &str = "receber_acesso";
const REVOKE_BUTTON: &str = "remover_acesso";

/// Access panel handler.
pub struct AccessPanel {
    platform: Arc<dyn Platform>,
    panels: PanelReconciler,
    config: AccessConfig,
}

impl AccessPanel {
    /// Create the handler.
    pub fn new(platform: Arc<dyn Platform>, panels: PanelReconciler, config: AccessConfig) -> Self {
        Self {
            platform,
            panels,
            config,
        }
    }

    /// Panel content.
    pub fn panel(&self) -> OutgoingMessage {
        let mut embed = Embed::new()
            .title(format!("🔎 {PANEL_MARKER} - Prisões da Cidade"))
            .description(
                "> Para ter acesso autorizado pela Polícia Federal ao canal de Prisões da Cidade e ver em tempo real as prisões realizadas na Delegacia, com informações detalhadas e dados implementados nos relatórios, clique no botão \"Receber Acesso\" abaixo.\n\n\
                 🔔 Caso não deseje receber notificações, você pode silenciar o canal ou simplesmente clicar em Remover Acesso.",
            )
            .color(colors::DEFAULT_BLUE);
        if let Some(image) = &self.config.image_url {
            embed = embed.image(image.as_str());
        }
        OutgoingMessage::embed(embed).with_row(ComponentRow::Buttons(vec![
            Button::new(GRANT_BUTTON, "Receber Acesso", ButtonStyle::Success).emoji("✅"),
            Button::new(REVOKE_BUTTON, "Remover Acesso", ButtonStyle::Danger).emoji("❌"),
        ]))
    }

    /// Create the pinned panel if it is missing.
    pub async fn ensure_panel(&self) -> ModerationResult<PanelOutcome> {
        self.panels
            .ensure_panel(self.config.panel_channel, PANEL_MARKER, || self.panel())
            .await
    }

    /// Grant the access role to `user`, who currently holds `roles`.
    #[instrument(skip(self, roles))]
    pub async fn grant(&self, user: UserId, roles: &[RoleId]) -> ModerationResult<()> {
        if roles.contains(&self.config.role) {
            return Err(ModerationError::new(ModerationErrorKind::AlreadyPresent(
                "Você já possui acesso às prisões da cidade!".to_string(),
            )));
        }
        self.platform
            .add_role(user, self.config.role, "Acesso às prisões da cidade")
            .await?;
        info!("Access granted");
        Ok(())
    }

    /// Revoke the access role from `user`, who currently holds `roles`.
    #[instrument(skip(self, roles))]
    pub async fn revoke(&self, user: UserId, roles: &[RoleId]) -> ModerationResult<()> {
        if !roles.contains(&self.config.role) {
            return Err(ModerationError::new(ModerationErrorKind::NotPresent(
                "Você não possui acesso às prisões da cidade para remover!".to_string(),
            )));
        }
        self.platform
            .remove_role(user, self.config.role, "Acesso às prisões da cidade removido")
            .await?;
        info!("Access revoked");
        Ok(())
    }
}

#[async_trait]
impl InteractionHandler for AccessPanel {
    fn name(&self) -> &str {
        "access"
    }

    fn claims(&self, interaction: &Interaction) -> bool {
        matches!(
            (&interaction.kind, interaction.custom_id()),
            (InteractionKind::Button { .. }, Some(GRANT_BUTTON | REVOKE_BUTTON))
        )
    }

    fn deferral(&self, _interaction: &Interaction) -> Option<Deferral> {
        Some(Deferral::Reply { ephemeral: true })
    }

    async fn handle(&self, interaction: &Interaction) -> ModerationResult<Response> {
        match interaction.custom_id() {
            Some(GRANT_BUTTON) => {
                self.grant(interaction.user, &interaction.roles).await?;
                Ok(Response::ephemeral(format!(
                    "✅ | Parabéns você recebeu acesso às prisões da cidade {} !",
                    self.config.announced_channel.mention()
                )))
            }
            Some(REVOKE_BUTTON) => {
                self.revoke(interaction.user, &interaction.roles).await?;
                Ok(Response::ephemeral(
                    "❌ | Seu Acesso às prisões da cidade foi removido !",
                ))
            }
            _ => Err(ModerationError::new(ModerationErrorKind::NotFound(
                "Ação desconhecida.".to_string(),
            ))),
        }
    }
}
