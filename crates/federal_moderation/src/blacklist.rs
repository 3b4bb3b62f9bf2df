//! Permanent blacklist with a pinned summary panel.

use crate::config::BlacklistConfig;
use crate::interaction::{Deferral, InputStyle, Interaction, InteractionKind, Modal, Reply, Response, TextInput};
use crate::message::{
    Button, ButtonStyle, ComponentRow, Embed, OutgoingMessage, SelectMenu, SelectOption, colors,
    truncate_chars,
};
use crate::panel::{PanelOutcome, PanelReconciler};
use crate::router::{CommandDefinition, InteractionHandler};
use async_trait::async_trait;
use chrono::Utc;
use federal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use federal_storage::JsonStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Blacklist record file name inside the data directory.
pub const BLACKLIST_FILE: &str = "blacklist.json";

/// Title marker of the pinned blacklist summary.
pub const PANEL_MARKER: &str = "BLACKLIST";

const REFRESH_COMMAND: &str = "setblacklist";
const ADD_BUTTON: &str = "blacklist_add";
const REMOVE_BUTTON: &str = "blacklist_remove";
const ADD_MODAL: &str = "blacklist_add_modal";
const REMOVE_SELECT: &str = "blacklist_remove_select";

const FIELD_NAME: &str = "blacklist_name";
const FIELD_ID: &str = "blacklist_id";
const FIELD_REASON: &str = "blacklist_reason";

const LIST_FIELD: &str = "Membros Atualmente na Blacklist:";

/// A permanently banned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// Display name
    pub name: String,
    /// External identity, unique within the list
    pub id: String,
    /// Optional reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BlacklistEntry {
    fn reason(&self) -> Option<&str> {
        self.reason.as_deref().filter(|r| !r.trim().is_empty())
    }
}

/// Blacklist registry and panel handler.
pub struct Blacklist {
    store: JsonStore<Vec<BlacklistEntry>>,
    panels: PanelReconciler,
    config: BlacklistConfig,
}

impl Blacklist {
    /// Create a blacklist persisting to `path`.
    pub fn new(path: impl Into<PathBuf>, panels: PanelReconciler, config: BlacklistConfig) -> Self {
        Self {
            store: JsonStore::new(path),
            panels,
            config,
        }
    }

    /// Current entries, in insertion order.
    pub fn entries(&self) -> Vec<BlacklistEntry> {
        self.store.load()
    }

    /// Add an entry and refresh the summary panel.
    #[instrument(skip(self, reason))]
    pub async fn add(
        &self,
        name: &str,
        id: &str,
        reason: Option<&str>,
    ) -> ModerationResult<BlacklistEntry> {
        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ModerationError::new(ModerationErrorKind::InvalidInput(
                "O ID do membro deve ser um número válido.".to_string(),
            )));
        }
        let entry = BlacklistEntry {
            name: name.trim().to_string(),
            id: id.to_string(),
            reason: reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        };
        self.store.try_update(|entries| {
            if entries.iter().any(|e| e.id == entry.id) {
                return Err(ModerationError::new(ModerationErrorKind::AlreadyPresent(
                    format!("O membro com ID `{}` já está na blacklist.", entry.id),
                )));
            }
            entries.push(entry.clone());
            Ok(())
        })?;
        info!(id = %entry.id, "Blacklist entry added");
        self.refresh_quietly().await;
        Ok(entry)
    }

    /// Remove the entry with `id` and refresh the summary panel.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> ModerationResult<BlacklistEntry> {
        let removed = self.store.modify(|entries| {
            let index = entries.iter().position(|e| e.id == id)?;
            Some(entries.remove(index))
        })?;
        let removed = removed.ok_or_else(|| {
            ModerationError::new(ModerationErrorKind::NotFound(
                "Membro não encontrado na blacklist.".to_string(),
            ))
        })?;
        info!(id = %removed.id, "Blacklist entry removed");
        self.refresh_quietly().await;
        Ok(removed)
    }

    /// Summary panel for `entries`.
    pub fn panel(&self, entries: &[BlacklistEntry]) -> OutgoingMessage {
        let listing = if entries.is_empty() {
            "Nenhum membro na blacklist no momento.".to_string()
        } else {
            let text = entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    let reason = e
                        .reason()
                        .map(|r| format!(" | **Motivo:** {r}"))
                        .unwrap_or_default();
                    format!("``{}.`` **Nome:** {} | **ID:** {}{}", i + 1, e.name, e.id, reason)
                })
                .collect::<Vec<_>>()
                .join("\n");
            truncate_chars(&text, 1024)
        };
        let mut embed = Embed::new()
            .title(format!("🚨 LISTA DA {PANEL_MARKER} DA POLICIA FEDERAL"))
            .description(
                "Os membros da lista abaixo estão proibidos de adentrar na corporação sem permissão concedida pelos diretores",
            )
            .color(colors::RED)
            .timestamp(Utc::now())
            .field(LIST_FIELD, listing, false);
        if let Some(image) = &self.config.image_url {
            embed = embed.image(image.as_str());
        }
        OutgoingMessage::embed(embed).with_row(ComponentRow::Buttons(vec![
            Button::new(ADD_BUTTON, "Adicionar Blacklist", ButtonStyle::Danger).emoji("🚫"),
            Button::new(REMOVE_BUTTON, "Remover Blacklist", ButtonStyle::Success).emoji("✅"),
        ]))
    }

    /// Create the summary panel if it is missing.
    pub async fn ensure_panel(&self) -> ModerationResult<PanelOutcome> {
        let entries = self.entries();
        self.panels
            .ensure_panel(self.config.panel_channel, PANEL_MARKER, || self.panel(&entries))
            .await
    }

    /// Re-render the summary panel from the current entries.
    pub async fn refresh_panel(&self) -> ModerationResult<PanelOutcome> {
        let content = self.panel(&self.entries());
        self.panels
            .refresh_panel(self.config.panel_channel, PANEL_MARKER, content)
            .await
    }

    async fn refresh_quietly(&self) {
        if let Err(e) = self.refresh_panel().await {
            warn!(error = %e, "Failed to refresh blacklist panel");
        }
    }

    fn add_modal() -> Modal {
        Modal {
            custom_id: ADD_MODAL.to_string(),
            title: "Adicionar Membro à Blacklist".to_string(),
            inputs: vec![
                TextInput::required(FIELD_NAME, "Nome do Membro", InputStyle::Short),
                TextInput::required(FIELD_ID, "ID do Membro (ID)", InputStyle::Short),
                TextInput::optional(FIELD_REASON, "Motivo (Opcional)", InputStyle::Paragraph),
            ],
        }
    }

    fn removal_menu(&self) -> Response {
        let entries = self.entries();
        if entries.is_empty() {
            return Response::ephemeral("A blacklist está vazia. Não há membros para remover.");
        }
        let options = entries
            .iter()
            .take(25)
            .map(|e| SelectOption {
                label: truncate_chars(&e.name, 100),
                value: e.id.clone(),
                description: Some(truncate_chars(
                    &match e.reason() {
                        Some(reason) => format!("ID: {} | Motivo: {}", e.id, reason),
                        None => format!("ID: {}", e.id),
                    },
                    100,
                )),
            })
            .collect();
        Response::Message(
            Reply::ephemeral("Selecione o membro que deseja remover da blacklist:").with_row(
                ComponentRow::Select(SelectMenu {
                    custom_id: REMOVE_SELECT.to_string(),
                    placeholder: "Selecione um membro para remover".to_string(),
                    options,
                }),
            ),
        )
    }

    async fn refresh_command(&self, interaction: &Interaction) -> ModerationResult<Response> {
        if !interaction.permissions.administrator {
            return Err(ModerationError::new(ModerationErrorKind::Permission(
                "Você não tem permissão para usar este comando.".to_string(),
            )));
        }
        self.refresh_quietly().await;
        Ok(Response::ephemeral(
            "Verificando e atualizando a mensagem da blacklist...",
        ))
    }
}

#[async_trait]
impl InteractionHandler for Blacklist {
    fn name(&self) -> &str {
        "blacklist"
    }

    fn commands(&self) -> Vec<CommandDefinition> {
        vec![CommandDefinition::admin(
            REFRESH_COMMAND,
            "Gerencia o sistema de blacklist.",
        )]
    }

    fn claims(&self, interaction: &Interaction) -> bool {
        matches!(
            (&interaction.kind, interaction.custom_id()),
            (InteractionKind::Button { .. }, Some(ADD_BUTTON | REMOVE_BUTTON))
                | (InteractionKind::Modal { .. }, Some(ADD_MODAL))
                | (InteractionKind::Select { .. }, Some(REMOVE_SELECT))
        )
    }

    fn deferral(&self, interaction: &Interaction) -> Option<Deferral> {
        if interaction.command_name() == Some(REFRESH_COMMAND) {
            return Some(Deferral::Reply { ephemeral: true });
        }
        match interaction.custom_id() {
            Some(ADD_MODAL) => Some(Deferral::Reply { ephemeral: true }),
            Some(REMOVE_SELECT) => Some(Deferral::Update),
            _ => None,
        }
    }

    #[instrument(skip(self, interaction), fields(user = %interaction.user, id = ?interaction.custom_id()))]
    async fn handle(&self, interaction: &Interaction) -> ModerationResult<Response> {
        if interaction.command_name() == Some(REFRESH_COMMAND) {
            return self.refresh_command(interaction).await;
        }
        match interaction.custom_id() {
            Some(ADD_BUTTON) => Ok(Response::Modal(Self::add_modal())),
            Some(REMOVE_BUTTON) => Ok(self.removal_menu()),
            Some(ADD_MODAL) => {
                let name = interaction.field(FIELD_NAME).unwrap_or_default();
                let id = interaction.field(FIELD_ID).unwrap_or_default();
                let entry = self
                    .add(name, id, interaction.field(FIELD_REASON))
                    .await?;
                Ok(Response::ephemeral(format!(
                    "✅ Membro **{}** (ID: `{}`) adicionado à blacklist.",
                    entry.name, entry.id
                )))
            }
            Some(REMOVE_SELECT) => {
                let id = interaction.selected().unwrap_or_default();
                let content = match self.remove(id).await {
                    Ok(entry) => format!("✅ Membro com ID `{}` removido da blacklist.", entry.id),
                    Err(e) if !e.kind().is_internal() => e.kind().user_message(),
                    Err(e) => return Err(e),
                };
                Ok(Response::Update(Reply::ephemeral(content)))
            }
            _ => Err(ModerationError::new(ModerationErrorKind::NotFound(
                "Ação desconhecida.".to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reason_is_omitted() {
        let entry = BlacklistEntry {
            name: "X".to_string(),
            id: "1".to_string(),
            reason: Some(String::new()),
        };
        assert_eq!(entry.reason(), None);
    }

    #[test]
    fn test_reads_legacy_entry_without_reason() {
        let entry: BlacklistEntry = serde_json::from_str(r#"{"name":"X","id":"123"}"#).unwrap();
        assert_eq!(entry.reason, None);
    }
}
