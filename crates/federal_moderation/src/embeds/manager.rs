use super::draft::{EmbedDraft, UserEmbed};
use crate::ids::{ChannelId, UserId};
use crate::interaction::{Deferral, InputStyle, Interaction, InteractionKind, Modal, Reply, Response, TextInput};
use crate::message::{
    Button, ButtonStyle, ComponentRow, OutgoingMessage, SelectMenu, SelectOption, truncate_chars,
};
use crate::platform::{IncomingMessage, Platform};
use crate::router::{CommandDefinition, InteractionHandler, MessageListener};
use async_trait::async_trait;
use federal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use federal_storage::JsonStore;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// User embed record file name inside the data directory.
pub const EMBEDS_FILE: &str = "embedMessages.json";

const COMMAND: &str = "setupembed";
const CREATE_BUTTON: &str = "setupembed_create";
const DELETE_BUTTON: &str = "setupembed_delete";
const EDIT_BUTTON: &str = "setupembed_edit";
const CREATE_MODAL: &str = "setupembed_createEmbedModal";
const DELETE_SELECT: &str = "setupembed_deleteEmbedSelect";
const EDIT_SELECT: &str = "setupembed_editEmbedSelect";
const EDIT_MODAL_PREFIX: &str = "setupembed_editEmbedModal_";

const FIELD_TITLE: &str = "embedTitle";
const FIELD_DESCRIPTION: &str = "embedDesc";
const FIELD_COLOR: &str = "embedColor";
const FIELD_IMAGE: &str = "embedImage";
const FIELD_FOOTER: &str = "embedFooterText";

static CHANNEL_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<#(\d+)>").expect("Valid channel mention regex"));

type EmbedIndex = BTreeMap<UserId, Vec<UserEmbed>>;

/// A draft waiting for its author to name a target channel.
#[derive(Debug, Clone)]
struct PendingDraft {
    generation: u64,
    origin: ChannelId,
    token: String,
    draft: EmbedDraft,
}

#[derive(Debug, Default)]
struct Collector {
    next_generation: u64,
    pending: HashMap<UserId, PendingDraft>,
}

/// Creates, edits and deletes embeds authored by members.
pub struct EmbedManager {
    store: JsonStore<EmbedIndex>,
    platform: Arc<dyn Platform>,
    collector: Arc<Mutex<Collector>>,
    timeout: Duration,
}

impl EmbedManager {
    /// Create a manager persisting to `path`. Drafts wait `timeout` for a channel.
    pub fn new(path: impl Into<PathBuf>, platform: Arc<dyn Platform>, timeout: Duration) -> Self {
        Self {
            store: JsonStore::new(path),
            platform,
            collector: Arc::new(Mutex::new(Collector::default())),
            timeout,
        }
    }

    /// Embeds sent by `author`, oldest first.
    pub fn embeds_of(&self, author: UserId) -> Vec<UserEmbed> {
        self.store.load().remove(&author).unwrap_or_default()
    }

    /// Whether `author` has a draft waiting for a channel.
    pub fn has_pending(&self, author: UserId) -> bool {
        self.collector.lock().pending.contains_key(&author)
    }

    /// Hold `draft` until `author` mentions a channel in `origin`, or the
    /// collector window closes.
    #[instrument(skip(self, token, draft))]
    pub fn begin_draft(&self, author: UserId, origin: ChannelId, token: &str, draft: EmbedDraft) {
        let generation = {
            let mut collector = self.collector.lock();
            collector.next_generation += 1;
            let generation = collector.next_generation;
            collector.pending.insert(
                author,
                PendingDraft {
                    generation,
                    origin,
                    token: token.to_string(),
                    draft,
                },
            );
            generation
        };
        debug!(generation, "Draft waiting for channel mention");

        let collector = Arc::clone(&self.collector);
        let platform = Arc::clone(&self.platform);
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let expired = {
                let mut collector = collector.lock();
                match collector.pending.get(&author) {
                    Some(p) if p.generation == generation => collector.pending.remove(&author),
                    _ => None,
                }
            };
            if let Some(pending) = expired {
                info!(%author, "Embed draft expired");
                if let Err(e) = platform
                    .follow_up(
                        &pending.token,
                        "⌛ Tempo esgotado! Você não mencionou um canal. A criação da embed foi cancelada.",
                    )
                    .await
                {
                    warn!(error = %e, "Failed to send draft timeout notice");
                }
            }
        });
    }

    /// Send a pending draft when `message` names its target channel.
    #[instrument(skip(self, message), fields(author = %message.author, channel = %message.channel))]
    pub async fn collect(&self, message: &IncomingMessage) -> ModerationResult<bool> {
        let Some(target) = CHANNEL_MENTION
            .captures(&message.content)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(ChannelId)
        else {
            return Ok(false);
        };
        let pending = {
            let mut collector = self.collector.lock();
            match collector.pending.get(&message.author) {
                Some(p) if p.origin == message.channel => collector.pending.remove(&message.author),
                _ => None,
            }
        };
        let Some(pending) = pending else {
            return Ok(false);
        };

        let sent = self
            .platform
            .send_message(target, OutgoingMessage::embed(pending.draft.to_embed()))
            .await;
        let mut unrecorded = None;
        let notice = match sent {
            Ok(message_id) => {
                let recorded = self.store.update(|index| {
                    index.entry(message.author).or_default().push(UserEmbed {
                        embed_data: pending.draft.clone(),
                        channel_id: target,
                        message_id,
                    })
                });
                match recorded {
                    Ok(()) => {
                        info!(%target, %message_id, "User embed sent");
                        format!("✅ Embed enviada com sucesso para {}!", target.mention())
                    }
                    Err(e) => {
                        unrecorded = Some(e);
                        format!(
                            "⚠️ A embed foi enviada para {}, mas não foi possível registrá-la. Ela não poderá ser editada ou excluída.",
                            target.mention()
                        )
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, %target, "Failed to send user embed");
                "❌ Houve um erro ao tentar enviar a embed para o canal. Verifique as permissões do bot."
                    .to_string()
            }
        };
        if let Err(e) = self.platform.follow_up(&pending.token, &notice).await {
            warn!(error = %e, "Failed to send draft follow-up");
        }
        match unrecorded {
            Some(e) => Err(e.into()),
            None => Ok(true),
        }
    }

    /// Delete the author's embed at `index`. The platform message is removed
    /// when still reachable.
    #[instrument(skip(self))]
    pub async fn delete(&self, author: UserId, index: usize) -> ModerationResult<UserEmbed> {
        let removed = self
            .store
            .modify(|embeds| {
                let list = embeds.get_mut(&author)?;
                if index >= list.len() {
                    return None;
                }
                let removed = list.remove(index);
                if list.is_empty() {
                    embeds.remove(&author);
                }
                Some(removed)
            })?
            .ok_or_else(invalid_selection)?;
        if let Err(e) = self
            .platform
            .delete_message(removed.channel_id, removed.message_id)
            .await
        {
            warn!(error = %e, "Failed to delete embed message, it may already be gone");
        }
        info!(message = %removed.message_id, "User embed deleted");
        Ok(removed)
    }

    /// Replace the author's embed at `index` and edit the sent message when
    /// still reachable.
    #[instrument(skip(self, draft))]
    pub async fn edit(
        &self,
        author: UserId,
        index: usize,
        draft: EmbedDraft,
    ) -> ModerationResult<UserEmbed> {
        let updated = self
            .store
            .modify(|embeds| {
                let record = embeds.get_mut(&author)?.get_mut(index)?;
                record.embed_data = draft.clone();
                Some(record.clone())
            })?
            .ok_or_else(|| {
                ModerationError::new(ModerationErrorKind::InvalidInput(
                    "Índice inválido para edição.".to_string(),
                ))
            })?;
        if let Err(e) = self
            .platform
            .edit_message(
                updated.channel_id,
                updated.message_id,
                OutgoingMessage::embed(updated.embed_data.to_embed()),
            )
            .await
        {
            warn!(error = %e, "Failed to edit embed message, it may already be gone");
        }
        info!(message = %updated.message_id, "User embed edited");
        Ok(updated)
    }

    fn menu() -> Response {
        Response::Message(Reply::ephemeral("Selecione uma ação:").with_row(
            ComponentRow::Buttons(vec![
                Button::new(CREATE_BUTTON, "Criar Embed", ButtonStyle::Primary),
                Button::new(DELETE_BUTTON, "Excluir Embed", ButtonStyle::Danger),
                Button::new(EDIT_BUTTON, "Editar Embed", ButtonStyle::Secondary),
            ]),
        ))
    }

    fn form(custom_id: String, title: &str, prefill: Option<&EmbedDraft>) -> Response {
        let prefilled = |input: TextInput, value: Option<&str>| match value {
            Some(v) if !v.is_empty() => input.value(v),
            _ => input,
        };
        let inputs = vec![
            prefilled(
                TextInput::required(FIELD_TITLE, "Título da Embed", InputStyle::Short),
                prefill.map(|d| d.title.as_str()),
            ),
            prefilled(
                TextInput::required(FIELD_DESCRIPTION, "Descrição da Embed", InputStyle::Paragraph),
                prefill.map(|d| d.description.as_str()),
            ),
            prefilled(
                TextInput::optional(FIELD_COLOR, "Cor da Embed (Hex, ex: #3498DB)", InputStyle::Short),
                prefill.map(|d| d.color.as_str()),
            ),
            prefilled(
                TextInput::optional(FIELD_IMAGE, "URL da Imagem (opcional)", InputStyle::Short),
                prefill.and_then(|d| d.image.as_deref()),
            ),
            prefilled(
                TextInput::optional(FIELD_FOOTER, "Texto do Rodapé (opcional)", InputStyle::Short),
                prefill.and_then(|d| d.footer_text.as_deref()),
            ),
        ];
        Response::Modal(Modal {
            custom_id,
            title: title.to_string(),
            inputs,
        })
    }

    fn picker(&self, author: UserId, custom_id: &str, verb: &str, empty: &str) -> Response {
        let embeds = self.embeds_of(author);
        if embeds.is_empty() {
            return Response::Update(Reply::ephemeral(empty));
        }
        let options = embeds
            .iter()
            .enumerate()
            .take(25)
            .map(|(i, e)| SelectOption {
                label: truncate_chars(&e.embed_data.title, 100),
                value: i.to_string(),
                description: Some(truncate_chars(&e.embed_data.description, 100)),
            })
            .collect();
        Response::Update(
            Reply::ephemeral(format!("⚠️ Qual embed deseja {verb}?")).with_row(
                ComponentRow::Select(SelectMenu {
                    custom_id: custom_id.to_string(),
                    placeholder: format!("Selecione a embed para {verb}"),
                    options,
                }),
            ),
        )
    }

    fn draft_from(interaction: &Interaction) -> EmbedDraft {
        EmbedDraft::from_input(
            interaction.field(FIELD_TITLE).unwrap_or_default(),
            interaction.field(FIELD_DESCRIPTION).unwrap_or_default(),
            interaction.field(FIELD_COLOR),
            interaction.field(FIELD_IMAGE),
            interaction.field(FIELD_FOOTER),
        )
    }

    fn selected_index(interaction: &Interaction) -> ModerationResult<usize> {
        interaction
            .selected()
            .and_then(|v| v.parse().ok())
            .ok_or_else(invalid_selection)
    }
}

fn invalid_selection() -> ModerationError {
    ModerationError::new(ModerationErrorKind::InvalidInput(
        "Seleção inválida.".to_string(),
    ))
}

#[async_trait]
impl InteractionHandler for EmbedManager {
    fn name(&self) -> &str {
        "embeds"
    }

    fn commands(&self) -> Vec<CommandDefinition> {
        vec![CommandDefinition::new(
            COMMAND,
            "Criar, excluir ou editar suas embeds personalizadas.",
        )]
    }

    fn claims(&self, interaction: &Interaction) -> bool {
        match (&interaction.kind, interaction.custom_id()) {
            (InteractionKind::Button { .. }, Some(id)) => {
                matches!(id, CREATE_BUTTON | DELETE_BUTTON | EDIT_BUTTON)
            }
            (InteractionKind::Select { .. }, Some(id)) => matches!(id, DELETE_SELECT | EDIT_SELECT),
            (InteractionKind::Modal { .. }, Some(id)) => {
                id == CREATE_MODAL || id.starts_with(EDIT_MODAL_PREFIX)
            }
            _ => false,
        }
    }

    fn deferral(&self, interaction: &Interaction) -> Option<Deferral> {
        match interaction.custom_id() {
            Some(DELETE_SELECT) => Some(Deferral::Update),
            Some(id) if id.starts_with(EDIT_MODAL_PREFIX) => Some(Deferral::Reply { ephemeral: true }),
            _ => None,
        }
    }

    #[instrument(skip(self, interaction), fields(user = %interaction.user, id = ?interaction.custom_id()))]
    async fn handle(&self, interaction: &Interaction) -> ModerationResult<Response> {
        if interaction.command_name() == Some(COMMAND) {
            return Ok(Self::menu());
        }
        let author = interaction.user;
        match interaction.custom_id().unwrap_or_default() {
            CREATE_BUTTON => Ok(Self::form(CREATE_MODAL.to_string(), "Criar Embed", None)),
            DELETE_BUTTON => Ok(self.picker(
                author,
                DELETE_SELECT,
                "apagar",
                "❌ Você não tem embeds enviadas para excluir.",
            )),
            EDIT_BUTTON => Ok(self.picker(
                author,
                EDIT_SELECT,
                "editar",
                "❌ Você não tem embeds para editar.",
            )),
            DELETE_SELECT => {
                let index = Self::selected_index(interaction)?;
                self.delete(author, index).await?;
                Ok(Response::Update(Reply::ephemeral("✅ Embed apagada com sucesso!")))
            }
            EDIT_SELECT => {
                let index = Self::selected_index(interaction)?;
                let embeds = self.embeds_of(author);
                let record = embeds.get(index).ok_or_else(invalid_selection)?;
                Ok(Self::form(
                    format!("{EDIT_MODAL_PREFIX}{index}"),
                    "Editar Embed",
                    Some(&record.embed_data),
                ))
            }
            CREATE_MODAL => {
                self.begin_draft(
                    author,
                    interaction.channel,
                    &interaction.token,
                    Self::draft_from(interaction),
                );
                Ok(Response::ephemeral(
                    "✅ Embed criada! Agora, por favor, **mencione o canal** para onde deseja enviar essa embed.",
                ))
            }
            id => {
                let index = id
                    .strip_prefix(EDIT_MODAL_PREFIX)
                    .and_then(|i| i.parse::<usize>().ok())
                    .ok_or_else(|| {
                        ModerationError::new(ModerationErrorKind::InvalidInput(
                            "Índice inválido para edição.".to_string(),
                        ))
                    })?;
                self.edit(author, index, Self::draft_from(interaction)).await?;
                Ok(Response::ephemeral("✅ Embed editada com sucesso!"))
            }
        }
    }
}

#[async_trait]
impl MessageListener for EmbedManager {
    fn name(&self) -> &str {
        "embeds"
    }

    async fn on_message(&self, message: &IncomingMessage) -> ModerationResult<bool> {
        self.collect(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mention_pattern() {
        let caps = CHANNEL_MENTION.captures("manda em <#42> por favor").unwrap();
        assert_eq!(&caps[1], "42");
        assert!(CHANNEL_MENTION.captures("<@42>").is_none());
    }

    #[test]
    fn test_edit_form_is_prefilled() {
        let draft = EmbedDraft::from_input("T", "D", Some("#000000"), None, Some("F"));
        let Response::Modal(modal) =
            EmbedManager::form(format!("{EDIT_MODAL_PREFIX}0"), "Editar Embed", Some(&draft))
        else {
            panic!("expected modal");
        };
        assert_eq!(modal.inputs.len(), 5);
        assert_eq!(modal.inputs[0].value.as_deref(), Some("T"));
        assert_eq!(modal.inputs[4].value.as_deref(), Some("F"));
        assert_eq!(modal.inputs[3].value, None);
    }
}
