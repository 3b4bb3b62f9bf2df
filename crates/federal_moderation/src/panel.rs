//! Pinned control panel reconciliation.
//!
//! Each managed channel carries exactly one pinned panel, recognised by the
//! bot's authorship and a marker in its first embed title. Nothing about the
//! panel is persisted; the pinned list is the source of truth.

use crate::ids::{ChannelId, MessageId};
use crate::message::OutgoingMessage;
use crate::platform::Platform;
use federal_error::ModerationResult;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Result of a reconcile or refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    /// A matching panel was already pinned and left untouched.
    Existing(MessageId),
    /// A matching panel was edited in place.
    Refreshed(MessageId),
    /// No panel was found; a new one was sent and pinned.
    Created(MessageId),
}

impl PanelOutcome {
    /// The panel message.
    pub fn message(self) -> MessageId {
        match self {
            Self::Existing(id) | Self::Refreshed(id) | Self::Created(id) => id,
        }
    }
}

/// Ensures a single pinned panel per channel.
#[derive(Clone)]
pub struct PanelReconciler {
    platform: Arc<dyn Platform>,
}

impl PanelReconciler {
    /// Create a reconciler over `platform`.
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Locate the bot-authored pinned message whose first embed title
    /// contains `marker`.
    #[instrument(skip(self))]
    pub async fn find_panel(
        &self,
        channel: ChannelId,
        marker: &str,
    ) -> ModerationResult<Option<MessageId>> {
        let bot = self.platform.bot_id();
        let pinned = self.platform.pinned_messages(channel).await?;
        let found = pinned
            .iter()
            .find(|m| m.author == bot && m.first_embed_title().is_some_and(|t| t.contains(marker)))
            .map(|m| m.id);
        debug!(pinned = pinned.len(), found = ?found, "Scanned pinned messages");
        Ok(found)
    }

    /// Create the panel if absent. An existing panel is not re-rendered.
    #[instrument(skip(self, build))]
    pub async fn ensure_panel(
        &self,
        channel: ChannelId,
        marker: &str,
        build: impl FnOnce() -> OutgoingMessage + Send,
    ) -> ModerationResult<PanelOutcome> {
        if let Some(existing) = self.find_panel(channel, marker).await? {
            info!(message = %existing, "Panel already pinned, nothing to do");
            return Ok(PanelOutcome::Existing(existing));
        }
        self.create(channel, build()).await
    }

    /// Re-render the panel in place, creating and pinning it if absent.
    #[instrument(skip(self, content))]
    pub async fn refresh_panel(
        &self,
        channel: ChannelId,
        marker: &str,
        content: OutgoingMessage,
    ) -> ModerationResult<PanelOutcome> {
        match self.find_panel(channel, marker).await? {
            Some(existing) => {
                self.platform
                    .edit_message(channel, existing, content)
                    .await?;
                info!(message = %existing, "Panel refreshed");
                Ok(PanelOutcome::Refreshed(existing))
            }
            None => self.create(channel, content).await,
        }
    }

    async fn create(
        &self,
        channel: ChannelId,
        content: OutgoingMessage,
    ) -> ModerationResult<PanelOutcome> {
        info!("No panel found, sending a new one");
        let message = self.platform.send_message(channel, content).await?;
        self.platform.pin_message(channel, message).await?;
        info!(%message, "Panel sent and pinned");
        Ok(PanelOutcome::Created(message))
    }
}
