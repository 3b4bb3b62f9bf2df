//! Gateway event handler.

use super::conversions;
use super::platform::SerenityPlatform;
use super::responder::SerenityResponder;
use crate::config::ModerationConfig;
use crate::ids::UserId;
use crate::suite::Moderation;
use async_trait::async_trait;
use serenity::all as sy;
use serenity::client::{Context, EventHandler};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, instrument, warn};

/// Routes gateway events into the moderation core.
///
/// The core is built on `ready`, once the bot's own identity is known.
pub struct FederalHandler {
    config: ModerationConfig,
    moderation: OnceLock<Moderation>,
}

impl FederalHandler {
    /// Create a handler for `config`.
    pub fn new(config: ModerationConfig) -> Self {
        Self {
            config,
            moderation: OnceLock::new(),
        }
    }

    /// Gateway intents the bot needs.
    pub fn intents() -> sy::GatewayIntents {
        sy::GatewayIntents::GUILDS
            | sy::GatewayIntents::GUILD_MESSAGES
            | sy::GatewayIntents::GUILD_MEMBERS
            | sy::GatewayIntents::MESSAGE_CONTENT
            | sy::GatewayIntents::DIRECT_MESSAGES
    }

    async fn register_commands(&self, ctx: &Context, moderation: &Moderation) {
        let Ok(guild) =
            conversions::snowflake::<sy::GuildId>("set_commands", self.config.guild.guild_id.get())
        else {
            return;
        };
        let commands = moderation
            .command_definitions()
            .into_iter()
            .map(|c| {
                let command = sy::CreateCommand::new(c.name).description(c.description);
                if c.admin_only {
                    command.default_member_permissions(sy::Permissions::ADMINISTRATOR)
                } else {
                    command
                }
            })
            .collect::<Vec<_>>();
        match guild.set_commands(&ctx.http, commands).await {
            Ok(registered) => info!(count = registered.len(), "Slash commands registered"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }
    }
}

#[async_trait]
impl EventHandler for FederalHandler {
    #[instrument(skip(self, ctx, ready), fields(bot = %ready.user.name))]
    async fn ready(&self, ctx: Context, ready: sy::Ready) {
        info!("Connected to Discord");
        if self.moderation.get().is_some() {
            debug!("Reconnected, keeping existing components");
            return;
        }
        let platform = match SerenityPlatform::new(
            Arc::clone(&ctx.http),
            self.config.guild.guild_id,
            UserId(ready.user.id.get()),
        ) {
            Ok(platform) => platform,
            Err(e) => {
                error!(error = %e, "Invalid guild configuration");
                return;
            }
        };
        let moderation = self
            .moderation
            .get_or_init(|| Moderation::new(&self.config, Arc::new(platform)));
        moderation.reconcile_panels().await;
        self.register_commands(&ctx, moderation).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: sy::Interaction) {
        let Some(moderation) = self.moderation.get() else {
            warn!("Interaction received before ready");
            return;
        };
        let Some(core) = conversions::interaction(&interaction) else {
            return;
        };
        let responder = SerenityResponder::new(&ctx.http, &interaction);
        if !moderation.respond(&core, &responder).await {
            debug!(id = ?core.custom_id(), "No component claimed interaction");
        }
    }

    async fn message(&self, _ctx: Context, message: sy::Message) {
        if message.guild_id.is_none() {
            return;
        }
        if let Some(moderation) = self.moderation.get() {
            moderation
                .dispatch_message(&conversions::incoming(&message))
                .await;
        }
    }
}
