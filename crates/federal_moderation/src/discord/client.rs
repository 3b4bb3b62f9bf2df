//! Discord client lifecycle.

use super::handler::FederalHandler;
use crate::config::ModerationConfig;
use federal_error::{PlatformError, PlatformResult};
use serenity::Client;
use tracing::{info, instrument};

/// The bot's gateway connection.
pub struct FederalBot {
    client: Client,
}

impl FederalBot {
    /// Build the client for `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if serenity rejects the token or cannot build the
    /// client.
    #[instrument(skip(token, config), fields(token_len = token.len()))]
    pub async fn new(token: &str, config: ModerationConfig) -> PlatformResult<Self> {
        let intents = FederalHandler::intents();
        info!(?intents, "Building Discord client");
        let client = Client::builder(token, intents)
            .event_handler(FederalHandler::new(config))
            .await
            .map_err(|e| PlatformError::new("connect", e.to_string()))?;
        Ok(Self { client })
    }

    /// Run until the gateway connection ends.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> PlatformResult<()> {
        info!("Starting Discord bot");
        self.client
            .start()
            .await
            .map_err(|e| PlatformError::new("gateway", e.to_string()))
    }
}
