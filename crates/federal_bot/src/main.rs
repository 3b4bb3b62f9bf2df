//! Polícia Federal moderation bot binary.

use clap::Parser;
use federal_bot::{BotConfig, Cli, init_logging, keepalive};
use federal_error::ConfigError;
use federal_moderation::discord::FederalBot;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs)?;

    let config = BotConfig::from_file(&cli.config)?;
    if cli.check {
        info!(path = %cli.config.display(), "Configuration is valid");
        return Ok(());
    }
    let token = std::env::var("DISCORD_TOKEN")
        .map_err(|_| ConfigError::new("DISCORD_TOKEN environment variable is not set"))?;

    let port = config.keepalive.port;
    tokio::spawn(async move {
        if let Err(e) = keepalive::serve(port).await {
            error!(error = %e, "Keep-alive endpoint stopped");
        }
    });

    let mut bot = FederalBot::new(&token, config.moderation).await?;
    bot.start().await?;
    Ok(())
}
