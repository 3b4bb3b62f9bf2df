//! Process shell of the Polícia Federal moderation bot.
//!
//! Loads the TOML configuration, initialises logging, serves the keep-alive
//! endpoint and hands the moderation core to the Discord client.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cli;
mod config;
pub mod keepalive;
mod logging;

pub use cli::Cli;
pub use config::{BotConfig, KeepAliveConfig};
pub use logging::init_logging;
