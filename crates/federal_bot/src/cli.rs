//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Discord moderation bot for the Polícia Federal community
#[derive(Parser, Debug)]
#[command(name = "federal-bot")]
#[command(about = "Tickets, punishments, blacklist and panels for the Polícia Federal guild", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "federal.toml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["federal-bot"]);
        assert_eq!(cli.config, PathBuf::from("federal.toml"));
        assert!(!cli.verbose);
        assert!(!cli.json_logs);
        assert!(!cli.check);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["federal-bot", "-c", "prod.toml", "-v", "--json-logs"]);
        assert_eq!(cli.config, PathBuf::from("prod.toml"));
        assert!(cli.verbose);
        assert!(cli.json_logs);
    }
}
