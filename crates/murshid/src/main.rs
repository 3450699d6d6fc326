// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Murshid - a bilingual education-assistant chat client.
//!
//! This is the binary entry point for the Murshid CLI.

mod shell;

use clap::{Parser, Subcommand};

/// Murshid - a bilingual education-assistant chat client.
#[derive(Parser, Debug)]
#[command(name = "murshid", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the interactive chat shell.
    Shell,
    /// List recent conversations.
    Chats {
        /// Maximum number of conversations to show.
        #[arg(long, default_value_t = 20)]
        limit: u64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match murshid_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            murshid_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Chats { limit }) => shell::list_chats(&config, limit).await,
        Some(Commands::Shell) | None => shell::run_shell(config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr so streamed chat output on stdout stays clean.
/// `RUST_LOG` overrides the configured level.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_default_to_shell() {
        let cli = Cli::parse_from(["murshid"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_chats_with_limit() {
        let cli = Cli::parse_from(["murshid", "chats", "--limit", "5"]);
        match cli.command {
            Some(Commands::Chats { limit }) => assert_eq!(limit, 5),
            other => panic!("expected chats subcommand, got {other:?}"),
        }
    }
}
