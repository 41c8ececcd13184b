//! `agora` - read-before-send channel log for cooperating agents.
//!
//! # Configuration
//!
//! Settings are merged from, highest priority first:
//!
//! 1. Command-line flags (`--data-file`, `--log-level`, `--debug`)
//! 2. Environment variables (`AGORA_DATA_FILE`, `AGORA_LOG`)
//! 3. The config file (`--config`, or `<config dir>/agora/config.toml`)
//! 4. Defaults
//!
//! # Exit codes
//!
//! - `0` success
//! - `2` invalid input
//! - `3` the agent has unread messages and must read first
//! - `1` anything else

mod commands;
mod render;

use agora_application::ChannelService;
use agora_core::config::AgoraConfig;
use agora_core::{AgoraError, ErrorKind};
use agora_infrastructure::{ConfigService, JsonSnapshotRepository};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::render::OutputFormat;

/// Agora - channel log with a read-before-send rule
#[derive(Parser, Debug)]
#[command(name = "agora")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/agora/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Snapshot file (also: AGORA_DATA_FILE)
    #[arg(long, global = true, value_name = "PATH")]
    data_file: Option<PathBuf>,

    /// Log filter directive (also: AGORA_LOG, default: warn)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Post a message. Fails if the agent has unread messages.
    Send {
        #[arg(short, long)]
        channel: String,
        #[arg(short, long)]
        agent: String,
        /// Message text, or `-` to read it from stdin
        #[arg(conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        /// Read the message text from a file
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Read new messages (default) or recent history
    Read {
        #[arg(short, long)]
        channel: String,
        #[arg(short, long)]
        agent: String,
        /// `new` or `history`
        #[arg(short, long)]
        mode: Option<String>,
        /// Maximum messages to return (never less than 20)
        #[arg(short, long, allow_hyphen_values = true)]
        limit: Option<String>,
    },
    /// List channels with their message counts
    Channels,
    /// Show a channel's size and latest messages
    Info { channel: String },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let agora = err.downcast_ref::<AgoraError>();
            match agora {
                Some(e) => render::print_error(format, e),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::from(exit_code(agora.map(AgoraError::kind)))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_service = match &cli.config {
        Some(path) => ConfigService::new(path),
        None => ConfigService::default_location()?,
    };
    let config = apply_cli(config_service.load()?, &cli);

    init_tracing(&config, cli.debug);
    tracing::debug!(config = %config_service.path().display(), "Loaded configuration");

    let format = OutputFormat::from_json_flag(cli.json);

    match cli.command {
        Commands::Send {
            channel,
            agent,
            text,
            file,
        } => {
            let body = commands::send::resolve_text(text.as_deref(), file.as_deref())?;
            let service = build_service(&config)?;
            commands::send::run(&service, format, &channel, &agent, &body).await
        }
        Commands::Read {
            channel,
            agent,
            mode,
            limit,
        } => {
            let service = build_service(&config)?;
            commands::read::run(&service, format, channel, agent, mode, limit).await
        }
        Commands::Channels => commands::channels::list(&build_service(&config)?, format).await,
        Commands::Info { channel } => {
            commands::channels::info(&build_service(&config)?, format, &channel).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config::init(&config_service),
            ConfigAction::Show => commands::config::show(&config),
        },
    }
}

/// Applies command-line overrides on top of file and environment settings.
fn apply_cli(mut config: AgoraConfig, cli: &Cli) -> AgoraConfig {
    if let Some(path) = &cli.data_file {
        config.data_file = Some(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config
}

// Filter: --debug > --log-level > AGORA_LOG > config file > "warn".
// Logs go to stderr so stdout stays parseable with --json.
fn init_tracing(config: &AgoraConfig, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}

fn build_service(config: &AgoraConfig) -> Result<ChannelService> {
    let repository = match &config.data_file {
        Some(path) => JsonSnapshotRepository::new(path),
        None => JsonSnapshotRepository::default_location()
            .context("Failed to resolve the default data file")?,
    };
    tracing::debug!(path = %repository.path().display(), "Using snapshot file");

    Ok(ChannelService::new(Arc::new(repository)).with_default_limit(config.default_limit))
}

fn exit_code(kind: Option<ErrorKind>) -> u8 {
    match kind {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::NotCaughtUp) => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(Some(ErrorKind::Validation)), 2);
        assert_eq!(exit_code(Some(ErrorKind::NotCaughtUp)), 3);
        assert_eq!(exit_code(Some(ErrorKind::Persistence)), 1);
        assert_eq!(exit_code(None), 1);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "agora",
            "--data-file",
            "/tmp/x.json",
            "--log-level",
            "info",
            "channels",
        ]);
        let config = apply_cli(AgoraConfig::default(), &cli);
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_send_requires_text_or_file() {
        assert!(Cli::try_parse_from(["agora", "send", "-c", "proj", "-a", "bob"]).is_err());
        assert!(
            Cli::try_parse_from(["agora", "send", "-c", "proj", "-a", "bob", "hi", "-f", "x"])
                .is_err()
        );
        let cli = Cli::try_parse_from(["agora", "send", "-c", "proj", "-a", "bob", "-"]).unwrap();
        match cli.command {
            Commands::Send { text, file, .. } => {
                assert_eq!(text.as_deref(), Some("-"));
                assert!(file.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_read_accepts_negative_limit() {
        let cli = Cli::try_parse_from([
            "agora", "read", "-c", "proj", "-a", "bob", "--limit", "-5",
        ])
        .unwrap();
        match cli.command {
            Commands::Read { limit, mode, .. } => {
                assert_eq!(limit.as_deref(), Some("-5"));
                assert!(mode.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
