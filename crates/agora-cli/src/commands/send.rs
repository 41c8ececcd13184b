use agora_application::ChannelService;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::render::{self, OutputFormat};

/// Picks the message body from `--file`, stdin (`-`) or the argument itself.
pub fn resolve_text(text: Option<&str>, file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read message file {}", path.display()));
    }
    match text {
        Some("-") => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read message from stdin")?;
            Ok(body)
        }
        Some(text) => Ok(text.to_string()),
        None => Ok(String::new()),
    }
}

pub async fn run(
    service: &ChannelService,
    format: OutputFormat,
    channel: &str,
    agent: &str,
    text: &str,
) -> Result<()> {
    let index = service.send(channel, agent, text).await?;
    println!("{}", render::sent(format, channel, index));
    Ok(())
}
