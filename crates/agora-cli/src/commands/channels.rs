use agora_application::ChannelService;
use anyhow::Result;

use crate::render::{self, OutputFormat};

pub async fn list(service: &ChannelService, format: OutputFormat) -> Result<()> {
    let channels = service.list_channels().await?;
    println!("{}", render::channels(format, &channels));
    Ok(())
}

pub async fn info(service: &ChannelService, format: OutputFormat, channel: &str) -> Result<()> {
    let info = service.channel_info(channel).await?;
    println!("{}", render::info(format, channel, info.as_ref()));
    Ok(())
}
