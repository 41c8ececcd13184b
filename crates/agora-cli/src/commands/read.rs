use agora_application::{ChannelService, ReadRequest, ReadResponse};
use anyhow::Result;

use crate::render::{self, OutputFormat};

pub async fn run(
    service: &ChannelService,
    format: OutputFormat,
    channel: String,
    agent: String,
    mode: Option<String>,
    limit: Option<String>,
) -> Result<()> {
    let request = ReadRequest {
        channel,
        agent,
        mode,
        limit,
    };
    let output = match service.read(&request).await? {
        ReadResponse::New(read) => render::new_messages(format, &request.channel, &read),
        ReadResponse::History(read) => render::history(format, &request.channel, &read),
    };
    println!("{output}");
    Ok(())
}
