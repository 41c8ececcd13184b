use agora_core::config::AgoraConfig;
use agora_infrastructure::ConfigService;
use anyhow::{Context, Result};

pub fn init(service: &ConfigService) -> Result<()> {
    if service.init()? {
        println!("Wrote default config to {}", service.path().display());
    } else {
        println!("Config already exists at {}", service.path().display());
    }
    Ok(())
}

pub fn show(config: &AgoraConfig) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &AgoraConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}
