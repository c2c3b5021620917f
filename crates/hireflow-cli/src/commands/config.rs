use anyhow::{Context, Result};
use hireflow_infrastructure::ConfigService;

const MASK: &str = "********";

pub fn show(config_service: &ConfigService) -> Result<()> {
    let mut config = config_service.get_config();
    if config.backend.api_token.is_some() {
        config.backend.api_token = Some(MASK.to_string());
    }

    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

pub fn path(config_service: &ConfigService) -> Result<()> {
    let path = config_service.config_path()?;
    let marker = if path.exists() { "" } else { " (not created yet)" };
    println!("{}{}", path.display(), marker);
    Ok(())
}

pub fn init(config_service: &ConfigService) -> Result<()> {
    let path = config_service.config_path()?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    let written = config_service.write_default()?;
    println!("✅ Wrote default config to {}", written.display());
    Ok(())
}
