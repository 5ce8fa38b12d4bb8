//! Configuration management

use crate::error::{Result, ShowreelError};
use crate::types::Config;
use crate::utils::paths::{ensure_dir, get_config_path};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;

/// Load configuration from the default location
pub async fn load_config() -> Result<Config> {
    load_config_from(Path::new(&get_config_path())).await
}

/// Load configuration from file, merging with defaults
pub async fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).await?;
    // Missing keys fall back to defaults via #[serde(default)]
    let config: Config = serde_json::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Reject values nothing downstream can work with
pub fn validate(config: &Config) -> Result<()> {
    if config.embed_timeout_secs == 0 {
        return Err(ShowreelError::InvalidConfig(
            "embed_timeout_secs must be at least 1".into(),
        ));
    }
    if config.default_category.trim().is_empty() {
        return Err(ShowreelError::InvalidConfig(
            "default_category must not be empty".into(),
        ));
    }
    if let Some(ref endpoint) = config.endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ShowreelError::InvalidConfig(format!(
                "endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }
    }
    Ok(())
}

/// Save configuration to file
pub async fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(&parent.to_string_lossy()).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content).await?;
    Ok(())
}

/// Open config file in editor
pub async fn edit_config(editor: &str) -> Result<()> {
    let config_path = get_config_path();

    // Ensure config file exists
    if !Path::new(&config_path).exists() {
        save_config_to(Path::new(&config_path), &Config::default()).await?;
    }

    Command::new(editor)
        .arg(&config_path)
        .status()
        .await?;

    Ok(())
}
