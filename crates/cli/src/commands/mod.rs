pub mod chat;
pub mod serve;

use factquest_config::{AppConfig, Secrets};

/// Load configuration and insist on both API keys.
pub fn load_settings() -> Result<(AppConfig, Secrets), String> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let secrets = config.require_secrets().map_err(|e| e.to_string())?;
    Ok((config, secrets))
}
