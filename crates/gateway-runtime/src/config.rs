//! Configuration loading: file, then environment, then command line.

use anyhow::{Context, Result};
use std::path::Path;
use wx_04_gateway::GatewayConfig;

/// Load and validate the gateway configuration.
///
/// Without a file the defaults are used, so the account must come from the
/// environment.
pub fn load_config<F>(path: Option<&Path>, port: Option<u16>, lookup: F) -> Result<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            parse_config(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => GatewayConfig::default(),
    };

    config
        .apply_env_overrides(lookup)
        .context("Invalid environment override")?;
    if let Some(port) = port {
        config.http.port = port;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Parse a TOML document into a configuration.
pub fn parse_config(raw: &str) -> Result<GatewayConfig> {
    Ok(toml::from_str(raw)?)
}
