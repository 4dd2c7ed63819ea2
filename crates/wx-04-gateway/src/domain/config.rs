//! Gateway configuration with validation.
//!
//! Loaded from TOML; every section has defaults so a file only needs the
//! `[account]` table. Environment overrides are applied on top by the
//! runtime before validation.

use serde::{Deserialize, Serialize};
use shared_types::{AccountConfig, ConfigurationError};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Platform account (validated into an [`AccountConfig`])
    pub account: AccountSettings,
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Request limits
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Credential issuance
    pub credentials: CredentialsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.account_config()?;

        if self.limits.max_body_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_size cannot be 0".into(),
            ));
        }

        if self.timeouts.body_read.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "body_read timeout cannot be 0".into(),
            ));
        }
        if self.timeouts.handler.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "handler timeout cannot be 0".into(),
            ));
        }
        if self.credentials.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "credential request timeout cannot be 0".into(),
            ));
        }

        if !self.http.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "webhook path must start with '/': {:?}",
                self.http.path
            )));
        }
        if !(self.credentials.api_base_url.starts_with("http://")
            || self.credentials.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL: {:?}",
                self.credentials.api_base_url
            )));
        }

        Ok(())
    }

    /// Build the validated account configuration.
    pub fn account_config(&self) -> Result<AccountConfig, ConfigError> {
        let a = &self.account;
        Ok(AccountConfig::new(
            a.app_id.clone(),
            a.app_secret.clone(),
            a.token.clone(),
            a.safe_mode,
            a.encoding_aes_key.clone(),
        )?)
    }

    /// Apply `WX_*` overrides from `lookup` (usually `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WX_APP_ID") {
            self.account.app_id = v;
        }
        if let Some(v) = lookup("WX_APP_SECRET") {
            self.account.app_secret = v;
        }
        if let Some(v) = lookup("WX_TOKEN") {
            self.account.token = v;
        }
        if let Some(v) = lookup("WX_ENCODING_AES_KEY") {
            self.account.encoding_aes_key = Some(v);
        }
        if let Some(v) = lookup("WX_SAFE_MODE") {
            self.account.safe_mode = parse_bool(&v).ok_or_else(|| {
                ConfigError::Invalid(format!("WX_SAFE_MODE is not a boolean: {v:?}"))
            })?;
        }
        if let Some(v) = lookup("WX_HTTP_PORT") {
            self.http.port = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("WX_HTTP_PORT is not a port: {v:?}")))?;
        }
        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Unvalidated account section as written in the config file.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    pub app_id: String,
    pub app_secret: String,
    pub token: String,
    pub safe_mode: bool,
    pub encoding_aes_key: Option<String>,
}

impl std::fmt::Debug for AccountSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSettings")
            .field("app_id", &self.app_id)
            .field("safe_mode", &self.safe_mode)
            .finish_non_exhaustive()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3000)
    pub port: u16,
    /// Webhook route
    pub path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            path: "/wechat".to_string(),
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max webhook body size in bytes (default: 1MB)
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Budget for reading the whole request body
    #[serde(with = "humantime_serde")]
    pub body_read: Duration,
    /// Budget for the application handler
    #[serde(with = "humantime_serde")]
    pub handler: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            body_read: Duration::from_secs(10),
            handler: Duration::from_secs(5),
        }
    }
}

/// Credential issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Platform API host
    pub api_base_url: String,
    /// Subtracted from the platform TTL
    #[serde(with = "humantime_serde")]
    pub expiry_margin: Duration,
    /// Per-request timeout for issuer calls
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.weixin.qq.com".to_string(),
            expiry_margin: Duration::from_secs(20),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Configuration error
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid account section
    #[error("invalid account: {0}")]
    Account(#[from] ConfigurationError),
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Secs(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(s) => parse_duration(&s).map_err(serde::de::Error::custom),
        }
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s" and "m"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            // Try parsing as plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
