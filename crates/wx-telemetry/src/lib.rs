//! # WX Telemetry
//!
//! Structured logging for the webhook gateway, built on `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wx_telemetry::{init_logging, TelemetryConfig};
//!
//! init_logging(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WX_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `WX_JSON_LOGS` | `false` | JSON output |
//! | `WX_SERVICE_NAME` | `wx-gateway` | Service name in the startup event |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}
