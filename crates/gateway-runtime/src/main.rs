//! `wx-gateway` entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use gateway_runtime::{load_config, Args, AutoReplyHandler, Command, GatewayRuntime};
use wx_telemetry::{init_logging, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&TelemetryConfig::from_env()).context("Failed to initialize logging")?;

    // Load configuration
    let config = load_config(args.config.as_deref(), args.port, |key| {
        std::env::var(key).ok()
    })?;
    let runtime = GatewayRuntime::new(config)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let handler = Arc::new(AutoReplyHandler::default());
            runtime
                .serve(handler, async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!(error = %e, "Failed to listen for Ctrl+C");
                        std::future::pending::<()>().await;
                    }
                    info!("Shutdown signal received");
                })
                .await?;
        }
        Command::Menu(command) => println!("{}", runtime.run_menu(&command).await?),
        Command::Media(command) => println!("{}", runtime.run_media(&command).await?),
    }

    Ok(())
}
