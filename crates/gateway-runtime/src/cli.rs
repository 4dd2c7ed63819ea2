//! Command line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Webhook gateway for a messaging platform account
#[derive(Parser, Debug)]
#[command(name = "wx-gateway")]
#[command(about = "Webhook gateway and management client for a platform account")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// HTTP port (overrides the file and WX_HTTP_PORT)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the webhook (default)
    Serve,

    /// Custom menu management
    #[command(subcommand)]
    Menu(MenuCommand),

    /// Temporary media management
    #[command(subcommand)]
    Media(MediaCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    /// Create the menu from a JSON file
    Create { file: PathBuf },
    /// Print the current menu
    Get,
    /// Delete the menu
    Delete,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    /// Upload temporary media (image, voice, video or thumb)
    Upload { kind: String, path: PathBuf },
}
