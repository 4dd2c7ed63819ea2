//! # WX Gateway Runtime
//!
//! Process wiring for the webhook gateway.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line
//! 2. Initialize logging from the environment
//! 3. Load configuration (file, then `WX_*` variables, then flags)
//! 4. Build the credential cache and management client
//! 5. Serve the webhook, or run a one-shot management command

pub mod cli;
pub mod config;
pub mod handler;
pub mod runtime;

pub use cli::{Args, Command, MediaCommand, MenuCommand};
pub use config::{load_config, parse_config};
pub use handler::AutoReplyHandler;
pub use runtime::GatewayRuntime;
