#![allow(missing_docs)]

//! WX-04 Message Gateway - the webhook endpoint the platform calls.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     MESSAGE GATEWAY (wx-04)                   │
//! ├───────────────────────────────────────────────────────────────┤
//! │   HTTP request ──► MessageGatewayLayer                        │
//! │                      │  query → authenticate (wx-01)          │
//! │      ┌───────────────┼─────────────────┐                      │
//! │      ▼               ▼                 ▼                      │
//! │  pass through     echo (GET)       read body (POST)           │
//! │  to inner svc                          │                      │
//! │                                        ▼                      │
//! │                        decrypt / parse (wx-02)                │
//! │                                        ▼                      │
//! │                           MessageHandler (app)                │
//! │                                        ▼                      │
//! │                        render + encrypt reply (wx-02)         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use wx_04_gateway::{GatewayConfig, GatewayService, HandlerFn};
//!
//! let handler = Arc::new(HandlerFn(|msg: StructuredMessage| async move {
//!     Ok(msg.content().map(|c| ReplyContent::text(c)))
//! }));
//! let service = GatewayService::new(config, handler)?;
//! service.start(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```
//!
//! # Responses
//!
//! - Unauthenticated requests go to the inner service untouched.
//! - Verified GET: `echostr` echoed as `text/plain`.
//! - Verified POST: the reply XML, or `success` when the handler has nothing.
//! - Integrity failures: 401 with an empty body.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod gateway;
pub mod middleware;
pub mod ports;
pub mod service;

// Re-exports for public API
pub use domain::config::{
    AccountSettings, ConfigError, CredentialsConfig, GatewayConfig, HttpConfig, LimitsConfig,
    TimeoutConfig,
};
pub use domain::context::InboundRequestContext;
pub use domain::error::{GatewayError, ProcessError};
pub use gateway::{Authentication, GatewayReply, MessageGateway, NO_REPLY_BODY};
pub use middleware::{MessageGatewayLayer, MessageGatewayService};
pub use ports::inbound::{HandlerFn, MessageHandler};
pub use ports::outbound::{SystemTimeSource, TimeSource};
pub use service::GatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
