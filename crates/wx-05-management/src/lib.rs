//! # Management Calls (WX-05)
//!
//! Outbound calls made on behalf of the account: the custom menu and
//! temporary media uploads. Every call takes its access token from the
//! credential cache (WX-03).
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Media kinds, upload results, errors
//! - **Ports Layer** (`ports/`): `ManagementApi`
//! - **Service Layer** (`service.rs`): `ManagementClient` over reqwest
//!
//! Media kinds outside image/voice/video/thumb are rejected when parsed,
//! before any request is made.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::errors::ManagementError;
pub use domain::media::{MediaKind, UploadedMedia};
pub use ports::inbound::ManagementApi;
pub use service::ManagementClient;
