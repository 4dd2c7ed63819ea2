//! Cross-crate integration flows.

pub mod credential_flows;
pub mod webhook_flows;
