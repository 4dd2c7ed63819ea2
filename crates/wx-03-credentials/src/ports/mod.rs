//! Ports layer for the credential cache.

pub mod inbound;
pub mod outbound;
