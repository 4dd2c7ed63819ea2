//! Adapters for the credential cache's outbound ports.

pub mod http_issuer;
