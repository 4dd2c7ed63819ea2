//! Domain types for the message gateway.

pub mod config;
pub mod context;
pub mod error;
