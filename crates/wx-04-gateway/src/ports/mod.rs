//! Ports for the message gateway.

pub mod inbound;
pub mod outbound;
