//! Ports layer for the envelope codec.

pub mod inbound;
