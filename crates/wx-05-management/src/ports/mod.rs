//! Ports for management calls.

pub mod inbound;
