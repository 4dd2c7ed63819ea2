//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that the gateway uses

pub mod inbound;
