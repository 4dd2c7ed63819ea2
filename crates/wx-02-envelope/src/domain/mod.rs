//! # Domain Layer
//!
//! XML handling, payload framing and reply templates. No I/O.

pub mod errors;
pub mod frame;
pub mod message;
pub mod reply;
pub mod xml;
