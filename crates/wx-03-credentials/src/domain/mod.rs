//! # Domain Layer
//!
//! Credential values and their expiry rules. No I/O.

pub mod credential;
pub mod errors;
