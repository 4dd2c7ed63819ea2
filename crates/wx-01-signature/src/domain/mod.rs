//! # Domain Layer
//!
//! Pure signature logic with no I/O dependencies.

pub mod entities;
pub mod errors;
pub mod verification;
