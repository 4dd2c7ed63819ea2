//! Domain types for management calls.

pub mod errors;
pub mod media;
