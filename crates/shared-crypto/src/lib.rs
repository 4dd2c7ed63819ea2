//! # Shared Crypto - Gateway Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-1 over sorted parts | Webhook and envelope signatures |
//! | `symmetric` | AES-256-CBC, PKCS#7 (32-byte blocks) | Safe-mode payloads |
//! | `compare` | Constant-time equality | Signature comparison |
//!
//! ## Security Properties
//!
//! - The signature scheme is the platform's: an unkeyed SHA-1 digest over the
//!   lexicographically sorted parts. It is reproduced as-is for compatibility.
//! - The AES key is derived from the 43-character EncodingAESKey; the IV is
//!   the first 16 bytes of the key, as the platform mandates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compare;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use compare::constant_time_compare;
pub use errors::CryptoError;
pub use hashing::{sha1_hex, sorted_digest};
pub use symmetric::{decrypt, encrypt, SecretKey, PKCS7_BLOCK_SIZE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
