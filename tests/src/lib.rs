//! # WX Gateway Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/            # Criterion benchmarks (signature, envelope)
//! └── src/integration/    # Cross-crate flows
//!     ├── webhook_flows.rs     # HTTP router → gateway → codec → handler
//!     └── credential_flows.rs  # Issuer → cache → management client
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wx-tests
//! cargo test -p wx-tests integration::webhook_flows
//! cargo bench -p wx-tests
//! ```

#![allow(dead_code)]

pub mod integration;
