//! # Rosca Pool Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Harness: in-memory custody, manual clock, event sink
//! │
//! ├── exploits/         # Attack simulations
//! │   ├── reentrancy.rs # Recipient hooks calling back into the pool
//! │   └── contention.rs # Concurrent callers on cloned handles
//! │
//! └── integration/      # End-to-end pool scenarios
//!     ├── full_rosca.rs
//!     ├── lifecycle.rs
//!     └── properties.rs # Seeded random operations + conservation audit
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p rosca-tests
//!
//! # By category
//! cargo test -p rosca-tests integration::
//! cargo test -p rosca-tests exploits::
//!
//! # With logs
//! RUST_LOG=rosca_pool=debug cargo test -p rosca-tests -- --nocapture
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod exploits;
