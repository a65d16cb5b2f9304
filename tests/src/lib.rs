//! # Stanza Relay Test Suite
//!
//! Unified test crate containing the cross-component tests:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── correlation_flow.rs     # End-to-end send/reply flows
//!     ├── listener_chaos.rs       # Chain mutation under concurrent dispatch
//!     └── registry_consistency.rs # Randomized dual-index consistency
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p stanza-tests
//!
//! # By category
//! cargo test -p stanza-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;
