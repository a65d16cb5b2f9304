//! # Domain Layer for Reply Correlation
//!
//! Owned state and pure logic with no I/O dependencies.
//!
//! ## Contents
//!
//! - **entities**: Pending callbacks, listener entries, and the observer
//!   traits the chain stores
//! - **id**: The correlation identifier generator
//! - **registry**: The dual-indexed TTL'd callback store
//! - **chain**: The copy-on-write listener chain
//! - **invariants**: Consistency checks over the registry indexes
//!
//! ## Design Principles
//!
//! 1. **No I/O**: Everything here is synchronous; no operation blocks on
//!    anything but its own short-lived lock
//! 2. **No External Dependencies**: Only depends on stanza-types
//! 3. **Explicit Ownership**: No process-wide singletons; every piece is an
//!    owned value composed by the service

mod chain;
mod entities;
mod id;
mod invariants;
mod registry;

pub use chain::*;
pub use entities::*;
pub use id::*;
pub use invariants::*;
pub use registry::*;
