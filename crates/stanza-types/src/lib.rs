//! # Stanza Types Crate
//!
//! This crate contains the stanza and attribute types shared between the
//! correlation client and any transport binding built around it.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All wire-facing types are defined here.
//! - **Opaque Payloads**: The client never interprets a stanza body; it only
//!   reads and writes the `id` attribute used for reply correlation.
//! - **Codec-Agnostic**: Parsing and serializing the wire format is the
//!   transport binding's job; these types only need to round-trip it.

pub mod errors;
pub mod stanza;

pub use errors::TransportError;
pub use stanza::{Attribute, Stanza, StanzaKind, ID_ATTRIBUTE};
