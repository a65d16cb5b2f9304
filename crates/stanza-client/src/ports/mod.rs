//! Ports for the correlation client.
//!
//! - **inbound**: API traits the service implements (send path, dispatch
//!   entry point)
//! - **outbound**: SPI traits the host implements (transport session,
//!   session-bind listener)

pub mod inbound;
pub mod outbound;
