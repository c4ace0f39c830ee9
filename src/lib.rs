//! Host-side driver for Shtrih-M style fiscal cash registers ("KKT") that
//! speak a binary request/response protocol over an RS-232 serial link.
//!
//! The entry point is [`Session`]: construct one with [`Session::connect`]
//! (or [`Session::new`] over a custom [`RawPort`] for testing) and call its
//! per-command methods. The transport underneath handles the ENQ/ACK/NAK
//! handshake, framing, retries, and busy backoff transparently; callers
//! only see a [`KktError`] on failure.
//!
//! This crate does not install a `tracing` subscriber, read configuration
//! files, or expose an HTTP surface — those are a caller's concern for any
//! binary or service that embeds this library.

pub mod codec;
pub mod command_code;
pub mod commands;
pub mod constants;
pub mod error;
pub mod error_catalog;
pub mod serial;
pub mod transport;

pub use codec::Password;
pub use command_code::CommandCode;
pub use commands::{
    CloseReceiptArgs, CloseReceiptResult, DeviceIdentity, DiscountArgs, DiscountResult,
    ExtendedCloseArgs, SaleArgs, SaleResult, Session, SessionConfig,
};
pub use error::KktError;
pub use serial::{RawPort, SerialLink};
pub use transport::{Params, ResponseFrame, Transport};
