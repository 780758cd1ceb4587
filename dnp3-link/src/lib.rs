//! Data link layer for the DNP3 protocol
//!
//! This crate turns the raw byte stream of a transport into validated link
//! frames and back:
//!
//! - `LinkParser` accumulates arbitrarily-chunked bytes, locates frame
//!   boundaries, validates header and body CRCs, interprets the control
//!   field, and recovers deterministically from corruption.
//! - `LinkFrame` models one parsed frame and encodes itself back to wire
//!   bytes through the same CRC engine.
//! - `LinkStateTracker` keeps the per-remote frame count bit expectation
//!   used to detect duplicated confirmed transfers.
//! - `LinkChannel` binds a parser to a transport stream, one channel per
//!   remote connection.

pub mod error;
pub mod link;

pub use error::{Dnp3Error, Dnp3Result, FrameError};
pub use link::*;
