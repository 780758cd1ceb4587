//! Transport layer module for the DNP3 protocol stack
//!
//! This crate provides the physical byte streams the link layer runs over:
//! TCP and serial. The link layer treats both identically, as an opaque
//! ordered byte pipe.

pub mod error;
pub mod serial;
pub mod stream;
pub mod tcp;

pub use error::{Dnp3Error, Dnp3Result};
pub use serial::{SerialSettings, SerialTransport};
pub use stream::{StreamAccessor, TransportLayer};
pub use tcp::{TcpSettings, TcpTransport};
