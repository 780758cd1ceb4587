//! dnp3_rs - Rust implementation of the DNP3 protocol
//!
//! This library implements the data link layer of the DNP3 SCADA protocol:
//! framing, CRC validation, control field interpretation, duplicate
//! detection, and deterministic resynchronization after corruption, over TCP
//! or serial transports.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `dnp3-core`: Core types, error handling, and link addresses
//! - `dnp3-transport`: Transport layer (TCP, Serial)
//! - `dnp3-link`: Data link layer (frames, parser, link state, channels)
//!
//! # Usage
//!
//! ```no_run
//! use dnp3::link::{LinkChannel, LinkChannelSettings};
//! use dnp3::transport::TcpTransport;
//!
//! # fn build() -> dnp3::Dnp3Result<()> {
//! let transport = TcpTransport::from_address("192.168.1.50:20000")?;
//! let channel = LinkChannel::new(transport, LinkChannelSettings::new(1));
//! # let _ = channel;
//! # Ok(())
//! # }
//! ```

// Re-export core types
pub use dnp3_core::address;
pub use dnp3_core::{Dnp3Error, Dnp3Result, FrameError};

// Re-export the link layer API
pub mod link {
    pub use dnp3_link::link::*;
}

// Re-export the transport API
pub mod transport {
    pub use dnp3_transport::*;
}
