//! Error types for the transport layer

pub use dnp3_core::error::{Dnp3Error, Dnp3Result};
