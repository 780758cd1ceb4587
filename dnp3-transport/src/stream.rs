//! Physical stream access traits
//!
//! The link layer never performs I/O itself: it consumes bytes pushed up from
//! one of these streams and hands built frames back down for transmission.

use crate::error::{Dnp3Error, Dnp3Result};
use async_trait::async_trait;
use std::time::Duration;

/// Access to the physical byte stream of one channel (TCP socket or serial
/// port) connecting this station to a remote station
#[async_trait]
pub trait StreamAccessor: Send + Sync {
    /// Set the read/write timeout. `None` means wait indefinitely.
    async fn set_timeout(&mut self, timeout: Option<Duration>) -> Dnp3Result<()>;

    /// Read whatever bytes are available into `buf`
    ///
    /// # Returns
    ///
    /// Number of bytes read; 0 signals that the remote station closed the
    /// stream.
    async fn read(&mut self, buf: &mut [u8]) -> Dnp3Result<usize>;

    /// Read until `buf` is filled completely
    async fn read_exact(&mut self, mut buf: &mut [u8]) -> Dnp3Result<()> {
        while !buf.is_empty() {
            let n = self.read(buf).await?;
            if n == 0 {
                return Err(Dnp3Error::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "Stream closed before the requested bytes arrived",
                )));
            }
            buf = &mut buf[n..];
        }
        Ok(())
    }

    /// Write data to the stream
    ///
    /// # Returns
    ///
    /// Number of bytes accepted by the stream.
    async fn write(&mut self, buf: &[u8]) -> Dnp3Result<usize>;

    /// Write the whole of `buf` to the stream
    async fn write_all(&mut self, buf: &[u8]) -> Dnp3Result<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = self.write(&buf[written..]).await?;
            if n == 0 {
                return Err(Dnp3Error::Connection(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "Stream refused further bytes",
                )));
            }
            written += n;
        }
        Ok(())
    }

    /// Flush any buffered outgoing data
    async fn flush(&mut self) -> Dnp3Result<()>;

    /// Check if the stream is closed
    fn is_closed(&self) -> bool;

    /// Close the stream
    async fn close(&mut self) -> Dnp3Result<()>;
}

/// A stream that can also establish its own connection
#[async_trait]
pub trait TransportLayer: StreamAccessor {
    /// Open the physical layer connection
    async fn open(&mut self) -> Dnp3Result<()>;
}

/// Error value for operations attempted before the stream is connected
pub(crate) fn not_connected(what: &str) -> Dnp3Error {
    Dnp3Error::Connection(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        format!("{} is not connected", what),
    ))
}
