//! TCP transport implementation
//!
//! DNP3 over TCP carries the same link frames as a serial line; the socket is
//! nothing more than the byte pipe the link layer reads from and writes to.

use crate::error::{Dnp3Error, Dnp3Result};
use crate::stream::{StreamAccessor, TransportLayer, not_connected};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// TCP transport settings
#[derive(Debug, Clone)]
pub struct TcpSettings {
    pub address: SocketAddr,
    pub timeout: Option<Duration>,
}

impl TcpSettings {
    /// Create new TCP settings with the default timeout
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Create TCP settings with an explicit timeout
    pub fn with_timeout(address: SocketAddr, timeout: Duration) -> Self {
        Self {
            address,
            timeout: Some(timeout),
        }
    }
}

/// TCP transport for a master or outstation channel
#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    settings: TcpSettings,
    closed: bool,
}

impl TcpTransport {
    /// Create a new TCP transport
    pub fn new(settings: TcpSettings) -> Self {
        Self {
            stream: None,
            settings,
            closed: true,
        }
    }

    /// Create a TCP transport from an address string
    pub fn from_address(address: &str) -> Dnp3Result<Self> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| Dnp3Error::InvalidData(format!("Invalid TCP address: {}", e)))?;
        Ok(Self::new(TcpSettings::new(addr)))
    }

    /// Wrap an already-accepted stream (listening outstation side)
    pub fn from_connected_stream(stream: TcpStream, timeout: Option<Duration>) -> Self {
        let settings = TcpSettings {
            address: stream.peer_addr().unwrap_or_else(|_| {
                SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 0)
            }),
            timeout,
        };
        Self {
            stream: Some(stream),
            settings,
            closed: false,
        }
    }
}

#[async_trait]
impl TransportLayer for TcpTransport {
    async fn open(&mut self) -> Dnp3Result<()> {
        if !self.closed {
            return Err(Dnp3Error::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Connection has already been opened",
            )));
        }

        let connect = TcpStream::connect(self.settings.address);
        let stream = if let Some(timeout) = self.settings.timeout {
            tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| Dnp3Error::Timeout)??
        } else {
            connect.await?
        };

        stream.set_nodelay(true)?;
        self.stream = Some(stream);
        self.closed = false;
        Ok(())
    }
}

#[async_trait]
impl StreamAccessor for TcpTransport {
    async fn set_timeout(&mut self, timeout: Option<Duration>) -> Dnp3Result<()> {
        self.settings.timeout = timeout;
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Dnp3Result<usize> {
        let timeout = self.settings.timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| not_connected("TCP stream"))?;

        let result = if let Some(timeout) = timeout {
            tokio::time::timeout(timeout, stream.read(buf))
                .await
                .map_err(|_| Dnp3Error::Timeout)?
                .map_err(Dnp3Error::Connection)
        } else {
            stream.read(buf).await.map_err(Dnp3Error::Connection)
        };

        match result {
            Ok(0) => {
                self.closed = true;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => {
                self.closed = true;
                Err(e)
            }
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Dnp3Result<usize> {
        let timeout = self.settings.timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| not_connected("TCP stream"))?;

        if let Some(timeout) = timeout {
            tokio::time::timeout(timeout, stream.write(buf))
                .await
                .map_err(|_| Dnp3Error::Timeout)?
                .map_err(Dnp3Error::Connection)
        } else {
            stream.write(buf).await.map_err(Dnp3Error::Connection)
        }
    }

    async fn flush(&mut self) -> Dnp3Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| not_connected("TCP stream"))?;
        stream.flush().await.map_err(Dnp3Error::Connection)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Dnp3Result<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_address() {
        let transport = TcpTransport::from_address("127.0.0.1:20000").unwrap();
        assert_eq!(transport.settings.address.port(), 20000);
        assert!(transport.is_closed());
    }

    #[test]
    fn test_invalid_address_rejected() {
        assert!(TcpTransport::from_address("not-an-address").is_err());
    }
}
