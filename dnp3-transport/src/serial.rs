//! Serial port transport implementation

use crate::error::{Dnp3Error, Dnp3Result};
use crate::stream::{StreamAccessor, TransportLayer, not_connected};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Serial port transport settings
///
/// Defaults to 8N1 with no flow control, the usual field wiring for DNP3
/// outstations.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
    pub timeout: Option<Duration>,
}

impl SerialSettings {
    /// Create new serial settings with default line parameters
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        Self {
            port_name,
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Create serial settings with an explicit timeout
    pub fn with_timeout(port_name: String, baud_rate: u32, timeout: Duration) -> Self {
        let mut settings = Self::new(port_name, baud_rate);
        settings.timeout = Some(timeout);
        settings
    }
}

/// Serial port transport for a master or outstation channel
pub struct SerialTransport {
    stream: Option<SerialStream>,
    settings: SerialSettings,
    closed: bool,
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.settings.port_name)
            .field("baud_rate", &self.settings.baud_rate)
            .field("closed", &self.closed)
            .finish()
    }
}

impl SerialTransport {
    /// Create a new serial transport
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            stream: None,
            settings,
            closed: true,
        }
    }

    /// Create a serial transport from a port name and baud rate
    pub fn new_simple(port_name: String, baud_rate: u32) -> Self {
        Self::new(SerialSettings::new(port_name, baud_rate))
    }
}

#[async_trait]
impl TransportLayer for SerialTransport {
    async fn open(&mut self) -> Dnp3Result<()> {
        if !self.closed {
            return Err(Dnp3Error::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Connection has already been opened",
            )));
        }

        let stream = tokio_serial::new(&self.settings.port_name, self.settings.baud_rate)
            .data_bits(self.settings.data_bits)
            .stop_bits(self.settings.stop_bits)
            .parity(self.settings.parity)
            .flow_control(self.settings.flow_control)
            .open_native_async()
            .map_err(|e| {
                Dnp3Error::Connection(std::io::Error::other(format!(
                    "Failed to open serial port {}: {}",
                    self.settings.port_name, e
                )))
            })?;

        self.stream = Some(stream);
        self.closed = false;
        Ok(())
    }
}

#[async_trait]
impl StreamAccessor for SerialTransport {
    async fn set_timeout(&mut self, timeout: Option<Duration>) -> Dnp3Result<()> {
        self.settings.timeout = timeout;
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Dnp3Result<usize> {
        let timeout = self.settings.timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| not_connected("Serial port"))?;

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
            .ok_or_else(|| not_connected("Serial port"))?;

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
            .ok_or_else(|| not_connected("Serial port"))?;
        stream.flush().await.map_err(Dnp3Error::Connection)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Dnp3Result<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush().await;
        }
        self.closed = true;
        Ok(())
    }
}
