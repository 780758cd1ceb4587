//! Link channel management
//!
//! A channel binds one transport stream to one parser instance. Every
//! channel owns its accumulator and link state exclusively, so concurrent
//! channels to different stations never interfere.

use crate::error::Dnp3Result;
use crate::link::frame::{LinkFrame, MAX_FRAME_SIZE};
use crate::link::listener::{ErrorReporter, FrameSink};
use crate::link::parser::LinkParser;
use crate::link::statistics::LinkStatistics;
use dnp3_core::address;
use dnp3_transport::{StreamAccessor, TransportLayer};

/// Link channel settings
#[derive(Debug, Clone)]
pub struct LinkChannelSettings {
    /// This station's link address; frames for other stations are dropped
    pub local_address: u16,
    /// Accept frames sent to the broadcast addresses
    pub accept_broadcast: bool,
    /// Accept frames sent to the self-address
    pub accept_self_address: bool,
}

impl LinkChannelSettings {
    /// Create settings for a station address with the default acceptance
    /// rules
    pub fn new(local_address: u16) -> Self {
        Self {
            local_address,
            accept_broadcast: true,
            accept_self_address: false,
        }
    }

    /// Whether a frame with this destination should reach the sink
    pub fn accepts(&self, destination: u16) -> bool {
        destination == self.local_address
            || (self.accept_broadcast && address::is_broadcast(destination))
            || (self.accept_self_address && address::is_self_address(destination))
    }
}

/// Drops validated frames addressed to other stations before they reach the
/// upper layer
struct AddressFilter<'a, S: FrameSink + ?Sized> {
    settings: &'a LinkChannelSettings,
    inner: &'a mut S,
}

impl<S: FrameSink + ?Sized> FrameSink for AddressFilter<'_, S> {
    fn on_frame(&mut self, frame: &LinkFrame) {
        if self.settings.accepts(frame.destination()) {
            self.inner.on_frame(frame);
        } else {
            log::debug!(
                "dropping frame addressed to station {}",
                frame.destination()
            );
        }
    }
}

/// One logical link channel over a transport stream
pub struct LinkChannel<T: TransportLayer> {
    transport: T,
    parser: LinkParser,
    settings: LinkChannelSettings,
}

impl<T: TransportLayer> LinkChannel<T> {
    /// Create a channel over a transport
    pub fn new(transport: T, settings: LinkChannelSettings) -> Self {
        Self {
            transport,
            parser: LinkParser::new(),
            settings,
        }
    }

    /// Open the underlying transport
    pub async fn open(&mut self) -> Dnp3Result<()> {
        self.transport.open().await?;
        log::info!("link channel open for station {}", self.settings.local_address);
        Ok(())
    }

    /// Close the transport and discard all accumulated link state
    pub async fn close(&mut self) -> Dnp3Result<()> {
        self.parser.reset();
        self.transport.close().await
    }

    /// Encode a frame and hand it to the transport for transmission
    pub async fn send(&mut self, frame: &LinkFrame) -> Dnp3Result<()> {
        let bytes = frame.encode()?;
        self.transport.write_all(&bytes).await?;
        self.transport.flush().await?;
        self.parser.statistics_mut().increment_frames_sent();
        log::trace!("sent {}", frame);
        Ok(())
    }

    /// Push externally received bytes through the parser
    ///
    /// Frames addressed to other stations are dropped; everything else is
    /// delivered synchronously to `sink` and `reporter` in stream order.
    pub fn supply<S, R>(&mut self, data: &[u8], sink: &mut S, reporter: &mut R)
    where
        S: FrameSink + ?Sized,
        R: ErrorReporter + ?Sized,
    {
        let mut filter = AddressFilter {
            settings: &self.settings,
            inner: sink,
        };
        self.parser.supply(data, &mut filter, reporter);
    }

    /// Read one chunk from the transport and run it through the parser
    ///
    /// # Returns
    ///
    /// `false` when the remote station closed the stream.
    pub async fn poll_once<S, R>(&mut self, sink: &mut S, reporter: &mut R) -> Dnp3Result<bool>
    where
        S: FrameSink + ?Sized,
        R: ErrorReporter + ?Sized,
    {
        let mut chunk = [0u8; MAX_FRAME_SIZE];
        let n = self.transport.read(&mut chunk).await?;
        if n == 0 {
            return Ok(false);
        }
        self.supply(&chunk[..n], sink, reporter);
        Ok(true)
    }

    /// Drive the receive loop until the remote station closes the stream
    pub async fn run<S, R>(&mut self, sink: &mut S, reporter: &mut R) -> Dnp3Result<()>
    where
        S: FrameSink + ?Sized,
        R: ErrorReporter + ?Sized,
    {
        while self.poll_once(sink, reporter).await? {}
        log::info!("link channel closed by remote station");
        Ok(())
    }

    /// Channel statistics
    pub fn statistics(&self) -> &LinkStatistics {
        self.parser.statistics()
    }

    /// The channel's parser
    pub fn parser(&self) -> &LinkParser {
        &self.parser
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The channel settings
    pub fn settings(&self) -> &LinkChannelSettings {
        &self.settings
    }
}
