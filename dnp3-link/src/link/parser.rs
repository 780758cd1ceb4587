//! Link frame parser
//!
//! Turns the unbounded, arbitrarily-chunked byte stream delivered by a
//! transport into discrete validated frames. The parser is a synchronous
//! push-driven state machine: `supply` is called once per received chunk and
//! drives scanning, header and body validation, and control field
//! interpretation as far as the buffered bytes allow, emitting zero or more
//! frames and errors per call. A trailing partial frame is retained verbatim
//! for the next call.
//!
//! Recovery is deterministic. A failure detected before the header CRC has
//! proven the length field (bad header CRC, bad length) discards a single
//! byte and rescans, so a genuine frame immediately following corruption is
//! never lost. A failure detected after the header CRC passed discards the
//! whole declared frame, since the length field itself is then trustworthy.

use bytes::{Buf, BytesMut};

use crate::error::FrameError;
use crate::link::crc;
use crate::link::frame::{
    BLOCK_SIZE, ControlField, HEADER_SIZE, LinkFrame, LinkFunction, MIN_LENGTH, SYNC0, SYNC1,
    body_wire_size,
};
use crate::link::listener::{ErrorReporter, FrameSink};
use crate::link::state::LinkStateTracker;
use crate::link::statistics::LinkStatistics;

/// Fixed header fields retained while the body is still arriving
#[derive(Debug, Clone, Copy)]
struct LinkHeader {
    length: u8,
    control: ControlField,
    function: LinkFunction,
    destination: u16,
    source: u16,
}

/// Parser state between `supply` calls
#[derive(Debug, Clone, Copy)]
enum ParserState {
    /// Scanning byte-by-byte for the 05 64 sync pattern
    FindSync,
    /// Sync at the head of the buffer, waiting for the full 10-byte header
    ReadHeader,
    /// Header validated, waiting for the declared body blocks
    ReadBody(LinkHeader),
    /// Dropping the body of a frame rejected after header validation
    Discard(usize),
}

/// Link frame parser for one channel
///
/// Owns the receive accumulator and the per-remote link state; channels never
/// share a parser. Safe to re-invoke once per delivered chunk in a single
/// execution context.
#[derive(Debug)]
pub struct LinkParser {
    buffer: BytesMut,
    state: ParserState,
    tracker: LinkStateTracker,
    statistics: LinkStatistics,
    /// Stream offset of the first byte currently buffered
    offset: u64,
}

impl LinkParser {
    /// Create a new parser with empty state
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            state: ParserState::FindSync,
            tracker: LinkStateTracker::new(),
            statistics: LinkStatistics::new(),
            offset: 0,
        }
    }

    /// Push newly received bytes through the parser
    ///
    /// Processes as much of the accumulated buffer as forms complete frames.
    /// Validated frames go to `sink` and rejected frames to `reporter`,
    /// interleaved in stream order; a single call may produce zero, one, or
    /// many of each.
    pub fn supply<S, R>(&mut self, data: &[u8], sink: &mut S, reporter: &mut R)
    where
        S: FrameSink + ?Sized,
        R: ErrorReporter + ?Sized,
    {
        self.buffer.extend_from_slice(data);

        loop {
            match self.state {
                ParserState::FindSync => {
                    while self.buffer.len() >= 2
                        && !(self.buffer[0] == SYNC0 && self.buffer[1] == SYNC1)
                    {
                        self.discard(1);
                    }
                    if self.buffer.len() < 2 {
                        return;
                    }
                    self.state = ParserState::ReadHeader;
                }
                ParserState::ReadHeader => {
                    if self.buffer.len() < HEADER_SIZE {
                        return;
                    }
                    self.read_header(sink, reporter);
                }
                ParserState::ReadBody(header) => {
                    if !self.read_body(header, sink, reporter) {
                        return;
                    }
                }
                ParserState::Discard(remaining) => {
                    let n = remaining.min(self.buffer.len());
                    self.discard(n);
                    if n < remaining {
                        self.state = ParserState::Discard(remaining - n);
                        return;
                    }
                    self.state = ParserState::FindSync;
                }
            }
        }
    }

    /// Discard all accumulated bytes and link state
    ///
    /// Used when a channel is torn down; statistics are left intact.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = ParserState::FindSync;
        self.tracker.clear();
        self.offset = 0;
    }

    /// Number of unconsumed bytes retained for the next `supply` call
    pub fn retained(&self) -> usize {
        self.buffer.len()
    }

    /// Channel statistics
    pub fn statistics(&self) -> &LinkStatistics {
        &self.statistics
    }

    /// Mutable channel statistics
    pub fn statistics_mut(&mut self) -> &mut LinkStatistics {
        &mut self.statistics
    }

    /// Per-remote link state
    pub fn tracker(&self) -> &LinkStateTracker {
        &self.tracker
    }

    /// Validate the complete buffered header and decide what comes next
    fn read_header<S, R>(&mut self, sink: &mut S, reporter: &mut R)
    where
        S: FrameSink + ?Sized,
        R: ErrorReporter + ?Sized,
    {
        if !crc::check(&self.buffer[0..8], self.buffer[8], self.buffer[9]) {
            // A spurious sync pattern one byte before a genuine one lands
            // here; dropping a single byte lets the rescan find the real
            // frame start.
            self.report(FrameError::BadHeaderCrc, reporter);
            self.discard(1);
            self.state = ParserState::FindSync;
            return;
        }

        let length = self.buffer[2];
        if length < MIN_LENGTH {
            self.report(FrameError::BadLength, reporter);
            self.discard(1);
            self.state = ParserState::FindSync;
            return;
        }

        let control = ControlField::from_byte(self.buffer[3]);
        let destination = u16::from_le_bytes([self.buffer[4], self.buffer[5]]);
        let source = u16::from_le_bytes([self.buffer[6], self.buffer[7]]);
        let payload_len = (length - MIN_LENGTH) as usize;

        match self.interpret_control(control, payload_len, source) {
            Ok(function) => {
                let header = LinkHeader {
                    length,
                    control,
                    function,
                    destination,
                    source,
                };
                if payload_len == 0 {
                    self.consume(HEADER_SIZE);
                    self.accept(header, Vec::new(), sink);
                    self.state = ParserState::FindSync;
                } else {
                    self.state = ParserState::ReadBody(header);
                }
            }
            Err(error) => {
                // The header CRC proved the length field, so the whole
                // declared frame can be skipped safely.
                self.report(error, reporter);
                self.discard(HEADER_SIZE);
                self.state = if payload_len == 0 {
                    ParserState::FindSync
                } else {
                    ParserState::Discard(body_wire_size(payload_len))
                };
            }
        }
    }

    /// Validate the declared body blocks once they are fully buffered
    ///
    /// Returns false if the parser must suspend for more bytes.
    fn read_body<S, R>(&mut self, header: LinkHeader, sink: &mut S, reporter: &mut R) -> bool
    where
        S: FrameSink + ?Sized,
        R: ErrorReporter + ?Sized,
    {
        let payload_len = (header.length - MIN_LENGTH) as usize;
        let body_len = body_wire_size(payload_len);
        if self.buffer.len() < HEADER_SIZE + body_len {
            return false;
        }

        let parsed = parse_body(
            &self.buffer[HEADER_SIZE..HEADER_SIZE + body_len],
            payload_len,
        );
        match parsed {
            Ok(payload) => {
                self.consume(HEADER_SIZE + body_len);
                self.accept(header, payload, sink);
            }
            Err(error) => {
                self.report(error, reporter);
                self.discard(HEADER_SIZE + body_len);
            }
        }
        self.state = ParserState::FindSync;
        true
    }

    /// Decode and validate the control field against the protocol rules
    ///
    /// Checks run in a fixed order and the first violation wins: unknown
    /// function, payload presence, FCV expectation, FCB expectation. Nothing
    /// is mutated here; link state changes only when the frame is accepted.
    fn interpret_control(
        &self,
        control: ControlField,
        payload_len: usize,
        source: u16,
    ) -> Result<LinkFunction, FrameError> {
        let function = control.function().ok_or(FrameError::UnknownFunction)?;

        if function.carries_user_data() {
            if payload_len == 0 {
                return Err(FrameError::NoData);
            }
        } else if payload_len != 0 {
            return Err(FrameError::UnexpectedData);
        }

        match function.requires_fcv() {
            Some(expected) => {
                if control.fcv != expected {
                    return Err(FrameError::UnexpectedFcv);
                }
                if control.fcv && control.fcb != self.tracker.expected_fcb(source, control.dir) {
                    return Err(FrameError::UnexpectedFcb);
                }
            }
            None => {
                // Secondary frames never carry a frame count bit
                if control.fcb {
                    return Err(FrameError::UnexpectedFcb);
                }
            }
        }

        Ok(function)
    }

    /// Update link state and hand the validated frame to the sink
    fn accept<S>(&mut self, header: LinkHeader, payload: Vec<u8>, sink: &mut S)
    where
        S: FrameSink + ?Sized,
    {
        match header.function {
            LinkFunction::PriResetLinkStates => {
                self.tracker.reset(header.source, header.control.dir);
            }
            LinkFunction::PriConfirmedUserData => {
                self.tracker
                    .toggle_expected_fcb(header.source, header.control.dir);
            }
            _ => {}
        }

        let frame = LinkFrame::new(
            header.function,
            header.control.dir,
            header.control.fcb,
            header.control.fcv,
            header.destination,
            header.source,
            payload,
        );
        self.statistics.increment_frames_received();
        log::trace!("accepted {}", frame);
        sink.on_frame(&frame);
    }

    fn report<R>(&mut self, error: FrameError, reporter: &mut R)
    where
        R: ErrorReporter + ?Sized,
    {
        self.statistics.record_error(error);
        log::warn!("link frame rejected at offset {}: {}", self.offset, error);
        reporter.on_error(error, self.offset);
    }

    /// Drop `n` leading bytes as a resynchronization decision
    fn discard(&mut self, n: usize) {
        self.statistics.record_discarded(n);
        self.consume(n);
    }

    /// Advance past `n` leading bytes
    fn consume(&mut self, n: usize) {
        self.buffer.advance(n);
        self.offset += n as u64;
    }
}

impl Default for LinkParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate every block CRC and concatenate the data bytes
fn parse_body(body: &[u8], payload_len: usize) -> Result<Vec<u8>, FrameError> {
    let mut payload = Vec::with_capacity(payload_len);
    let mut remaining = payload_len;
    let mut pos = 0;
    while remaining > 0 {
        let take = remaining.min(BLOCK_SIZE);
        let block = &body[pos..pos + take];
        if !crc::check(block, body[pos + take], body[pos + take + 1]) {
            return Err(FrameError::BadBodyCrc);
        }
        payload.extend_from_slice(block);
        pos += take + 2;
        remaining -= take;
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_hex(hex: &str) -> Vec<u8> {
        hex.split_whitespace()
            .map(|byte| u8::from_str_radix(byte, 16).unwrap())
            .collect()
    }

    fn fix_header_crc(bytes: &mut [u8]) {
        let value = crc::compute(&bytes[0..8]);
        bytes[8] = (value & 0xFF) as u8;
        bytes[9] = ((value & 0xFF00) >> 8) as u8;
    }

    /// Recompute the header CRC of a 10-byte header image, so a test can
    /// corrupt a header field without tripping the CRC check
    fn repair_header_crc(hex: &str) -> Vec<u8> {
        let mut bytes = from_hex(hex);
        fix_header_crc(&mut bytes);
        bytes
    }

    #[derive(Default)]
    struct FrameLog {
        frames: Vec<LinkFrame>,
    }

    impl FrameSink for FrameLog {
        fn on_frame(&mut self, frame: &LinkFrame) {
            self.frames.push(frame.clone());
        }
    }

    #[derive(Default)]
    struct ErrorLog {
        errors: Vec<(FrameError, u64)>,
    }

    impl ErrorReporter for ErrorLog {
        fn on_error(&mut self, error: FrameError, offset: u64) {
            self.errors.push((error, offset));
        }
    }

    struct Harness {
        parser: LinkParser,
        sink: FrameLog,
        log: ErrorLog,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                parser: LinkParser::new(),
                sink: FrameLog::default(),
                log: ErrorLog::default(),
            }
        }

        fn supply(&mut self, data: &[u8]) {
            self.parser.supply(data, &mut self.sink, &mut self.log);
        }

        fn supply_hex(&mut self, hex: &str) {
            self.supply(&from_hex(hex));
        }

        fn frames(&self) -> &[LinkFrame] {
            &self.sink.frames
        }

        fn error_kinds(&self) -> Vec<FrameError> {
            self.log.errors.iter().map(|(kind, _)| *kind).collect()
        }
    }

    fn increasing(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    #[test]
    fn test_initialization_state() {
        let t = Harness::new();
        assert!(t.frames().is_empty());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.parser.retained(), 0);
    }

    #[test]
    fn test_header_crc_error() {
        let mut t = Harness::new();
        t.supply_hex("05 64 05 C0 01 00 00 04 E9 20");
        assert!(t.frames().is_empty());
        assert_eq!(t.error_kinds(), vec![FrameError::BadHeaderCrc]);
    }

    #[test]
    fn test_body_crc_error() {
        let mut t = Harness::new();
        t.supply_hex(
            "05 64 14 F3 01 00 00 04 0A 3B C0 C3 01 3C 02 06 3C 03 06 3C 04 06 3C 01 06 9A 11",
        );
        assert!(t.frames().is_empty());
        assert_eq!(t.error_kinds(), vec![FrameError::BadBodyCrc]);
    }

    #[test]
    fn test_bad_length_never_reaches_body_parse() {
        // A valid reset-link-states header with the length field forced into
        // [0, 4] and the CRC repaired
        for length in 0..=4u8 {
            let mut header = from_hex("05 64 05 C0 01 00 00 04 E9 21");
            header[2] = length;
            fix_header_crc(&mut header);
            let mut t = Harness::new();
            t.supply(&header);
            assert!(t.frames().is_empty());
            assert_eq!(t.error_kinds(), vec![FrameError::BadLength]);
        }
    }

    #[test]
    fn test_unexpected_data() {
        // Reset-link-states with a declared payload of three bytes
        let mut t = Harness::new();
        t.supply(&repair_header_crc("05 64 08 C0 01 00 00 04 E9 21"));
        assert!(t.frames().is_empty());
        assert_eq!(t.error_kinds(), vec![FrameError::UnexpectedData]);
    }

    #[test]
    fn test_absence_of_data() {
        // Confirmed user data with the length field set to the bare minimum
        let mut t = Harness::new();
        t.supply(&repair_header_crc("05 64 05 73 00 04 01 00 03 FC"));
        assert!(t.frames().is_empty());
        assert_eq!(t.error_kinds(), vec![FrameError::NoData]);
    }

    #[test]
    fn test_unknown_primary_function() {
        // Reset-link-states with the function code changed from 0 to 6
        let mut t = Harness::new();
        t.supply(&repair_header_crc("05 64 05 C6 01 00 00 04 E9 21"));
        assert!(t.frames().is_empty());
        assert_eq!(t.error_kinds(), vec![FrameError::UnknownFunction]);
    }

    #[test]
    fn test_unknown_secondary_function() {
        // Code 2 is not defined in the secondary table
        let mut t = Harness::new();
        t.supply(&repair_header_crc("05 64 05 02 00 04 01 00 00 00"));
        assert!(t.frames().is_empty());
        assert_eq!(t.error_kinds(), vec![FrameError::UnknownFunction]);
    }

    #[test]
    fn test_unexpected_fcv() {
        // Reset-link-states with FCV toggled on
        let mut t = Harness::new();
        t.supply(&repair_header_crc("05 64 05 D0 01 00 00 04 E9 21"));
        assert!(t.frames().is_empty());
        assert_eq!(t.error_kinds(), vec![FrameError::UnexpectedFcv]);
    }

    #[test]
    fn test_unexpected_fcb_on_secondary() {
        // ACK with FCB toggled on
        let mut t = Harness::new();
        t.supply(&repair_header_crc("05 64 05 20 00 04 01 00 19 A6"));
        assert!(t.frames().is_empty());
        assert_eq!(t.error_kinds(), vec![FrameError::UnexpectedFcb]);
    }

    #[test]
    fn test_combined_failures() {
        // Two well-formed-but-invalid frames in a single chunk produce two
        // errors in byte order and no frames
        let mut t = Harness::new();
        let mut data = repair_header_crc("05 64 05 20 00 04 01 00 19 A6");
        data.extend_from_slice(&repair_header_crc("05 64 05 D0 01 00 00 04 E9 21"));
        t.supply(&data);
        assert!(t.frames().is_empty());
        assert_eq!(
            t.log.errors,
            vec![
                (FrameError::UnexpectedFcb, 0),
                (FrameError::UnexpectedFcv, 10)
            ]
        );
    }

    #[test]
    fn test_read_ack() {
        let mut t = Harness::new();
        let frame = LinkFrame::ack(true, false, 1, 2);
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
    }

    #[test]
    fn test_read_nack() {
        let mut t = Harness::new();
        let frame = LinkFrame::nack(false, true, 1, 2);
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
    }

    #[test]
    fn test_read_link_status_with_dfc() {
        let mut t = Harness::new();
        let frame = LinkFrame::link_status(true, true, 1, 2);
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
        assert!(t.frames()[0].fcv());
    }

    #[test]
    fn test_read_not_supported() {
        let mut t = Harness::new();
        let frame = LinkFrame::not_supported(true, false, 1, 2);
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
    }

    #[test]
    fn test_read_test_link_states() {
        let mut t = Harness::new();
        let frame = LinkFrame::test_link_states(false, true, 1, 2);
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
    }

    #[test]
    fn test_read_reset_link_states() {
        let mut t = Harness::new();
        let frame = LinkFrame::reset_link_states(false, 1, 2);
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
        assert!(t.parser.tracker().state(2, false).is_reset());
    }

    #[test]
    fn test_read_request_link_status() {
        let mut t = Harness::new();
        let frame = LinkFrame::request_link_status(true, 1, 2);
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
    }

    #[test]
    fn test_read_unconfirmed_user_data() {
        let mut t = Harness::new();
        let frame = LinkFrame::unconfirmed_user_data(true, 1, 2, increasing(250));
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
        assert_eq!(t.frames()[0].payload(), increasing(250).as_slice());
    }

    #[test]
    fn test_read_confirmed_user_data() {
        let mut t = Harness::new();
        let frame = LinkFrame::confirmed_user_data(true, true, 1, 2, increasing(250));
        t.supply(&frame.encode().unwrap());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
    }

    #[test]
    fn test_two_packets_one_chunk() {
        let mut t = Harness::new();
        t.supply_hex("05 64 05 C0 01 00 00 04 E9 21 05 64 05 C0 01 00 00 04 E9 21");
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames().len(), 2);
        let last = &t.frames()[1];
        assert_eq!(last.function(), LinkFunction::PriResetLinkStates);
        assert_eq!(last.destination(), 1);
        assert_eq!(last.source(), 1024);
    }

    #[test]
    fn test_resync_on_spurious_sync_pattern() {
        // Two back-to-back sync patterns where the second opens a genuine
        // frame: one CRC error, then the frame parses
        let mut t = Harness::new();
        t.supply_hex("05 64 05 64 05 C0 01 00 00 04 E9 21");
        assert_eq!(t.log.errors, vec![(FrameError::BadHeaderCrc, 0)]);
        assert_eq!(t.frames().len(), 1);
        assert_eq!(t.frames()[0].function(), LinkFunction::PriResetLinkStates);
        assert_eq!(t.frames()[0].destination(), 1);
        assert_eq!(t.frames()[0].source(), 1024);
    }

    #[test]
    fn test_leading_garbage_skipped() {
        let mut t = Harness::new();
        let mut data = from_hex("FF 00 64 05");
        data.extend_from_slice(&LinkFrame::ack(true, false, 1, 2).encode().unwrap());
        t.supply(&data);
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames().len(), 1);
    }

    #[test]
    fn test_byte_at_a_time_delivery() {
        let mut t = Harness::new();
        let frame = LinkFrame::confirmed_user_data(true, true, 1, 2, increasing(42));
        for &byte in &frame.encode().unwrap() {
            t.supply(&[byte]);
        }
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames(), &[frame]);
    }

    #[test]
    fn test_many_receives_bounded_buffer() {
        let mut t = Harness::new();
        let bytes = LinkFrame::ack(true, false, 1, 2).encode().unwrap();
        for i in 1..100 {
            t.supply(&bytes);
            assert!(t.log.errors.is_empty());
            assert_eq!(t.frames().len(), i);
            assert_eq!(t.parser.retained(), 0);
        }
    }

    #[test]
    fn test_arbitrary_chunking() {
        let mut t = Harness::new();
        let mut data = Vec::new();
        for _ in 0..5 {
            data.extend_from_slice(&LinkFrame::ack(true, false, 1, 2).encode().unwrap());
        }
        for chunk in data.chunks(7) {
            t.supply(chunk);
        }
        assert!(t.log.errors.is_empty());
        assert_eq!(t.frames().len(), 5);
        assert!(t.parser.retained() < HEADER_SIZE);
    }

    #[test]
    fn test_partial_header_retained() {
        let mut t = Harness::new();
        t.supply_hex("05 64 05");
        assert!(t.frames().is_empty());
        assert!(t.log.errors.is_empty());
        assert_eq!(t.parser.retained(), 3);
    }

    #[test]
    fn test_fcb_alternation() {
        let mut t = Harness::new();

        // A fresh channel expects FCB set on the first confirmed transfer
        let first = LinkFrame::confirmed_user_data(true, true, 1, 2, increasing(8));
        t.supply(&first.encode().unwrap());
        assert_eq!(t.frames().len(), 1);

        // A retry with the same FCB is a duplicate
        t.supply(&first.encode().unwrap());
        assert_eq!(t.error_kinds(), vec![FrameError::UnexpectedFcb]);
        assert_eq!(t.frames().len(), 1);

        // The toggled FCB is accepted
        let second = LinkFrame::confirmed_user_data(true, false, 1, 2, increasing(8));
        t.supply(&second.encode().unwrap());
        assert_eq!(t.frames().len(), 2);

        // Reset restores the initial expectation
        t.supply(&LinkFrame::reset_link_states(true, 1, 2).encode().unwrap());
        t.supply(&first.encode().unwrap());
        assert_eq!(t.frames().len(), 4);
        assert_eq!(t.error_kinds(), vec![FrameError::UnexpectedFcb]);
    }

    #[test]
    fn test_fcb_state_not_mutated_by_rejected_body() {
        let mut t = Harness::new();

        // Confirmed user data with a corrupted body block must not consume
        // the FCB expectation
        let frame = LinkFrame::confirmed_user_data(true, true, 1, 2, increasing(8));
        let mut bytes = frame.encode().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        t.supply(&bytes);
        assert_eq!(t.error_kinds(), vec![FrameError::BadBodyCrc]);

        // The same FCB is still expected and the retry is accepted
        t.supply(&frame.encode().unwrap());
        assert_eq!(t.frames(), &[frame]);
    }

    #[test]
    fn test_rejected_frame_body_is_skipped_whole() {
        let mut t = Harness::new();

        // Reset-link-states declaring a three-byte payload is rejected at
        // the header; its five body bytes must be discarded even though they
        // contain a sync-looking pattern, then a genuine frame parses
        t.supply(&repair_header_crc("05 64 08 C0 01 00 00 04 E9 21"));
        assert_eq!(t.error_kinds(), vec![FrameError::UnexpectedData]);

        t.supply_hex("05 64 05 C0 01");
        assert!(t.frames().is_empty());

        t.supply_hex("05 64 05 C0 01 00 00 04 E9 21");
        assert_eq!(t.frames().len(), 1);
        assert_eq!(t.error_kinds(), vec![FrameError::UnexpectedData]);
    }

    #[test]
    fn test_statistics_track_emissions() {
        let mut t = Harness::new();
        t.supply_hex("05 64 05 64 05 C0 01 00 00 04 E9 21");
        let stats = t.parser.statistics();
        assert_eq!(stats.frames_received, 1);
        assert_eq!(stats.frames_rejected, 1);
        assert_eq!(stats.header_crc_errors, 1);
        assert_eq!(stats.bytes_discarded, 2);
    }

    #[test]
    fn test_reset_discards_buffer_and_state() {
        let mut t = Harness::new();
        t.supply_hex("05 64 05");
        t.parser.reset();
        assert_eq!(t.parser.retained(), 0);

        // The partial header is gone; a fresh frame parses cleanly
        t.supply(&LinkFrame::ack(true, false, 1, 2).encode().unwrap());
        assert_eq!(t.frames().len(), 1);
        assert!(t.log.errors.is_empty());
    }
}
