//! Link frame structure, function codes, and frame encoding

use crate::error::{Dnp3Error, Dnp3Result};
use crate::link::crc::CrcCalc;
use std::fmt;

/// First byte of the sync pattern opening every frame
pub const SYNC0: u8 = 0x05;

/// Second byte of the sync pattern
pub const SYNC1: u8 = 0x64;

/// Fixed header size in bytes, header CRC included
pub const HEADER_SIZE: usize = 10;

/// Minimum value of the header length field (control byte plus two addresses)
pub const MIN_LENGTH: u8 = 5;

/// Maximum user payload carried by one frame
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Data bytes per CRC-protected body block
pub const BLOCK_SIZE: usize = 16;

/// Largest possible frame on the wire: full header plus a 250-byte payload
/// split into 16 checksummed blocks
pub const MAX_FRAME_SIZE: usize = 292;

/// On-wire size of a frame body carrying `payload_len` data bytes
pub fn body_wire_size(payload_len: usize) -> usize {
    payload_len + 2 * payload_len.div_ceil(BLOCK_SIZE)
}

/// On-wire size of a whole frame carrying `payload_len` data bytes
pub fn frame_wire_size(payload_len: usize) -> usize {
    HEADER_SIZE + body_wire_size(payload_len)
}

/// Link layer function code
///
/// The 4-bit code in the control byte is interpreted against one of two
/// disjoint tables selected by the PRM bit: requests originated by the link's
/// primary station, and responses originated by its secondary station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFunction {
    PriResetLinkStates,
    PriTestLinkStates,
    PriConfirmedUserData,
    PriUnconfirmedUserData,
    PriRequestLinkStatus,
    SecAck,
    SecNack,
    SecLinkStatus,
    SecNotSupported,
}

impl LinkFunction {
    /// Decode a function from the PRM bit and the 4-bit code
    pub fn from_code(prm: bool, code: u8) -> Option<Self> {
        match (prm, code & 0x0F) {
            (true, 0x0) => Some(LinkFunction::PriResetLinkStates),
            (true, 0x2) => Some(LinkFunction::PriTestLinkStates),
            (true, 0x3) => Some(LinkFunction::PriConfirmedUserData),
            (true, 0x4) => Some(LinkFunction::PriUnconfirmedUserData),
            (true, 0x9) => Some(LinkFunction::PriRequestLinkStatus),
            (false, 0x0) => Some(LinkFunction::SecAck),
            (false, 0x1) => Some(LinkFunction::SecNack),
            (false, 0xB) => Some(LinkFunction::SecLinkStatus),
            (false, 0xF) => Some(LinkFunction::SecNotSupported),
            _ => None,
        }
    }

    /// The 4-bit code for the control byte
    pub fn code(&self) -> u8 {
        match self {
            LinkFunction::PriResetLinkStates => 0x0,
            LinkFunction::PriTestLinkStates => 0x2,
            LinkFunction::PriConfirmedUserData => 0x3,
            LinkFunction::PriUnconfirmedUserData => 0x4,
            LinkFunction::PriRequestLinkStatus => 0x9,
            LinkFunction::SecAck => 0x0,
            LinkFunction::SecNack => 0x1,
            LinkFunction::SecLinkStatus => 0xB,
            LinkFunction::SecNotSupported => 0xF,
        }
    }

    /// Whether this function originates at the primary station
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            LinkFunction::PriResetLinkStates
                | LinkFunction::PriTestLinkStates
                | LinkFunction::PriConfirmedUserData
                | LinkFunction::PriUnconfirmedUserData
                | LinkFunction::PriRequestLinkStatus
        )
    }

    /// User-data functions are the only ones that carry a payload
    pub fn carries_user_data(&self) -> bool {
        matches!(
            self,
            LinkFunction::PriConfirmedUserData | LinkFunction::PriUnconfirmedUserData
        )
    }

    /// Fixed FCV expectation for primary functions
    ///
    /// Secondary functions repurpose the bit position as DFC and carry no
    /// expectation, so they return `None`.
    pub fn requires_fcv(&self) -> Option<bool> {
        match self {
            LinkFunction::PriTestLinkStates | LinkFunction::PriConfirmedUserData => Some(true),
            LinkFunction::PriResetLinkStates
            | LinkFunction::PriUnconfirmedUserData
            | LinkFunction::PriRequestLinkStatus => Some(false),
            _ => None,
        }
    }
}

/// Decoded control byte (offset 3 of the frame header)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlField {
    /// DIR bit: set on frames sent by the master station
    pub dir: bool,
    /// PRM bit: set on frames originated by the link's primary station
    pub prm: bool,
    /// Frame count bit, meaningful only when `fcv` is set
    pub fcb: bool,
    /// FCV bit on primary frames; DFC bit on secondary frames
    pub fcv: bool,
    /// 4-bit function code
    pub code: u8,
}

impl ControlField {
    /// Decode a control byte
    pub fn from_byte(byte: u8) -> Self {
        Self {
            dir: (byte & 0x80) != 0,
            prm: (byte & 0x40) != 0,
            fcb: (byte & 0x20) != 0,
            fcv: (byte & 0x10) != 0,
            code: byte & 0x0F,
        }
    }

    /// Encode back into a control byte
    pub fn to_byte(&self) -> u8 {
        let mut byte = self.code & 0x0F;
        if self.dir {
            byte |= 0x80;
        }
        if self.prm {
            byte |= 0x40;
        }
        if self.fcb {
            byte |= 0x20;
        }
        if self.fcv {
            byte |= 0x10;
        }
        byte
    }

    /// Interpret the function code against the table selected by PRM
    pub fn function(&self) -> Option<LinkFunction> {
        LinkFunction::from_code(self.prm, self.code)
    }
}

/// One complete link layer frame
///
/// Instances are immutable once built; the parser emits them by value and
/// retains nothing after emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFrame {
    function: LinkFunction,
    dir: bool,
    fcb: bool,
    fcv: bool,
    destination: u16,
    source: u16,
    payload: Vec<u8>,
}

impl LinkFrame {
    /// Create a frame from explicit field values
    ///
    /// The PRM bit is implied by the function code. Payload rules are not
    /// checked here; `encode` rejects inconsistent frames.
    pub fn new(
        function: LinkFunction,
        dir: bool,
        fcb: bool,
        fcv: bool,
        destination: u16,
        source: u16,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            function,
            dir,
            fcb,
            fcv,
            destination,
            source,
            payload,
        }
    }

    /// Secondary acknowledgement
    pub fn ack(dir: bool, dfc: bool, destination: u16, source: u16) -> Self {
        Self::new(LinkFunction::SecAck, dir, false, dfc, destination, source, Vec::new())
    }

    /// Secondary negative acknowledgement
    pub fn nack(dir: bool, dfc: bool, destination: u16, source: u16) -> Self {
        Self::new(LinkFunction::SecNack, dir, false, dfc, destination, source, Vec::new())
    }

    /// Secondary link status report
    pub fn link_status(dir: bool, dfc: bool, destination: u16, source: u16) -> Self {
        Self::new(LinkFunction::SecLinkStatus, dir, false, dfc, destination, source, Vec::new())
    }

    /// Secondary not-supported response
    pub fn not_supported(dir: bool, dfc: bool, destination: u16, source: u16) -> Self {
        Self::new(LinkFunction::SecNotSupported, dir, false, dfc, destination, source, Vec::new())
    }

    /// Primary reset of the remote secondary's link states
    pub fn reset_link_states(dir: bool, destination: u16, source: u16) -> Self {
        Self::new(
            LinkFunction::PriResetLinkStates,
            dir,
            false,
            false,
            destination,
            source,
            Vec::new(),
        )
    }

    /// Primary link states test
    pub fn test_link_states(dir: bool, fcb: bool, destination: u16, source: u16) -> Self {
        Self::new(
            LinkFunction::PriTestLinkStates,
            dir,
            fcb,
            true,
            destination,
            source,
            Vec::new(),
        )
    }

    /// Primary request for the remote link's status
    pub fn request_link_status(dir: bool, destination: u16, source: u16) -> Self {
        Self::new(
            LinkFunction::PriRequestLinkStatus,
            dir,
            false,
            false,
            destination,
            source,
            Vec::new(),
        )
    }

    /// Primary confirmed user data transfer
    pub fn confirmed_user_data(
        dir: bool,
        fcb: bool,
        destination: u16,
        source: u16,
        payload: Vec<u8>,
    ) -> Self {
        Self::new(
            LinkFunction::PriConfirmedUserData,
            dir,
            fcb,
            true,
            destination,
            source,
            payload,
        )
    }

    /// Primary unconfirmed user data transfer
    pub fn unconfirmed_user_data(dir: bool, destination: u16, source: u16, payload: Vec<u8>) -> Self {
        Self::new(
            LinkFunction::PriUnconfirmedUserData,
            dir,
            false,
            false,
            destination,
            source,
            payload,
        )
    }

    /// Get the function code
    pub fn function(&self) -> LinkFunction {
        self.function
    }

    /// Get the DIR bit
    pub fn dir(&self) -> bool {
        self.dir
    }

    /// Get the PRM bit
    pub fn prm(&self) -> bool {
        self.function.is_primary()
    }

    /// Get the frame count bit
    pub fn fcb(&self) -> bool {
        self.fcb
    }

    /// Get the FCV bit (DFC on secondary frames)
    pub fn fcv(&self) -> bool {
        self.fcv
    }

    /// Get the destination address
    pub fn destination(&self) -> u16 {
        self.destination
    }

    /// Get the source address
    pub fn source(&self) -> u16 {
        self.source
    }

    /// Get the user payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The control field as it appears on the wire
    pub fn control(&self) -> ControlField {
        ControlField {
            dir: self.dir,
            prm: self.function.is_primary(),
            fcb: self.fcb,
            fcv: self.fcv,
            code: self.function.code(),
        }
    }

    /// Encode the frame to its wire representation
    ///
    /// Inverse of the parse path: sync pattern, length, control byte,
    /// addresses, header CRC, then the payload split into 16-byte blocks each
    /// followed by its own CRC.
    ///
    /// # Returns
    ///
    /// The wire bytes, or an error if the payload is over 250 bytes or its
    /// presence disagrees with the function code.
    pub fn encode(&self) -> Dnp3Result<Vec<u8>> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Dnp3Error::FrameInvalid(format!(
                "Payload of {} bytes exceeds the {} byte maximum",
                self.payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }
        if self.function.carries_user_data() && self.payload.is_empty() {
            return Err(Dnp3Error::FrameInvalid(format!(
                "{:?} requires a payload",
                self.function
            )));
        }
        if !self.function.carries_user_data() && !self.payload.is_empty() {
            return Err(Dnp3Error::FrameInvalid(format!(
                "{:?} does not carry a payload",
                self.function
            )));
        }

        let mut result = Vec::with_capacity(frame_wire_size(self.payload.len()));
        result.push(SYNC0);
        result.push(SYNC1);
        result.push(MIN_LENGTH + self.payload.len() as u8);
        result.push(self.control().to_byte());
        result.extend_from_slice(&self.destination.to_le_bytes());
        result.extend_from_slice(&self.source.to_le_bytes());

        let mut crc_calc = CrcCalc::new();
        crc_calc.update_bytes(&result);
        result.extend_from_slice(&crc_calc.value_bytes());

        for block in self.payload.chunks(BLOCK_SIZE) {
            result.extend_from_slice(block);
            let mut crc_calc = CrcCalc::new();
            crc_calc.update_bytes(block);
            result.extend_from_slice(&crc_calc.value_bytes());
        }

        Ok(result)
    }
}

impl fmt::Display for LinkFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Link Frame: func={:?}, dir={}, fcb={}, fcv={}, src={}, dst={}, payload={} bytes",
            self.function,
            self.dir,
            self.fcb,
            self.fcv,
            self.source,
            self.destination,
            self.payload.len()
        )
    }
}
