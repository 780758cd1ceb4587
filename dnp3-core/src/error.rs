use thiserror::Error;

/// Main error type for DNP3 operations
#[derive(Error, Debug)]
pub enum Dnp3Error {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Frame invalid: {0}")]
    FrameInvalid(String),
}

/// Result type alias for DNP3 operations
pub type Dnp3Result<T> = Result<T, Dnp3Error>;

/// Classification of link frame validation failures
///
/// Every frame the link parser rejects is reported with exactly one of these
/// kinds. None of them is fatal to the channel; the parser resynchronizes and
/// keeps scanning after each one.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Header CRC recomputation did not match the transmitted value
    #[error("header CRC mismatch")]
    BadHeaderCrc,

    /// A body block CRC recomputation did not match the transmitted value
    #[error("body block CRC mismatch")]
    BadBodyCrc,

    /// Declared length below the protocol minimum of 5
    #[error("declared length below protocol minimum")]
    BadLength,

    /// Frame carries a payload but the function code does not allow one
    #[error("unexpected user data for function code")]
    UnexpectedData,

    /// Function code requires a payload but the frame carries none
    #[error("user data absent for function code")]
    NoData,

    /// Function code is not defined for the frame's direction
    #[error("unknown function code")]
    UnknownFunction,

    /// FCV bit disagrees with the fixed expectation for the function code
    #[error("unexpected FCV bit")]
    UnexpectedFcv,

    /// FCB bit disagrees with the expected value for the remote station
    #[error("unexpected FCB bit")]
    UnexpectedFcb,
}
