//! Upper layer interfaces fed by the link parser
//!
//! The parser depends only on these two narrow traits; transport reassembly,
//! application handling, and authentication adapters all sit behind them.

use crate::error::FrameError;
use crate::link::frame::LinkFrame;

/// Receiver of validated link frames
pub trait FrameSink {
    /// Called synchronously for every frame that passes validation, zero or
    /// more times per supplied chunk, in stream order. The frame is borrowed
    /// for the duration of the call only.
    fn on_frame(&mut self, frame: &LinkFrame);
}

/// Receiver of classified frame errors
pub trait ErrorReporter {
    /// Called synchronously for every rejected frame, interleaved with sink
    /// calls in stream order. `offset` is the stream offset of the first
    /// sync byte of the offending frame.
    fn on_error(&mut self, error: FrameError, offset: u64);
}
