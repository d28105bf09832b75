// src/codec/trace.rs

//! Human-readable trace of transmitted frames.
//!
//! Each frame is rendered as the `0xFF` prelude, the identifier as four hex
//! digits, then the payload read as a little-endian integer in hex, two digits
//! per byte: `ff063000000f4434` for a 5-byte irradiance frame.

use core::fmt::{self, Write};

use crate::common::CanFrame;

/// Marker byte that starts every trace line.
pub const PRELUDE: u8 = 0xFF;

/// Longest rendered line: prelude (2) + id (4) + 8 payload bytes (16).
pub const TRACE_LINE_LEN: usize = 22;

/// Hook called with every frame the board has handed to the transceiver.
pub trait FrameObserver {
    fn on_transmit(&mut self, frame: &CanFrame);
}

/// No tracing.
impl FrameObserver for () {
    #[inline]
    fn on_transmit(&mut self, _frame: &CanFrame) {}
}

/// Writes one line per frame to any `core::fmt::Write` sink (a UART wrapper,
/// a `heapless::String`, ...). Write errors are ignored; tracing never
/// affects the protocol.
#[derive(Debug)]
pub struct HexTrace<W: Write> {
    sink: W,
}

impl<W: Write> HexTrace<W> {
    pub fn new(sink: W) -> Self {
        HexTrace { sink }
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> FrameObserver for HexTrace<W> {
    fn on_transmit(&mut self, frame: &CanFrame) {
        let _ = write_frame(&mut self.sink, frame).and_then(|_| self.sink.write_char('\n'));
    }
}

/// Renders `frame` without a line terminator.
pub fn write_frame<W: Write>(w: &mut W, frame: &CanFrame) -> fmt::Result {
    write!(w, "{:02x}{:04x}", PRELUDE, frame.id().as_raw())?;
    for byte in frame.payload().iter().rev() {
        write!(w, "{:02x}", byte)?;
    }
    Ok(())
}

/// Renders `frame` into a fixed-capacity string.
pub fn format_frame(frame: &CanFrame) -> heapless::String<TRACE_LINE_LEN> {
    let mut line = heapless::String::new();
    // Capacity covers the longest possible frame.
    let _ = write_frame(&mut line, frame);
    line
}
