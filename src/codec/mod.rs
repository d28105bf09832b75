// src/codec/mod.rs

//! CAN wire codec for the Blackbody message set.
//!
//! | Message            | Dir | Len | Layout (little-endian)                                   |
//! |--------------------|-----|-----|----------------------------------------------------------|
//! | Irradiance 1 / 2   | out | 5   | signed 40-bit, value x1000                               |
//! | Enable/Disable     | in  | 1   | `0` enable/restart, `1` disable/halt                     |
//! | Fault              | out | 2   | u16 `(code << 8) \| context`                             |
//! | Temperature        | out | 4   | u32: bits 31..29 probe index, bits 28..0 signed x1000    |
//!
//! Scaled values are truncated toward zero and saturate at the field range.
//! Identifiers come from [`MessageIds`] and are deployment configuration.

mod command;
mod fault;
mod telemetry;
pub mod trace;

pub use command::Command;
pub use trace::{FrameObserver, HexTrace, PRELUDE};

use crate::common::{CanFrame, CanId, DecodeError, MessageIds};

/// Fixed-point scale applied to every telemetry value.
pub const VALUE_SCALE: f64 = 1000.0;

/// Encoder/decoder bound to one board's message table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Codec {
    ids: MessageIds,
}

impl Codec {
    pub const fn new(ids: MessageIds) -> Self {
        Codec { ids }
    }

    pub fn ids(&self) -> &MessageIds {
        &self.ids
    }

    /// The identifiers the transceiver should let through: the command plus
    /// the board's own outbound kinds, which peers may echo on the shared bus.
    pub fn accepted_ids(&self) -> [CanId; 5] {
        self.ids.all()
    }

    fn is_accepted(&self, id: CanId) -> bool {
        self.accepted_ids().contains(&id)
    }

    /// Classifies an inbound frame.
    ///
    /// Returns `Ok(Some(cmd))` for a valid Enable/Disable command, `Ok(None)`
    /// for accepted identifiers that carry no command, and an error for
    /// unknown identifiers or malformed command payloads.
    pub fn decode_command(&self, frame: &CanFrame) -> Result<Option<Command>, DecodeError> {
        let id = frame.id();
        if id == self.ids.enable_disable {
            return Command::from_payload(frame.payload()).map(Some);
        }
        if self.is_accepted(id) {
            Ok(None)
        } else {
            Err(DecodeError::UnknownMessageId(id))
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec::new(MessageIds::default())
    }
}
