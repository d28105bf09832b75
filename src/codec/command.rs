// src/codec/command.rs

use super::Codec;
use crate::common::{CanFrame, DecodeError};

/// Enable/Disable command carried in a single payload byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `0`: restart measurement and output.
    Enable,
    /// `1`: halt measurement and output, go idle.
    Disable,
}

impl Command {
    #[inline]
    pub const fn wire_value(self) -> u8 {
        match self {
            Command::Enable => 0,
            Command::Disable => 1,
        }
    }

    /// Parses the payload of an Enable/Disable frame. Exactly one byte is
    /// accepted; the offending length or byte is kept for the fault report.
    pub(super) fn from_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        match payload {
            [0] => Ok(Command::Enable),
            [1] => Ok(Command::Disable),
            [other] => Err(DecodeError::InvalidCommandPayloadValue(*other)),
            // Frames never exceed 8 bytes, the cast cannot truncate.
            _ => Err(DecodeError::InvalidCommandPayloadLength(payload.len() as u8)),
        }
    }
}

impl Codec {
    /// Builds the frame a bus master sends to switch the board.
    pub fn encode_command(&self, command: Command) -> CanFrame {
        CanFrame::from_array(self.ids().enable_disable, [command.wire_value()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_payload() {
        assert_eq!(Command::from_payload(&[0]), Ok(Command::Enable));
        assert_eq!(Command::from_payload(&[1]), Ok(Command::Disable));
        assert_eq!(Command::from_payload(&[5]), Err(DecodeError::InvalidCommandPayloadValue(5)));
        assert_eq!(Command::from_payload(&[]), Err(DecodeError::InvalidCommandPayloadLength(0)));
        assert_eq!(Command::from_payload(&[0, 0]), Err(DecodeError::InvalidCommandPayloadLength(2)));
    }

    #[test]
    fn test_encode_command() {
        let codec = Codec::default();
        let frame = codec.encode_command(Command::Disable);
        assert_eq!(frame.id(), codec.ids().enable_disable);
        assert_eq!(frame.payload(), &[1]);
        assert_eq!(codec.decode_command(&frame), Ok(Some(Command::Disable)));
    }
}
