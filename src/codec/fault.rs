// src/codec/fault.rs

use super::Codec;
use crate::common::{CanFrame, DecodeError, ErrorCode, ErrorReport};

const FAULT_LEN: usize = 2;

impl Codec {
    /// Packs `(code << 8) | context` as a little-endian u16: the context byte
    /// goes out first, the code second.
    pub fn encode_fault(&self, report: &ErrorReport) -> CanFrame {
        let word = (u16::from(report.code.as_u8()) << 8) | u16::from(report.context);
        CanFrame::from_array(self.ids().fault, word.to_le_bytes())
    }

    /// Reads a fault frame back, e.g. when another board's fault is observed.
    /// Unknown codes are reported as `BadInternalState`.
    pub fn decode_fault(&self, frame: &CanFrame) -> Result<ErrorReport, DecodeError> {
        if frame.id() != self.ids().fault {
            return Err(DecodeError::UnknownMessageId(frame.id()));
        }
        let payload = frame.payload();
        if payload.len() != FAULT_LEN {
            return Err(DecodeError::FaultLength {
                expected: FAULT_LEN as u8,
                got: payload.len() as u8,
            });
        }
        let (context, code) = (payload[0], payload[1]);
        Ok(ErrorReport::new(
            ErrorCode::from_u8(code).unwrap_or(ErrorCode::BadInternalState),
            context,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MessageIds;

    #[test]
    fn test_fault_layout() {
        let codec = Codec::default();
        let report = ErrorReport::new(ErrorCode::InvalidCommandPayloadLength, 3);
        let frame = codec.encode_fault(&report);
        assert_eq!(frame.id(), MessageIds::FAULT);
        assert_eq!(frame.len(), FAULT_LEN);
        assert_eq!(frame.payload(), &[0x03, 0x03]);

        let report = ErrorReport::new(ErrorCode::InvalidCommandPayloadValue, 0xAB);
        assert_eq!(codec.encode_fault(&report).payload(), &[0xAB, 0x04]);
    }

    #[test]
    fn test_fault_decode() {
        let codec = Codec::default();
        let report = ErrorReport::new(ErrorCode::BadInternalState, 7);
        assert_eq!(codec.decode_fault(&codec.encode_fault(&report)), Ok(report));

        let odd = CanFrame::new(MessageIds::FAULT, &[0x01, 0x7E]).unwrap();
        assert_eq!(
            codec.decode_fault(&odd),
            Ok(ErrorReport::new(ErrorCode::BadInternalState, 0x01))
        );

        let short = CanFrame::new(MessageIds::FAULT, &[0x01]).unwrap();
        assert_eq!(
            codec.decode_fault(&short),
            Err(DecodeError::FaultLength { expected: 2, got: 1 })
        );

        let long = CanFrame::new(MessageIds::FAULT, &[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(
            codec.decode_fault(&long),
            Err(DecodeError::FaultLength { expected: 2, got: 3 })
        );
    }
}
