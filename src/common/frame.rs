// src/common/frame.rs

use core::fmt;

use super::error::FrameError;

/// Largest identifier representable in an 11-bit (CAN 2.0A) ID field.
pub const MAX_STANDARD_ID: u16 = 0x7FF;

/// Maximum number of payload bytes in a classic CAN data frame.
pub const MAX_PAYLOAD_LEN: usize = 8;

/// An 11-bit standard CAN identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanId(u16);

impl CanId {
    /// Creates a new `CanId` if `raw` fits in 11 bits.
    pub const fn new(raw: u16) -> Result<Self, FrameError> {
        if raw <= MAX_STANDARD_ID {
            Ok(CanId(raw))
        } else {
            Err(FrameError::InvalidId(raw))
        }
    }

    /// Const constructor for identifiers known at compile time.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in const context) if `raw` does not fit in 11 bits.
    pub const fn from_const(raw: u16) -> Self {
        assert!(raw <= MAX_STANDARD_ID, "CAN identifier exceeds 11 bits");
        CanId(raw)
    }

    #[inline]
    pub const fn as_raw(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for CanId {
    type Error = FrameError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CanId> for u16 {
    fn from(value: CanId) -> Self {
        value.0
    }
}

impl fmt::Display for CanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05x}", self.0)
    }
}

/// A classic CAN data frame: identifier, length and a fixed 8-byte buffer.
///
/// Only the first `len` bytes of the buffer are meaningful; the remainder is
/// kept zeroed so two frames with equal visible content compare equal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanFrame {
    id: CanId,
    len: u8,
    data: [u8; MAX_PAYLOAD_LEN],
}

impl CanFrame {
    /// Builds a frame from an identifier and up to 8 payload bytes.
    pub fn new(id: CanId, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLong(payload.len()));
        }
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(CanFrame {
            id,
            len: payload.len() as u8,
            data,
        })
    }

    /// Infallible constructor for payloads whose size is known at compile time.
    pub fn from_array<const N: usize>(id: CanId, payload: [u8; N]) -> Self {
        const { assert!(N <= MAX_PAYLOAD_LEN, "CAN payload exceeds 8 bytes") };
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..N].copy_from_slice(&payload);
        CanFrame {
            id,
            len: N as u8,
            data,
        }
    }

    #[inline]
    pub const fn id(&self) -> CanId {
        self.id
    }

    /// Number of meaningful payload bytes (0..=8).
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The meaningful part of the payload.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_id_bounds() {
        assert_eq!(CanId::new(0).unwrap().as_raw(), 0);
        assert_eq!(CanId::new(0x7FF).unwrap().as_raw(), 0x7FF);
        assert_eq!(CanId::new(0x800), Err(FrameError::InvalidId(0x800)));
        assert_eq!(CanId::try_from(0xFFFF), Err(FrameError::InvalidId(0xFFFF)));
        assert_eq!(u16::from(CanId::from_const(0x632)), 0x632);
    }

    #[test]
    fn test_frame_payload_view() {
        let frame = CanFrame::new(CanId::from_const(0x630), &[1, 2, 3]).unwrap();
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
        assert_eq!(frame.payload(), &[1, 2, 3]);
        assert_eq!(frame.id(), CanId::from_const(0x630));

        let empty = CanFrame::new(CanId::from_const(0x1), &[]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.payload(), &[] as &[u8]);

        let fixed = CanFrame::from_array(CanId::from_const(0x633), [0x02, 0x03]);
        assert_eq!(fixed, CanFrame::new(CanId::from_const(0x633), &[0x02, 0x03]).unwrap());
    }

    #[test]
    fn test_frame_rejects_long_payload() {
        let result = CanFrame::new(CanId::from_const(0x630), &[0u8; 9]);
        assert_eq!(result, Err(FrameError::PayloadTooLong(9)));
        assert!(CanFrame::new(CanId::from_const(0x630), &[0u8; 8]).is_ok());
    }

    #[test]
    fn test_frames_compare_by_visible_content() {
        let a = CanFrame::new(CanId::from_const(0x10), &[0xAA]).unwrap();
        let b = CanFrame::new(CanId::from_const(0x10), &[0xAA]).unwrap();
        assert_eq!(a, b);
    }
}
