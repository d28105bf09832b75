// src/common/error.rs

use super::frame::CanId;
use super::types::SensorKind;

/// Errors constructing a [`CanFrame`](super::CanFrame) or [`CanId`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Identifier does not fit in 11 bits.
    #[error("CAN identifier {0:#x} exceeds 11 bits")]
    InvalidId(u16),

    /// More than 8 payload bytes were supplied.
    #[error("CAN payload of {0} bytes exceeds 8")]
    PayloadTooLong(usize),
}

/// Errors decoding an inbound frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Frame carries an identifier outside the board's accepted set.
    #[error("unknown message id {0}")]
    UnknownMessageId(CanId),

    /// Enable/Disable command with a payload length other than 1.
    #[error("invalid command payload length {0}")]
    InvalidCommandPayloadLength(u8),

    /// Enable/Disable command whose single byte is neither 0 nor 1.
    #[error("invalid command payload value {0:#04x}")]
    InvalidCommandPayloadValue(u8),

    /// Telemetry frame whose length does not match the kind's wire width.
    #[error("telemetry frame for {kind:?} has {got} bytes, expected {expected}")]
    TelemetryLength {
        kind: SensorKind,
        expected: u8,
        got: u8,
    },

    /// Fault frame whose length is not the 2-byte code/context pair.
    #[error("fault frame has {got} bytes, expected {expected}")]
    FaultLength { expected: u8, got: u8 },
}

/// Errors encoding an outbound telemetry frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The board has no message id configured for this sensor kind.
    #[error("no telemetry message configured for {0:?}")]
    UnsupportedKind(SensorKind),

    /// Sensor index cannot be represented for this message kind.
    #[error("sensor id {sensor_id} out of range for {kind:?}")]
    SensorIdOutOfRange { kind: SensorKind, sensor_id: u8 },

    /// Value is NaN and has no fixed-point representation.
    #[error("reading value is not a number")]
    NotANumber,
}

/// Errors found while validating a [`BoardConfig`](super::BoardConfig).
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A sampling rate of zero or above the supported maximum.
    #[error("sample rate {0} Hz out of range")]
    InvalidSampleRate(u32),

    /// More temperature probes than chip selects.
    #[error("{got} temperature probes configured, at most {max} supported")]
    TooManyProbes { got: usize, max: usize },

    /// Temperature channel enabled with no probes, or probes with no channel.
    #[error("temperature channel and probe count disagree")]
    ProbeChannelMismatch,

    /// Two message kinds share one identifier.
    #[error("message id {0} assigned twice")]
    DuplicateId(CanId),

    /// Heartbeat or poll period of zero.
    #[error("period must be non-zero")]
    ZeroPeriod,
}

/// Crate-level error, generic over the collaborator I/O error.
#[derive(Debug, thiserror::Error)]
pub enum BoardError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the transceiver implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

// Note: a blanket `From<E>` like the Io mapping below would overlap with the
// `#[from]` conversions above, so I/O errors are wrapped explicitly.
impl<E: core::fmt::Debug> BoardError<E> {
    pub fn io(e: E) -> Self {
        BoardError::Io(e)
    }
}

/// Fault codes carried in the high byte of a fault frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorCode {
    /// No fault.
    None = 0x00,

    /// Internal configuration is inconsistent (e.g. a sensor source whose
    /// readings no telemetry message can carry).
    BadInternalState = 0x01,

    /// Received a frame with an identifier outside the accepted set.
    UnknownMessageId = 0x02,

    /// Enable/Disable command with the wrong payload length.
    InvalidCommandPayloadLength = 0x03,

    /// Enable/Disable command with a value other than 0 or 1.
    InvalidCommandPayloadValue = 0x04,
}

impl ErrorCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(ErrorCode::None),
            0x01 => Some(ErrorCode::BadInternalState),
            0x02 => Some(ErrorCode::UnknownMessageId),
            0x03 => Some(ErrorCode::InvalidCommandPayloadLength),
            0x04 => Some(ErrorCode::InvalidCommandPayloadValue),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A fault to be reported on the bus: code plus one byte of context
/// (offending length, offending value, low byte of an identifier).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub context: u8,
}

impl ErrorReport {
    pub const fn new(code: ErrorCode, context: u8) -> Self {
        Self { code, context }
    }

    pub const fn bad_internal_state(context: u8) -> Self {
        Self::new(ErrorCode::BadInternalState, context)
    }
}

impl From<&DecodeError> for ErrorReport {
    fn from(e: &DecodeError) -> Self {
        match *e {
            DecodeError::UnknownMessageId(id) => {
                ErrorReport::new(ErrorCode::UnknownMessageId, (id.as_raw() & 0xFF) as u8)
            }
            DecodeError::InvalidCommandPayloadLength(len) => {
                ErrorReport::new(ErrorCode::InvalidCommandPayloadLength, len)
            }
            DecodeError::InvalidCommandPayloadValue(value) => {
                ErrorReport::new(ErrorCode::InvalidCommandPayloadValue, value)
            }
            // Only produced by the telemetry and fault decoders, never by
            // command handling.
            DecodeError::TelemetryLength { got, .. } | DecodeError::FaultLength { got, .. } => {
                ErrorReport::new(ErrorCode::BadInternalState, got)
            }
        }
    }
}
