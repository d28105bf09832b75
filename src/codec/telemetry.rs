// src/codec/telemetry.rs

use super::{Codec, VALUE_SCALE};
use crate::common::{CanFrame, DecodeError, EncodeError, Reading, SensorKind, Telemetry};

// Irradiance: signed 40-bit fixed point, one message id per sensor.
const IRRADIANCE_LEN: usize = 5;
const IRRADIANCE_VALUE_BITS: u32 = 40;

// Temperature: 3-bit probe index above a signed 29-bit fixed-point value.
const TEMPERATURE_LEN: usize = 4;
const TEMPERATURE_VALUE_BITS: u32 = 29;
const TEMPERATURE_VALUE_MASK: u32 = (1 << TEMPERATURE_VALUE_BITS) - 1;
const TEMPERATURE_MAX_PROBE: u8 = 0b111;

/// Scales `value` by [`VALUE_SCALE`], truncating toward zero and saturating
/// to a signed field of `bits` width.
fn to_fixed(value: f32, bits: u32) -> Result<i64, EncodeError> {
    if value.is_nan() {
        return Err(EncodeError::NotANumber);
    }
    let max = (1i64 << (bits - 1)) - 1;
    let min = -(1i64 << (bits - 1));
    // `as` truncates toward zero and saturates infinities.
    let scaled = (value as f64 * VALUE_SCALE) as i64;
    Ok(scaled.clamp(min, max))
}

fn from_fixed(raw: i64) -> f32 {
    (raw as f64 / VALUE_SCALE) as f32
}

/// Sign-extends the low `bits` of `raw`.
fn sign_extend(raw: u64, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((raw << shift) as i64) >> shift
}

impl Codec {
    /// Packs a reading into its telemetry frame.
    pub fn encode_telemetry(&self, reading: &Reading) -> Result<CanFrame, EncodeError> {
        match reading.kind {
            SensorKind::Irradiance => {
                let id = self
                    .ids()
                    .irradiance
                    .get(reading.sensor_id as usize)
                    .copied()
                    .ok_or(EncodeError::SensorIdOutOfRange {
                        kind: reading.kind,
                        sensor_id: reading.sensor_id,
                    })?;
                let fixed = to_fixed(reading.value, IRRADIANCE_VALUE_BITS)?;
                let bytes = fixed.to_le_bytes();
                let mut payload = [0u8; IRRADIANCE_LEN];
                payload.copy_from_slice(&bytes[..IRRADIANCE_LEN]);
                Ok(CanFrame::from_array(id, payload))
            }
            SensorKind::Temperature => {
                if reading.sensor_id > TEMPERATURE_MAX_PROBE {
                    return Err(EncodeError::SensorIdOutOfRange {
                        kind: reading.kind,
                        sensor_id: reading.sensor_id,
                    });
                }
                let fixed = to_fixed(reading.value, TEMPERATURE_VALUE_BITS)?;
                let word = ((reading.sensor_id as u32) << TEMPERATURE_VALUE_BITS)
                    | (fixed as u32 & TEMPERATURE_VALUE_MASK);
                Ok(CanFrame::from_array(self.ids().temperature, word.to_le_bytes()))
            }
            kind @ (SensorKind::None | SensorKind::Voltage | SensorKind::Current) => {
                Err(EncodeError::UnsupportedKind(kind))
            }
        }
    }

    /// Inverse of [`encode_telemetry`](Self::encode_telemetry).
    pub fn decode_telemetry(&self, frame: &CanFrame) -> Result<Telemetry, DecodeError> {
        let id = frame.id();
        let payload = frame.payload();

        if let Some(sensor_id) = self.ids().irradiance.iter().position(|&i| i == id) {
            check_len(SensorKind::Irradiance, IRRADIANCE_LEN, payload.len())?;
            let mut bytes = [0u8; 8];
            bytes[..IRRADIANCE_LEN].copy_from_slice(payload);
            let raw = sign_extend(u64::from_le_bytes(bytes), IRRADIANCE_VALUE_BITS);
            return Ok(Telemetry {
                kind: SensorKind::Irradiance,
                sensor_id: sensor_id as u8,
                value: from_fixed(raw),
            });
        }

        if id == self.ids().temperature {
            check_len(SensorKind::Temperature, TEMPERATURE_LEN, payload.len())?;
            let mut bytes = [0u8; TEMPERATURE_LEN];
            bytes.copy_from_slice(payload);
            let word = u32::from_le_bytes(bytes);
            let raw = sign_extend((word & TEMPERATURE_VALUE_MASK) as u64, TEMPERATURE_VALUE_BITS);
            return Ok(Telemetry {
                kind: SensorKind::Temperature,
                sensor_id: (word >> TEMPERATURE_VALUE_BITS) as u8,
                value: from_fixed(raw),
            });
        }

        Err(DecodeError::UnknownMessageId(id))
    }
}

fn check_len(kind: SensorKind, expected: usize, got: usize) -> Result<(), DecodeError> {
    if expected == got {
        Ok(())
    } else {
        Err(DecodeError::TelemetryLength {
            kind,
            expected: expected as u8,
            got: got as u8,
        })
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CanId, MessageIds};

    fn reading(kind: SensorKind, sensor_id: u8, value: f32) -> Reading {
        Reading::new(kind, sensor_id, value, 0)
    }

    fn assert_close(a: f32, b: f32) {
        let diff = if a > b { a - b } else { b - a };
        assert!(diff <= 0.001, "{} vs {}", a, b);
    }

    #[test]
    fn test_irradiance_wire_layout() {
        let codec = Codec::default();
        let frame = codec.encode_telemetry(&reading(SensorKind::Irradiance, 0, 1000.5)).unwrap();
        assert_eq!(frame.id(), MessageIds::IRRADIANCE_1);
        assert_eq!(frame.len(), 5);
        // 1_000_500 = 0x0F_4434
        assert_eq!(frame.payload(), &[0x34, 0x44, 0x0F, 0x00, 0x00]);

        let frame = codec.encode_telemetry(&reading(SensorKind::Irradiance, 1, 0.0)).unwrap();
        assert_eq!(frame.id(), MessageIds::IRRADIANCE_2);
        assert_eq!(frame.payload(), &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_irradiance_negative_is_twos_complement() {
        let codec = Codec::default();
        let frame = codec.encode_telemetry(&reading(SensorKind::Irradiance, 0, -0.001)).unwrap();
        assert_eq!(frame.payload(), &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        let t = codec.decode_telemetry(&frame).unwrap();
        assert_close(t.value, -0.001);
    }

    #[test]
    fn test_temperature_wire_layout() {
        let codec = Codec::default();
        let frame = codec.encode_telemetry(&reading(SensorKind::Temperature, 0, 25.0)).unwrap();
        assert_eq!(frame.id(), MessageIds::TEMPERATURE);
        assert_eq!(frame.len(), 4);
        // 25_000 = 0x61A8, probe 0 leaves the top bits clear
        assert_eq!(frame.payload(), &[0xA8, 0x61, 0x00, 0x00]);

        let frame = codec.encode_telemetry(&reading(SensorKind::Temperature, 5, 25.0)).unwrap();
        assert_eq!(frame.payload(), &[0xA8, 0x61, 0x00, 0xA0]);
    }

    #[test]
    fn test_roundtrip_preserves_kind_id_and_value() {
        let codec = Codec::default();
        let cases = [
            reading(SensorKind::Irradiance, 0, 812.25),
            reading(SensorKind::Irradiance, 1, 0.004),
            reading(SensorKind::Temperature, 0, -40.125),
            reading(SensorKind::Temperature, 7, 85.5),
            reading(SensorKind::Temperature, 3, 21.0),
        ];
        for r in cases {
            let frame = codec.encode_telemetry(&r).unwrap();
            let t = codec.decode_telemetry(&frame).unwrap();
            assert_eq!(t.kind, r.kind);
            assert_eq!(t.sensor_id, r.sensor_id);
            assert_close(t.value, r.value);
        }
    }

    #[test]
    fn test_values_truncate_toward_zero() {
        let codec = Codec::default();
        let frame = codec.encode_telemetry(&reading(SensorKind::Temperature, 0, 1.0009)).unwrap();
        assert_eq!(codec.decode_telemetry(&frame).unwrap().value, 1.0);
        let frame = codec.encode_telemetry(&reading(SensorKind::Temperature, 0, -1.0009)).unwrap();
        assert_eq!(codec.decode_telemetry(&frame).unwrap().value, -1.0);
    }

    #[test]
    fn test_values_saturate() {
        let codec = Codec::default();
        // Saturation must not spill into the probe index bits.
        let frame = codec.encode_telemetry(&reading(SensorKind::Temperature, 2, 1.0e9)).unwrap();
        assert_eq!(frame.payload(), &[0xFF, 0xFF, 0xFF, 0x4F]);
        let t = codec.decode_telemetry(&frame).unwrap();
        assert_eq!(t.sensor_id, 2);
        assert!(t.value > 268_000.0);

        let frame = codec.encode_telemetry(&reading(SensorKind::Temperature, 2, f32::NEG_INFINITY)).unwrap();
        assert_eq!(frame.payload(), &[0x00, 0x00, 0x00, 0x50]);
        let t = codec.decode_telemetry(&frame).unwrap();
        assert_eq!(t.sensor_id, 2);
        assert!(t.value < -268_000.0);
    }

    #[test]
    fn test_encode_rejects() {
        let codec = Codec::default();
        assert_eq!(
            codec.encode_telemetry(&reading(SensorKind::Voltage, 0, 1.0)),
            Err(EncodeError::UnsupportedKind(SensorKind::Voltage))
        );
        assert_eq!(
            codec.encode_telemetry(&reading(SensorKind::Irradiance, 2, 1.0)),
            Err(EncodeError::SensorIdOutOfRange { kind: SensorKind::Irradiance, sensor_id: 2 })
        );
        assert_eq!(
            codec.encode_telemetry(&reading(SensorKind::Temperature, 8, 1.0)),
            Err(EncodeError::SensorIdOutOfRange { kind: SensorKind::Temperature, sensor_id: 8 })
        );
        assert_eq!(
            codec.encode_telemetry(&reading(SensorKind::Temperature, 0, f32::NAN)),
            Err(EncodeError::NotANumber)
        );
    }

    #[test]
    fn test_decode_rejects() {
        let codec = Codec::default();
        let short = CanFrame::new(MessageIds::TEMPERATURE, &[1, 2]).unwrap();
        assert_eq!(
            codec.decode_telemetry(&short),
            Err(DecodeError::TelemetryLength { kind: SensorKind::Temperature, expected: 4, got: 2 })
        );
        let cmd = CanFrame::new(MessageIds::ENABLE_DISABLE, &[0]).unwrap();
        assert_eq!(
            codec.decode_telemetry(&cmd),
            Err(DecodeError::UnknownMessageId(CanId::from_const(0x632)))
        );
    }
}
