// src/common/types.rs

// --- Sensor Kinds ---

/// The physical quantity a sensor measures.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SensorKind {
    None = 0,
    Voltage = 1,
    Current = 2,
    Irradiance = 3,
    Temperature = 4,
}

impl SensorKind {
    /// Tries to convert a u8 into a SensorKind.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SensorKind::None),
            1 => Some(SensorKind::Voltage),
            2 => Some(SensorKind::Current),
            3 => Some(SensorKind::Irradiance),
            4 => Some(SensorKind::Temperature),
            _ => None,
        }
    }
}

// --- Readings ---

/// One sample produced by a sensor source, consumed once by the codec.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub kind: SensorKind,
    /// Which physical instance of `kind` produced the value (probe index,
    /// irradiance sensor 0/1).
    pub sensor_id: u8,
    pub value: f32,
    /// Monotonic counter, reset at process start.
    pub sequence: u32,
}

impl Reading {
    pub fn new(kind: SensorKind, sensor_id: u8, value: f32, sequence: u32) -> Self {
        Self {
            kind,
            sensor_id,
            value,
            sequence,
        }
    }
}

/// The content of a telemetry frame as seen by a receiver. The sequence
/// counter does not travel on the wire.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    pub kind: SensorKind,
    pub sensor_id: u8,
    pub value: f32,
}

impl From<Reading> for Telemetry {
    fn from(r: Reading) -> Self {
        Telemetry {
            kind: r.kind,
            sensor_id: r.sensor_id,
            value: r.value,
        }
    }
}

/// Monotonic reading counter owned by the main loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter(u32);

impl SequenceCounter {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Returns the current value and advances. Wraps after `u32::MAX` samples
    /// (13 years at 10 Hz).
    pub fn next(&mut self) -> u32 {
        let current = self.0;
        self.0 = self.0.wrapping_add(1);
        current
    }

    pub fn peek(&self) -> u32 {
        self.0
    }
}
