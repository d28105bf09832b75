// src/common/config.rs

use core::time::Duration;

use super::error::ConfigError;
use super::frame::CanId;
use super::timing;

/// Number of SPI chip selects wired for temperature probes on board A.
pub const MAX_TEMP_PROBES: usize = 8;

/// Number of irradiance message slots on the bus.
pub const MAX_IRRADIANCE_SENSORS: usize = 2;

/// Message identifiers used by a board. These are deployment configuration;
/// the defaults match the vehicle's CAN map.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageIds {
    /// Irradiance telemetry, indexed by irradiance sensor id.
    pub irradiance: [CanId; MAX_IRRADIANCE_SENSORS],
    /// Enable/Disable command (inbound).
    pub enable_disable: CanId,
    /// Fault report (outbound).
    pub fault: CanId,
    /// Temperature telemetry, probe index packed into the payload.
    pub temperature: CanId,
}

impl MessageIds {
    pub const IRRADIANCE_1: CanId = CanId::from_const(0x630);
    pub const IRRADIANCE_2: CanId = CanId::from_const(0x631);
    pub const ENABLE_DISABLE: CanId = CanId::from_const(0x632);
    pub const FAULT: CanId = CanId::from_const(0x633);
    pub const TEMPERATURE: CanId = CanId::from_const(0x634);

    /// All identifiers in the table, commands first.
    pub fn all(&self) -> [CanId; 5] {
        [
            self.enable_disable,
            self.irradiance[0],
            self.irradiance[1],
            self.temperature,
            self.fault,
        ]
    }

    fn check_unique(&self) -> Result<(), ConfigError> {
        let ids = self.all();
        for (i, a) in ids.iter().enumerate() {
            if ids[i + 1..].contains(a) {
                return Err(ConfigError::DuplicateId(*a));
            }
        }
        Ok(())
    }
}

impl Default for MessageIds {
    fn default() -> Self {
        MessageIds {
            irradiance: [Self::IRRADIANCE_1, Self::IRRADIANCE_2],
            enable_disable: Self::ENABLE_DISABLE,
            fault: Self::FAULT,
            temperature: Self::TEMPERATURE,
        }
    }
}

/// Hardware population of a board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardVariant {
    /// Vehicle board: light sensor plus a set of RTD temperature probes.
    A,
    /// Bench board: a sole light sensor and a heartbeat LED.
    B,
}

/// Static configuration of one board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    pub variant: BoardVariant,
    pub ids: MessageIds,
    pub irradiance_rate_hz: u32,
    /// `None` when the board carries no temperature probes.
    pub temperature_rate_hz: Option<u32>,
    /// Number of temperature probes populated (chip selects 0..n).
    pub temperature_probes: usize,
    /// Heartbeat toggle period while sampling.
    pub heartbeat_period: Duration,
    /// Heartbeat slowdown while idle.
    pub idle_heartbeat_factor: u32,
    /// Main loop sleep between iterations.
    pub poll_interval: Duration,
}

impl BoardConfig {
    /// Board A: irradiance at 10 Hz plus one MAX31865 probe at 2 Hz.
    pub fn board_a() -> Self {
        BoardConfig {
            variant: BoardVariant::A,
            ids: MessageIds::default(),
            irradiance_rate_hz: timing::IRRADIANCE_RATE_HZ,
            temperature_rate_hz: Some(timing::TEMPERATURE_RATE_HZ),
            temperature_probes: 1,
            heartbeat_period: timing::HEARTBEAT_PERIOD,
            idle_heartbeat_factor: timing::IDLE_HEARTBEAT_FACTOR,
            poll_interval: timing::POLL_INTERVAL,
        }
    }

    /// Board B: irradiance only.
    pub fn board_b() -> Self {
        BoardConfig {
            variant: BoardVariant::B,
            temperature_rate_hz: None,
            temperature_probes: 0,
            ..Self::board_a()
        }
    }

    /// Sets the number of populated temperature probes.
    pub fn with_probes(mut self, probes: usize) -> Self {
        self.temperature_probes = probes;
        self
    }

    pub fn irradiance_period(&self) -> Duration {
        timing::period_from_hz(self.irradiance_rate_hz)
    }

    pub fn temperature_period(&self) -> Option<Duration> {
        self.temperature_rate_hz.map(timing::period_from_hz)
    }

    /// Heartbeat period while the board is OFF.
    pub fn idle_heartbeat_period(&self) -> Duration {
        self.heartbeat_period * self.idle_heartbeat_factor
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate(self.irradiance_rate_hz)?;
        if let Some(rate) = self.temperature_rate_hz {
            check_rate(rate)?;
        }
        if self.temperature_probes > MAX_TEMP_PROBES {
            return Err(ConfigError::TooManyProbes {
                got: self.temperature_probes,
                max: MAX_TEMP_PROBES,
            });
        }
        if self.temperature_rate_hz.is_some() != (self.temperature_probes > 0) {
            return Err(ConfigError::ProbeChannelMismatch);
        }
        if self.heartbeat_period.is_zero()
            || self.poll_interval.is_zero()
            || self.idle_heartbeat_factor == 0
        {
            return Err(ConfigError::ZeroPeriod);
        }
        self.ids.check_unique()
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::board_a()
    }
}

fn check_rate(rate_hz: u32) -> Result<(), ConfigError> {
    if rate_hz == 0 || rate_hz > timing::MAX_SAMPLE_RATE_HZ {
        Err(ConfigError::InvalidSampleRate(rate_hz))
    } else {
        Ok(())
    }
}
