// src/common/timing.rs

use core::time::Duration;

// Nominal values used by the board presets. The board wiring converts these
// into ticker periods; nothing here is enforced at runtime except through
// `BoardConfig::validate`.

// === Sampling ===

/// Default irradiance sampling rate (TSL2591).
pub const IRRADIANCE_RATE_HZ: u32 = 10;
/// Default temperature sampling rate (MAX31865 probes).
pub const TEMPERATURE_RATE_HZ: u32 = 2;
/// Highest sampling rate accepted by configuration validation.
pub const MAX_SAMPLE_RATE_HZ: u32 = 1000;

// === Main Loop ===

/// Cadence of the command poll / processing loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

// === Indicators ===

/// Heartbeat toggle period while sampling (0.5 Hz blink).
pub const HEARTBEAT_PERIOD: Duration = Duration::from_millis(1000);
/// Factor by which the heartbeat slows down while the board is idle.
pub const IDLE_HEARTBEAT_FACTOR: u32 = 3;
/// Boot sequence: blinks per LED.
pub const BOOT_BLINK_CYCLES: u8 = 4;
/// Boot sequence: on and off time per blink.
pub const BOOT_BLINK_HALF_PERIOD: Duration = Duration::from_millis(100);

/// Converts a rate in Hz to the ticker period, using integer milliseconds
/// the way the board tickers are programmed.
pub const fn period_from_hz(rate_hz: u32) -> Duration {
    Duration::from_millis((1000 / rate_hz) as u64)
}
