// src/common/hal_traits.rs

use super::frame::{CanFrame, CanId};
use core::fmt::Debug;
use core::time::Duration;

/// Abstraction for non-blocking access to the CAN transceiver.
pub trait Transceiver {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to queue a frame for transmission.
    ///
    /// Returns `Ok(())` if the frame was accepted, or `Err(nb::Error::WouldBlock)`
    /// if every transmit mailbox is busy. The caller never retries: a frame that
    /// could not be queued is dropped.
    fn try_send(&mut self, frame: &CanFrame) -> nb::Result<(), Self::Error>;

    /// Attempts to read one received frame.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if nothing is waiting.
    fn try_receive(&mut self) -> nb::Result<CanFrame, Self::Error>;

    /// Restricts reception to the given identifiers. Called once at startup.
    fn set_filter(&mut self, accepted: &[CanId]) -> Result<(), Self::Error>;
}

/// A periodic timer. Each expiry must raise the
/// [`ReadySignal`](crate::scheduler::ReadySignal) its
/// [`SamplingChannel`](crate::scheduler::SamplingChannel) was built with, and
/// do nothing else; the firmware wires the two together when it builds them.
pub trait Ticker {
    /// Arms the ticker with `period`, replacing any previous schedule.
    fn attach(&mut self, period: Duration);

    /// Disarms the ticker. Must be harmless when already detached.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

/// The liveness indicator driven by state entry actions.
pub trait Heartbeat {
    /// Blink with the given toggle period.
    fn set_period(&mut self, period: Duration);

    /// Stop blinking and leave the indicator off.
    fn disable(&mut self);

    /// Flip the indicator once. The board calls this each time the current
    /// period has elapsed.
    fn toggle(&mut self);
}

/// Raw physical acquisition for one sensor instance.
pub trait SensorDriver {
    type Error: Debug;

    /// Performs one acquisition and returns the value in engineering units
    /// (W/m² for irradiance, °C for temperature).
    fn sample(&mut self) -> Result<f32, Self::Error>;
}
