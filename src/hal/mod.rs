// src/hal/mod.rs

//! Glue between the board core and `embedded-hal` peripherals: the status
//! LEDs and, behind the `embedded-can` feature, the CAN controller.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, StatefulOutputPin};

use crate::common::timing::{BOOT_BLINK_CYCLES, BOOT_BLINK_HALF_PERIOD};
use crate::common::Heartbeat;

#[cfg(feature = "embedded-can")]
mod can;
#[cfg(feature = "embedded-can")]
pub use can::CanAdapter;

fn delay_for<D: DelayNs>(delay: &mut D, period: Duration) {
    delay.delay_us(period.as_micros() as u32);
}

/// Blinks `pin` `cycles` times, `half_period` on then `half_period` off.
/// Leaves the pin low.
pub fn cycle_led<P: OutputPin, D: DelayNs>(
    pin: &mut P,
    delay: &mut D,
    cycles: u8,
    half_period: Duration,
) -> Result<(), P::Error> {
    for _ in 0..cycles {
        pin.set_high()?;
        delay_for(delay, half_period);
        pin.set_low()?;
        delay_for(delay, half_period);
    }
    Ok(())
}

/// Power-up sequence: each LED in turn blinks [`BOOT_BLINK_CYCLES`] times.
pub fn boot_blink<P: OutputPin, D: DelayNs>(leds: &mut [P], delay: &mut D) -> Result<(), P::Error> {
    for led in leds.iter_mut() {
        cycle_led(led, delay, BOOT_BLINK_CYCLES, BOOT_BLINK_HALF_PERIOD)?;
    }
    Ok(())
}

/// [`Heartbeat`] on a plain GPIO.
///
/// The board paces [`Heartbeat::toggle`] from its loop; the period is kept
/// for inspection and toggles are ignored while disabled. Pin errors are
/// logged and dropped.
#[derive(Debug)]
pub struct PinHeartbeat<P> {
    pin: P,
    period: Option<Duration>,
}

impl<P: StatefulOutputPin> PinHeartbeat<P> {
    /// Starts disabled; the first state entry sets the period.
    pub fn new(pin: P) -> Self {
        PinHeartbeat { pin, period: None }
    }

    /// Current toggle period, `None` while disabled.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: StatefulOutputPin> Heartbeat for PinHeartbeat<P> {
    fn set_period(&mut self, period: Duration) {
        self.period = Some(period);
    }

    fn disable(&mut self) {
        self.period = None;
        if self.pin.set_low().is_err() {
            warn!("heartbeat pin error");
        }
    }

    fn toggle(&mut self) {
        if self.period.is_none() {
            return;
        }
        if self.pin.toggle().is_err() {
            warn!("heartbeat pin error");
        }
    }
}
