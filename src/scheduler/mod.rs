// src/scheduler/mod.rs

//! Bridges periodic tickers to the processing loop.
//!
//! Each sampling channel owns one [`ReadySignal`]. The ticker callback runs in
//! interrupt context and does nothing but [`ReadySignal::raise`]; the loop
//! takes the flag once per iteration and, if it was set, samples that channel
//! synchronously.
//!
//! The signal is a flag, not a counter: most-recent-wins, intermediate samples
//! may be dropped if the consumer falls behind. Every raise that lands on an
//! already-set flag is counted in [`ReadySignal::coalesced`].

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use core::time::Duration;

use crate::common::Ticker;

/// Single-producer (ticker) / single-consumer (loop) ready flag.
///
/// # Usage
///
/// ```ignore
/// static IRRADIANCE_READY: ReadySignal = ReadySignal::new();
///
/// // In the ticker callback:
/// IRRADIANCE_READY.raise();
///
/// // In the main loop:
/// if IRRADIANCE_READY.take() {
///     sample_irradiance();
/// }
/// ```
#[derive(Debug)]
pub struct ReadySignal {
    ready: AtomicBool,

    /// Ticks that found the flag still set (dropped samples).
    coalesced: AtomicU32,
}

impl ReadySignal {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            coalesced: AtomicU32::new(0),
        }
    }

    /// Marks the channel ready. Interrupt-safe, never blocks.
    #[inline]
    pub fn raise(&self) {
        if self.ready.swap(true, Ordering::AcqRel) {
            self.coalesced.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Consumes the pending event, if any.
    #[inline]
    pub fn take(&self) -> bool {
        self.ready.swap(false, Ordering::AcqRel)
    }

    /// Drops a pending event without consuming it.
    #[inline]
    pub fn clear(&self) {
        self.ready.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Total ticks merged into an already pending event since boot.
    #[inline]
    pub fn coalesced(&self) -> u32 {
        self.coalesced.load(Ordering::Relaxed)
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The sampling channels of a board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Irradiance,
    Temperature,
}

impl Channel {
    /// Service order within one loop iteration.
    pub const ALL: [Channel; 2] = [Channel::Irradiance, Channel::Temperature];
}

/// A ticker bound to the ready signal its callback raises.
#[derive(Debug)]
pub struct SamplingChannel<'a, T> {
    signal: &'a ReadySignal,
    ticker: T,
}

impl<'a, T: Ticker> SamplingChannel<'a, T> {
    pub fn new(signal: &'a ReadySignal, ticker: T) -> Self {
        SamplingChannel { signal, ticker }
    }

    /// Arms periodic sampling. Re-arming a running channel restarts its
    /// schedule instead of stacking a second one.
    pub fn start(&mut self, period: Duration) {
        if self.ticker.is_attached() {
            self.ticker.detach();
        }
        self.signal.clear();
        self.ticker.attach(period);
    }

    /// Disarms sampling and discards any pending event. Safe when already
    /// stopped.
    pub fn stop(&mut self) {
        self.ticker.detach();
        self.signal.clear();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.ticker.is_attached()
    }

    #[inline]
    pub fn take_ready(&self) -> bool {
        self.signal.take()
    }

    pub fn signal(&self) -> &'a ReadySignal {
        self.signal
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }
}

/// Channels that were ready at one poll, in service order.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct ReadySet {
    irradiance: bool,
    temperature: bool,
}

impl ReadySet {
    pub fn contains(&self, channel: Channel) -> bool {
        match channel {
            Channel::Irradiance => self.irradiance,
            Channel::Temperature => self.temperature,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.irradiance && !self.temperature
    }

    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// The irradiance channel plus an optional temperature channel, each with
/// its configured period.
#[derive(Debug)]
pub struct Scheduler<'a, T> {
    irradiance: (SamplingChannel<'a, T>, Duration),
    temperature: Option<(SamplingChannel<'a, T>, Duration)>,
}

impl<'a, T: Ticker> Scheduler<'a, T> {
    pub fn new(irradiance: SamplingChannel<'a, T>, irradiance_period: Duration) -> Self {
        Scheduler {
            irradiance: (irradiance, irradiance_period),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, channel: SamplingChannel<'a, T>, period: Duration) -> Self {
        self.temperature = Some((channel, period));
        self
    }

    pub fn channel(&self, channel: Channel) -> Option<&SamplingChannel<'a, T>> {
        match channel {
            Channel::Irradiance => Some(&self.irradiance.0),
            Channel::Temperature => self.temperature.as_ref().map(|(c, _)| c),
        }
    }

    pub fn period(&self, channel: Channel) -> Option<Duration> {
        match channel {
            Channel::Irradiance => Some(self.irradiance.1),
            Channel::Temperature => self.temperature.as_ref().map(|(_, p)| *p),
        }
    }

    /// Arms every configured channel at its period.
    pub fn start_all(&mut self) {
        let (irr, period) = &mut self.irradiance;
        irr.start(*period);
        if let Some((temp, period)) = &mut self.temperature {
            temp.start(*period);
        }
    }

    pub fn stop_all(&mut self) {
        self.irradiance.0.stop();
        if let Some((temp, _)) = &mut self.temperature {
            temp.stop();
        }
    }

    pub fn any_running(&self) -> bool {
        Channel::ALL
            .iter()
            .filter_map(|c| self.channel(*c))
            .any(|c| c.is_running())
    }

    /// Takes the ready flag of every channel. Each channel reports at most
    /// one event per poll regardless of how many ticks elapsed.
    pub fn poll(&mut self) -> ReadySet {
        ReadySet {
            irradiance: self.irradiance.0.take_ready(),
            temperature: self
                .temperature
                .as_ref()
                .map(|(c, _)| c.take_ready())
                .unwrap_or(false),
        }
    }
}
