// src/device/board.rs

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use super::state::{DeviceState, Event, StateMachine, Transition};
use crate::codec::{Codec, FrameObserver};
use crate::common::{
    BoardConfig, BoardError, CanFrame, ConfigError, DecodeError, EncodeError, ErrorReport,
    Heartbeat, Reading, SensorDriver, SequenceCounter, Ticker, Transceiver, MAX_TEMP_PROBES,
};
use crate::scheduler::{Channel, SamplingChannel, Scheduler};
use crate::sensor::SensorSource;

/// Collaborators handed to [`Board::new`].
pub struct BoardParts<'a, X, T, H, I, P> {
    pub bus: X,
    pub heartbeat: H,
    pub irradiance_channel: SamplingChannel<'a, T>,
    pub irradiance: SensorSource<I>,
    /// Required when the configuration has a temperature rate.
    pub temperature_channel: Option<SamplingChannel<'a, T>>,
    pub probes: heapless::Vec<SensorSource<P>, MAX_TEMP_PROBES>,
}

/// Counters since boot, for diagnostics.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct BoardStats {
    pub frames_sent: u32,
    /// Frames the transceiver refused; never retried.
    pub frames_dropped: u32,
    pub rx_errors: u32,
    pub unknown_ids: u32,
    pub sensor_failures: u32,
    pub faults_reported: u32,
    pub recoveries: u32,
}

/// The board control core.
///
/// Owns the transceiver, sampling scheduler, heartbeat, sensor sources and
/// trace sink. [`step`](Self::step) is one iteration of the processing loop:
///
/// 1. run entry actions still pending (the initial state at power-up),
/// 2. read at most one inbound frame and apply it to the state machine,
/// 3. take the ready flags and, only while `On`, sample and transmit.
///
/// Step 2 happens-before step 3, so a Disable received in an iteration stops
/// the tickers and discards their pending flags before sampling is considered.
pub struct Board<'a, X, T, H, I, P, O = ()> {
    config: BoardConfig,
    codec: Codec,
    bus: X,
    scheduler: Scheduler<'a, T>,
    heartbeat: H,
    irradiance: SensorSource<I>,
    probes: heapless::Vec<SensorSource<P>, MAX_TEMP_PROBES>,
    observer: O,
    fsm: StateMachine,
    sequence: SequenceCounter,
    stats: BoardStats,
    /// Heartbeat toggle period, `None` while disabled.
    blink_period: Option<Duration>,
    /// Loop time accumulated since the last heartbeat toggle.
    blink_elapsed: Duration,
}

impl<'a, X, T, H, I, P> Board<'a, X, T, H, I, P, ()>
where
    X: Transceiver,
    T: Ticker,
    H: Heartbeat,
    I: SensorDriver,
    P: SensorDriver,
{
    /// Validates `config` against the supplied parts and installs the
    /// receive filter. Nothing is armed until the first [`step`](Self::step).
    pub fn new(
        config: BoardConfig,
        parts: BoardParts<'a, X, T, H, I, P>,
    ) -> Result<Self, BoardError<X::Error>> {
        config.validate()?;
        if parts.probes.len() != config.temperature_probes {
            return Err(ConfigError::ProbeChannelMismatch.into());
        }

        let mut scheduler = Scheduler::new(parts.irradiance_channel, config.irradiance_period());
        match (parts.temperature_channel, config.temperature_period()) {
            (Some(channel), Some(period)) => {
                scheduler = scheduler.with_temperature(channel, period);
            }
            (None, None) => {}
            _ => return Err(ConfigError::ProbeChannelMismatch.into()),
        }

        let codec = Codec::new(config.ids);
        let mut bus = parts.bus;
        bus.set_filter(&codec.accepted_ids()).map_err(BoardError::io)?;

        info!(
            "board {} up: irradiance {} Hz, {} probe(s)",
            config.variant,
            config.irradiance_rate_hz,
            config.temperature_probes
        );

        Ok(Board {
            config,
            codec,
            bus,
            scheduler,
            heartbeat: parts.heartbeat,
            irradiance: parts.irradiance,
            probes: parts.probes,
            observer: (),
            fsm: StateMachine::default(),
            sequence: SequenceCounter::new(),
            stats: BoardStats::default(),
            blink_period: None,
            blink_elapsed: Duration::ZERO,
        })
    }
}

impl<'a, X, T, H, I, P, O> Board<'a, X, T, H, I, P, O>
where
    X: Transceiver,
    T: Ticker,
    H: Heartbeat,
    I: SensorDriver,
    P: SensorDriver,
    O: FrameObserver,
{
    /// Attaches a trace sink that sees every transmitted frame.
    pub fn with_observer<O2: FrameObserver>(self, observer: O2) -> Board<'a, X, T, H, I, P, O2> {
        Board {
            config: self.config,
            codec: self.codec,
            bus: self.bus,
            scheduler: self.scheduler,
            heartbeat: self.heartbeat,
            irradiance: self.irradiance,
            probes: self.probes,
            observer,
            fsm: self.fsm,
            sequence: self.sequence,
            stats: self.stats,
            blink_period: self.blink_period,
            blink_elapsed: self.blink_elapsed,
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> DeviceState {
        self.fsm.state()
    }

    pub fn stats(&self) -> &BoardStats {
        &self.stats
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn scheduler(&self) -> &Scheduler<'a, T> {
        &self.scheduler
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    // --- Main Loop ---

    /// Runs the processing loop forever, sleeping the configured poll
    /// interval between iterations.
    pub fn run<D: DelayNs>(&mut self, delay: &mut D) -> ! {
        let pause_ms = self.config.poll_interval.as_millis() as u32;
        loop {
            self.step();
            delay.delay_ms(pause_ms);
        }
    }

    /// [`run`](Self::run) for executor-based firmware: awaits the poll
    /// interval instead of blocking. Never returns.
    #[cfg(feature = "async")]
    pub async fn run_async<D: embedded_hal_async::delay::DelayNs>(&mut self, delay: &mut D) {
        let pause_ms = self.config.poll_interval.as_millis() as u32;
        loop {
            self.step();
            delay.delay_ms(pause_ms).await;
        }
    }

    /// One loop iteration. Never blocks and never fails; faults become state
    /// transitions. Each call stands for one poll interval of wall time,
    /// which paces the heartbeat.
    pub fn step(&mut self) {
        self.dispatch();
        self.poll_bus();
        self.service_channels();
        self.pace_heartbeat(self.config.poll_interval);
    }

    // --- Heartbeat ---

    fn set_blink(&mut self, period: Option<Duration>) {
        match period {
            Some(period) => self.heartbeat.set_period(period),
            None => self.heartbeat.disable(),
        }
        self.blink_period = period;
        self.blink_elapsed = Duration::ZERO;
    }

    /// Toggles the heartbeat once per elapsed period.
    fn pace_heartbeat(&mut self, dt: Duration) {
        let Some(period) = self.blink_period else {
            return;
        };
        self.blink_elapsed += dt;
        while self.blink_elapsed >= period {
            self.blink_elapsed -= period;
            self.heartbeat.toggle();
        }
    }

    fn poll_bus(&mut self) {
        match self.bus.try_receive() {
            Ok(frame) => self.handle_frame(&frame),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(_)) => {
                self.stats.rx_errors = self.stats.rx_errors.wrapping_add(1);
                warn!("bus receive error");
            }
        }
    }

    fn handle_frame(&mut self, frame: &CanFrame) {
        match self.codec.decode_command(frame) {
            Ok(Some(command)) => {
                debug!("command {}", command);
                self.apply(Event::Command(command));
            }
            Ok(None) => {
                trace!("ignoring frame {}", frame.id());
            }
            Err(DecodeError::UnknownMessageId(id)) => {
                // Not ours: the filter should have kept it off the board.
                self.stats.unknown_ids = self.stats.unknown_ids.wrapping_add(1);
                warn!("unknown message id {}", id);
            }
            Err(e) => {
                warn!("rejected command: {}", e);
                self.apply(Event::Fault(ErrorReport::from(&e)));
            }
        }
    }

    fn apply(&mut self, event: Event) {
        if self.fsm.handle(event) {
            self.dispatch();
        }
    }

    /// Runs exit and entry actions for a pending transition, once.
    fn dispatch(&mut self) {
        let Some(transition) = self.fsm.take_transition() else {
            return;
        };
        info!("state {} -> {}", transition.from, transition.to);
        if let Some(from) = transition.from {
            self.on_exit(from);
        }
        self.on_enter(transition);
    }

    fn on_exit(&mut self, state: DeviceState) {
        if let DeviceState::Error(report) = state {
            self.stats.recoveries = self.stats.recoveries.wrapping_add(1);
            info!("recovered from fault {}", report);
        }
    }

    fn on_enter(&mut self, transition: Transition) {
        match transition.to {
            DeviceState::On => {
                self.scheduler.start_all();
                self.set_blink(Some(self.config.heartbeat_period));
            }
            DeviceState::Off => {
                self.scheduler.stop_all();
                self.set_blink(Some(self.config.idle_heartbeat_period()));
            }
            DeviceState::Error(report) => {
                self.scheduler.stop_all();
                self.set_blink(None);
                self.stats.faults_reported = self.stats.faults_reported.wrapping_add(1);
                error!("fault {}", report);
                let frame = self.codec.encode_fault(&report);
                self.transmit(&frame);
            }
        }
    }

    // --- Sampling ---

    fn service_channels(&mut self) {
        let ready = self.scheduler.poll();
        if !self.fsm.state().is_on() {
            // Flags raised before the tickers were stopped.
            if !ready.is_empty() {
                trace!("discarding stale ready flags");
            }
            return;
        }
        for channel in ready.iter() {
            match channel {
                Channel::Irradiance => {
                    let result = self.irradiance.read(&mut self.sequence);
                    self.publish(result);
                }
                Channel::Temperature => {
                    for i in 0..self.probes.len() {
                        if !self.fsm.state().is_on() {
                            break;
                        }
                        let result = self.probes[i].read(&mut self.sequence);
                        self.publish(result);
                    }
                }
            }
            if !self.fsm.state().is_on() {
                break;
            }
        }
    }

    fn publish<E: core::fmt::Debug>(&mut self, result: Result<Reading, E>) {
        let reading = match result {
            Ok(reading) => reading,
            Err(_) => {
                // The next period's sample supersedes this one.
                self.stats.sensor_failures = self.stats.sensor_failures.wrapping_add(1);
                warn!("sensor acquisition failed");
                return;
            }
        };
        match self.codec.encode_telemetry(&reading) {
            Ok(frame) => self.transmit(&frame),
            Err(EncodeError::NotANumber) => {
                self.stats.sensor_failures = self.stats.sensor_failures.wrapping_add(1);
                warn!("discarding NaN reading from {} {}", reading.kind, reading.sensor_id);
            }
            Err(e) => {
                // A source the message table cannot carry: wiring is wrong.
                error!("cannot encode reading: {}", e);
                self.apply(Event::Fault(ErrorReport::bad_internal_state(reading.sensor_id)));
            }
        }
    }

    /// Best effort: a refused frame is counted and dropped.
    fn transmit(&mut self, frame: &CanFrame) {
        match self.bus.try_send(frame) {
            Ok(()) => {
                self.stats.frames_sent = self.stats.frames_sent.wrapping_add(1);
                self.observer.on_transmit(frame);
            }
            Err(nb::Error::WouldBlock) => {
                self.stats.frames_dropped = self.stats.frames_dropped.wrapping_add(1);
                warn!("tx mailbox full, dropped {}", frame.id());
            }
            Err(nb::Error::Other(_)) => {
                self.stats.frames_dropped = self.stats.frames_dropped.wrapping_add(1);
                warn!("tx error, dropped {}", frame.id());
            }
        }
    }
}
