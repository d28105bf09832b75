// src/mock.rs

// Test doubles for the board collaborators. Each fake is a thin handle onto
// a probe the test keeps, so the test can drive time and inspect effects
// after the fake has been moved into the board.

use core::cell::{Cell, RefCell};
use core::time::Duration;

use crate::common::{CanFrame, CanId, Heartbeat, SensorDriver, Ticker, Transceiver};
use crate::scheduler::ReadySignal;

// --- Ticker ---

#[derive(Default)]
pub struct TickerProbe {
    period: Cell<Option<Duration>>,
    elapsed: Cell<Duration>,
    attaches: Cell<u32>,
    detaches: Cell<u32>,
    fired: Cell<u32>,
}

impl TickerProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `dt` pass, raising `signal` once per elapsed period while attached.
    pub fn advance(&self, dt: Duration, signal: &ReadySignal) {
        let Some(period) = self.period.get() else { return };
        let mut elapsed = self.elapsed.get() + dt;
        while elapsed >= period {
            elapsed -= period;
            self.fired.set(self.fired.get() + 1);
            signal.raise();
        }
        self.elapsed.set(elapsed);
    }

    pub fn period(&self) -> Option<Duration> {
        self.period.get()
    }

    pub fn attaches(&self) -> u32 {
        self.attaches.get()
    }

    pub fn detaches(&self) -> u32 {
        self.detaches.get()
    }

    pub fn fired(&self) -> u32 {
        self.fired.get()
    }
}

pub struct FakeTicker<'a> {
    probe: &'a TickerProbe,
}

impl<'a> FakeTicker<'a> {
    pub fn new(probe: &'a TickerProbe) -> Self {
        FakeTicker { probe }
    }
}

impl Ticker for FakeTicker<'_> {
    fn attach(&mut self, period: Duration) {
        self.probe.period.set(Some(period));
        self.probe.elapsed.set(Duration::ZERO);
        self.probe.attaches.set(self.probe.attaches.get() + 1);
    }

    fn detach(&mut self) {
        if self.probe.period.take().is_some() {
            self.probe.detaches.set(self.probe.detaches.get() + 1);
        }
    }

    fn is_attached(&self) -> bool {
        self.probe.period.get().is_some()
    }
}

// --- Bus ---

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockBusError;

#[derive(Default)]
pub struct BusProbe {
    inbound: RefCell<heapless::Deque<CanFrame, 16>>,
    sent: RefCell<heapless::Vec<CanFrame, 512>>,
    filter: RefCell<heapless::Vec<CanId, 8>>,
    /// When set, `try_send` reports `WouldBlock`.
    pub mailbox_full: Cell<bool>,
    /// When set, `try_receive` reports a bus error.
    pub rx_error: Cell<bool>,
}

impl BusProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_inbound(&self, frame: CanFrame) {
        assert!(self.inbound.borrow_mut().push_back(frame).is_ok(), "inbound queue full");
    }

    pub fn inbound_len(&self) -> usize {
        self.inbound.borrow().len()
    }

    pub fn sent(&self) -> heapless::Vec<CanFrame, 512> {
        self.sent.borrow().clone()
    }

    pub fn sent_with_id(&self, id: CanId) -> usize {
        self.sent.borrow().iter().filter(|f| f.id() == id).count()
    }

    pub fn filter(&self) -> heapless::Vec<CanId, 8> {
        self.filter.borrow().clone()
    }
}

pub struct MockBus<'a> {
    probe: &'a BusProbe,
}

impl<'a> MockBus<'a> {
    pub fn new(probe: &'a BusProbe) -> Self {
        MockBus { probe }
    }
}

impl Transceiver for MockBus<'_> {
    type Error = MockBusError;

    fn try_send(&mut self, frame: &CanFrame) -> nb::Result<(), Self::Error> {
        if self.probe.mailbox_full.get() {
            return Err(nb::Error::WouldBlock);
        }
        self.probe
            .sent
            .borrow_mut()
            .push(*frame)
            .map_err(|_| nb::Error::Other(MockBusError))
    }

    fn try_receive(&mut self) -> nb::Result<CanFrame, Self::Error> {
        if self.probe.rx_error.get() {
            return Err(nb::Error::Other(MockBusError));
        }
        self.probe.inbound.borrow_mut().pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn set_filter(&mut self, accepted: &[CanId]) -> Result<(), Self::Error> {
        let mut filter = self.probe.filter.borrow_mut();
        filter.clear();
        filter.extend_from_slice(accepted).map_err(|_| MockBusError)
    }
}

// --- Heartbeat ---

#[derive(Default)]
pub struct HeartbeatProbe {
    period: Cell<Option<Duration>>,
    changes: Cell<u32>,
    toggles: Cell<u32>,
}

impl HeartbeatProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current blink period, `None` while disabled.
    pub fn period(&self) -> Option<Duration> {
        self.period.get()
    }

    /// Number of `set_period`/`disable` calls.
    pub fn changes(&self) -> u32 {
        self.changes.get()
    }

    pub fn toggles(&self) -> u32 {
        self.toggles.get()
    }
}

pub struct MockHeartbeat<'a> {
    probe: &'a HeartbeatProbe,
}

impl<'a> MockHeartbeat<'a> {
    pub fn new(probe: &'a HeartbeatProbe) -> Self {
        MockHeartbeat { probe }
    }
}

impl Heartbeat for MockHeartbeat<'_> {
    fn set_period(&mut self, period: Duration) {
        self.probe.period.set(Some(period));
        self.probe.changes.set(self.probe.changes.get() + 1);
    }

    fn disable(&mut self) {
        self.probe.period.set(None);
        self.probe.changes.set(self.probe.changes.get() + 1);
    }

    fn toggle(&mut self) {
        self.probe.toggles.set(self.probe.toggles.get() + 1);
    }
}

// --- Sensors ---

/// Driver that fails while `failing` is set and otherwise returns `value`.
pub struct ScriptedDriver<'a> {
    pub value: f32,
    pub failing: &'a Cell<bool>,
}

impl SensorDriver for ScriptedDriver<'_> {
    type Error = ();

    fn sample(&mut self) -> Result<f32, Self::Error> {
        if self.failing.get() { Err(()) } else { Ok(self.value) }
    }
}
