// src/device/state.rs

use crate::codec::Command;
use crate::common::ErrorReport;

/// Device-level state. Exactly one is active at a time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Sampling and reporting.
    On,
    /// Halted by command; heartbeat slowed.
    Off,
    /// Halted by a fault; carries the report sent on entry.
    Error(ErrorReport),
}

impl DeviceState {
    /// Boards come up sampling, without waiting for an Enable command.
    pub const INITIAL: DeviceState = DeviceState::On;

    /// Same state regardless of payload. A second fault while already in
    /// `Error` is not a new state.
    pub fn same_kind(&self, other: &DeviceState) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    pub fn is_on(&self) -> bool {
        matches!(self, DeviceState::On)
    }
}

/// Inputs that can move the state machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Command(Command),
    Fault(ErrorReport),
}

/// A state change whose entry (and exit) actions have not run yet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// `None` for the initial entry at power-up.
    pub from: Option<DeviceState>,
    pub to: DeviceState,
}

/// Edge-triggered state machine.
///
/// `entry_pending` is the edge detector: it is set when the state changes and
/// cleared when the owner takes the transition to run its entry actions, so
/// each action runs once per change and never on every loop iteration.
/// Requests for the state already active leave it untouched.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: DeviceState,
    previous: Option<DeviceState>,
    entry_pending: bool,
}

impl StateMachine {
    /// Starts in `initial` with its entry actions pending.
    pub const fn new(initial: DeviceState) -> Self {
        StateMachine {
            state: initial,
            previous: None,
            entry_pending: true,
        }
    }

    #[inline]
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Maps an event to its target state and requests it. Returns `true` if
    /// the state changed.
    pub fn handle(&mut self, event: Event) -> bool {
        let next = match event {
            Event::Command(Command::Enable) => DeviceState::On,
            Event::Command(Command::Disable) => DeviceState::Off,
            Event::Fault(report) => DeviceState::Error(report),
        };
        self.request(next)
    }

    pub fn request(&mut self, next: DeviceState) -> bool {
        if self.state.same_kind(&next) {
            return false;
        }
        self.previous = Some(self.state);
        self.state = next;
        self.entry_pending = true;
        true
    }

    /// Hands out the pending transition exactly once.
    pub fn take_transition(&mut self) -> Option<Transition> {
        if !self.entry_pending {
            return None;
        }
        self.entry_pending = false;
        Some(Transition {
            from: self.previous,
            to: self.state,
        })
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(DeviceState::INITIAL)
    }
}
