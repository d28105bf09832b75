// src/device/mod.rs

//! Device state machine and the board controller that runs it.

mod board;
mod state;

pub use board::{Board, BoardParts, BoardStats};
pub use state::{DeviceState, Event, StateMachine, Transition};
