// src/lib.rs

#![no_std] // Specify no_std at the crate root

#[cfg(feature = "std")]
extern crate std;

// Must come first so the log macros are visible to every module below
#[macro_use]
mod fmt;

pub mod codec;
pub mod common;
pub mod device;
pub mod hal;
pub mod scheduler;
pub mod sensor;

#[cfg(test)]
mod mock;

// Re-export key types for convenience
pub use codec::{Codec, Command};
pub use common::{BoardConfig, CanFrame, CanId, ErrorCode, ErrorReport, Reading, SensorKind};
pub use device::{Board, BoardParts, BoardStats, DeviceState};
pub use scheduler::{Channel, ReadySignal};
