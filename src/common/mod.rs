// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod config;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod timing;
pub mod types;

// --- Re-export key types/traits for easier access ---

// From config.rs
pub use config::{BoardConfig, BoardVariant, MessageIds, MAX_TEMP_PROBES};

// From error.rs
pub use error::{
    BoardError, ConfigError, DecodeError, EncodeError, ErrorCode, ErrorReport, FrameError,
};

// From frame.rs
pub use frame::{CanFrame, CanId};

// From hal_traits.rs
pub use hal_traits::{Heartbeat, SensorDriver, Ticker, Transceiver};

// From types.rs
pub use types::{Reading, SensorKind, SequenceCounter, Telemetry};

// From timing.rs: constants are accessed as common::timing::*
