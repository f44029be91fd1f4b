//! State management module
//! 
//! This module contains the timer data model, the state bus that carries it
//! to subscribers, and the shared state of the running server.

pub mod app_state;
pub mod bus;
pub mod snapshot;
pub mod time_spec;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, StateError};
pub use bus::{keys, BusKey, StateBus};
pub use snapshot::{DisplayState, EngineSnapshot};
pub use time_spec::{TimeField, TimeSpec};
pub use timer_state::{Command, TimerState};
