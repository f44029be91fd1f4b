//! Countdown Timer - a countdown engine with an HTTP control surface
//! 
//! This library provides a countdown timer whose elapsed time is reconciled
//! against the wall clock, so throttled or stalled clock signals never make
//! the display drift, skip, or run backwards.

pub mod config;
pub mod engine;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{EngineError, ReconcileMode, TimerEngine};
pub use state::{AppState, StateBus, TimeSpec, TimerState};
pub use api::create_router;
pub use utils::{format_duration, shutdown_signal};
