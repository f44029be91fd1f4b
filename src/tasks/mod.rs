//! Background tasks module
//! 
//! This module contains the clock sources that drive the engine and the
//! console display that runs alongside the HTTP server.

pub mod clock_worker;
pub mod display;
pub mod frame_loop;

// Re-export main functions
pub use clock_worker::{clock_worker_task, tick_dispatch_task};
pub use display::display_task;
pub use frame_loop::frame_loop_task;
