//! Clock source boundary
//!
//! The engine needs two things from the outside world: the current wall-clock
//! time, and a way to tell whatever produces periodic signals to start or stop.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// Source of wall-clock milliseconds
pub trait WallClock {
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock shared between an engine and whoever moves time forward
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    /// Move time forward and return the new reading
    pub fn advance(&self, delta_ms: i64) -> i64 {
        self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }
}

impl WallClock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Messages from the engine to its clock source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockCommand {
    Start,
    Stop,
}

/// Fire-and-forget control of a periodic signal source
pub trait ClockControl {
    fn send(&mut self, command: ClockCommand);

    fn start(&mut self) {
        self.send(ClockCommand::Start);
    }

    fn stop(&mut self) {
        self.send(ClockCommand::Stop);
    }
}

/// Commands forwarded to a background clock worker
impl ClockControl for mpsc::UnboundedSender<ClockCommand> {
    fn send(&mut self, command: ClockCommand) {
        debug!("Sending {:?} to clock worker", command);
        if let Err(e) = mpsc::UnboundedSender::send(self, command) {
            warn!("Clock worker is gone, dropping command: {}", e);
        }
    }
}

/// Gate for a frame loop: `true` while frames should poll the engine
impl ClockControl for watch::Sender<bool> {
    fn send(&mut self, command: ClockCommand) {
        debug!("Setting frame gate for {:?}", command);
        self.send_replace(command == ClockCommand::Start);
    }
}
