//! Wall-clock reconciliation
//!
//! Elapsed time is never derived from the number of signals received, only
//! from wall-clock readings, so throttled or missing signals cannot skew it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const MS_PER_SECOND: i64 = 1000;

/// How the engine turns clock readings into elapsed seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// Recompute elapsed seconds from the run's reference timestamp on every reading
    #[default]
    Push,
    /// Step a tick cursor forward one whole second at a time
    Pull,
}

/// Whole seconds between `reference_ms` and `now_ms`, minus paused time.
/// Readings from before the reference count as zero.
pub fn elapsed_seconds(now_ms: i64, reference_ms: i64, paused_ms: i64) -> u64 {
    let delta = now_ms - reference_ms - paused_ms;
    if delta <= 0 {
        0
    } else {
        (delta / MS_PER_SECOND) as u64
    }
}

/// Advance `cursor_ms` in whole-second steps while at least a second separates
/// it from `now_ms`, taking at most `max_steps`. Returns the number of steps.
///
/// The cursor moves by exactly one second per step rather than jumping to
/// `now_ms`, so the sub-second remainder carries over to the next reading.
pub fn step_seconds(cursor_ms: &mut i64, now_ms: i64, max_steps: u64) -> u64 {
    let mut steps = 0;
    while steps < max_steps && now_ms - *cursor_ms >= MS_PER_SECOND {
        *cursor_ms += MS_PER_SECOND;
        steps += 1;
    }
    steps
}

/// Paused time so far: pauses already closed plus the one in progress
pub fn paused_ms(committed_ms: i64, pause_started_ms: i64, now_ms: i64) -> i64 {
    committed_ms + (now_ms - pause_started_ms).max(0)
}
