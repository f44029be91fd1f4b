//! Engine snapshot and the presentation-facing view of it

use serde::{Deserialize, Serialize};

use super::{TimeSpec, TimerState};
use crate::utils::format_duration;

/// Full contents of the state bus at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub status: TimerState,
    pub time_spec: TimeSpec,
    /// Cached `time_spec.total_seconds()`
    pub total_seconds: u64,
    /// Whole seconds counted since the run began, net of pauses
    pub elapsed_seconds: u64,
    /// Wall-clock ms at which the current run started
    pub reference_timestamp: i64,
    /// Wall-clock ms spent paused during the current run
    pub paused_accumulated_ms: i64,
}

impl EngineSnapshot {
    /// Drop the bookkeeping fields a presentation layer must not see
    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            status: self.status,
            time_spec: self.time_spec,
            total_seconds: self.total_seconds,
            elapsed_seconds: self.elapsed_seconds,
        }
    }
}

/// The four bus keys a presentation layer subscribes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub status: TimerState,
    pub time_spec: TimeSpec,
    pub total_seconds: u64,
    pub elapsed_seconds: u64,
}

impl DisplayState {
    /// Seconds left on the countdown
    pub fn remaining_seconds(&self) -> u64 {
        self.total_seconds.saturating_sub(self.elapsed_seconds)
    }

    /// Countdown text as shown to the user
    pub fn display(&self) -> String {
        format_duration(self.remaining_seconds())
    }

    /// Whether a start command would currently be accepted
    pub fn can_start(&self) -> bool {
        matches!(self.status, TimerState::Editing | TimerState::Paused) && self.time_spec.is_valid()
    }

    /// Banner text for the current status, if any
    pub fn message(&self) -> Option<&'static str> {
        match self.status {
            TimerState::Finished => Some("Timer complete"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_never_negative() {
        let view = DisplayState {
            status: TimerState::Finished,
            time_spec: TimeSpec::new(0, 0, 5),
            total_seconds: 5,
            elapsed_seconds: 7,
        };
        assert_eq!(view.remaining_seconds(), 0);
        assert_eq!(view.display(), "00:00:00");
        assert_eq!(view.message(), Some("Timer complete"));
    }

    #[test]
    fn test_can_start() {
        let mut view = DisplayState::default();
        assert!(!view.can_start());

        view.time_spec = TimeSpec::new(0, 1, 0);
        assert!(view.can_start());

        view.status = TimerState::Running;
        assert!(!view.can_start());
    }
}
