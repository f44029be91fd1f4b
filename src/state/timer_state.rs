//! Timer lifecycle states and the commands that move between them

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Time fields may be edited, nothing is counting
    #[default]
    Editing,
    Running,
    Paused,
    /// Countdown elapsed; stays here until reset
    Finished,
}

/// User commands accepted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Pause,
    Reset,
    Edit,
}

impl TimerState {
    /// Check if the countdown is currently advancing
    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running)
    }

    /// Check if the time fields accept edits
    pub fn is_editable(&self) -> bool {
        matches!(self, TimerState::Editing)
    }

    /// Controls a presentation layer should offer in this state
    pub fn available_commands(&self) -> &'static [Command] {
        match self {
            TimerState::Editing => &[Command::Start],
            TimerState::Running => &[Command::Pause, Command::Reset],
            TimerState::Paused => &[Command::Start, Command::Reset],
            TimerState::Finished => &[Command::Reset],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Editing => "editing",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Finished => "finished",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Reset => "reset",
            Command::Edit => "edit",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_per_state() {
        assert_eq!(TimerState::Editing.available_commands(), &[Command::Start]);
        assert_eq!(
            TimerState::Running.available_commands(),
            &[Command::Pause, Command::Reset]
        );
        assert_eq!(
            TimerState::Paused.available_commands(),
            &[Command::Start, Command::Reset]
        );
        assert_eq!(TimerState::Finished.available_commands(), &[Command::Reset]);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&TimerState::Finished).unwrap();
        assert_eq!(json, "\"finished\"");
    }
}
