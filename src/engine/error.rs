//! Errors returned when the engine refuses a command

use thiserror::Error;

use crate::state::{Command, TimerState};

/// Reasons a command left the engine state untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("time spec is all zero, nothing to count down")]
    InvalidTimeSpec,

    #[error("time fields can only be edited while editing, timer is {status}")]
    NotEditing { status: TimerState },

    #[error("cannot {command} while {status}")]
    InvalidTransition { command: Command, status: TimerState },
}
