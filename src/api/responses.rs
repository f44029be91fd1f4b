//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Command, DisplayState, TimeSpec, TimerState};

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `ok` when the command was applied, `refused` when the engine declined it
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, view: &DisplayState) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer: TimerView::from(view),
        }
    }

    /// Create a response for an applied command
    pub fn ok(message: String, view: &DisplayState) -> Self {
        Self::new("ok".to_string(), message, view)
    }

    /// Create a response for a refused command
    pub fn refused(message: String, view: &DisplayState) -> Self {
        Self::new("refused".to_string(), message, view)
    }
}

/// Everything a client needs to draw the timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub status: TimerState,
    pub time: TimeSpec,
    pub total_seconds: u64,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    /// Remaining time as `HH:MM:SS`
    pub display: String,
    pub controls: Vec<Command>,
    pub can_start: bool,
    pub message: Option<String>,
}

impl From<&DisplayState> for TimerView {
    fn from(view: &DisplayState) -> Self {
        Self {
            status: view.status,
            time: view.time_spec,
            total_seconds: view.total_seconds,
            elapsed_seconds: view.elapsed_seconds,
            remaining_seconds: view.remaining_seconds(),
            display: view.display(),
            controls: view.status.available_commands().to_vec(),
            can_start: view.can_start(),
            message: view.message().map(str::to_string),
        }
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
