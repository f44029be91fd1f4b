//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    engine::EngineError,
    state::{time_spec::coerce_field, AppState, DisplayState, StateError, TimeField, TimeSpec},
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse, TimerView};

type CommandResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Raw time form; each field may be a number, a string, or missing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimeInput {
    pub hours: Value,
    pub minutes: Value,
    pub seconds: Value,
}

impl TimeInput {
    /// Coerce the form into a time spec; anything non-numeric counts as zero
    pub fn to_time_spec(&self) -> TimeSpec {
        TimeSpec::new(
            coerce_value(&self.hours),
            coerce_value(&self.minutes),
            coerce_value(&self.seconds),
        )
    }
}

/// Raw input for a single field
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FieldInput {
    pub value: Value,
}

fn coerce_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => coerce_field(s),
        _ => 0,
    }
}

/// Map a command outcome onto a response
fn respond(state: &AppState, action: &str, result: Result<DisplayState, StateError>) -> CommandResult {
    match result {
        Ok(view) => {
            info!("{} applied, timer is {}", action, view.status);
            Ok(Json(ApiResponse::ok(format!("{} applied", action), &view)))
        }
        Err(StateError::Engine(e)) => {
            warn!("{} refused: {}", action, e);
            let code = match e {
                EngineError::InvalidTransition { .. } => StatusCode::CONFLICT,
                EngineError::InvalidTimeSpec | EngineError::NotEditing { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            };
            Err((code, Json(ApiResponse::refused(e.to_string(), &state.display_state()))))
        }
        Err(e) => {
            error!("{} failed: {}", action, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::refused(e.to_string(), &state.display_state())),
            ))
        }
    }
}

/// Handle POST /start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(&state, "start", state.start())
}

/// Handle POST /pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(&state, "pause", state.pause())
}

/// Handle POST /reset - Return to editing
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(&state, "reset", state.reset())
}

/// Handle PUT /time - Replace all three time fields
pub async fn time_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<TimeInput>,
) -> CommandResult {
    let time_spec = input.to_time_spec();
    respond(&state, "edit", state.set_time_spec(time_spec))
}

/// Handle PUT /time/:field - Replace a single time field
pub async fn field_handler(
    State(state): State<Arc<AppState>>,
    Path(field): Path<TimeField>,
    Json(input): Json<FieldInput>,
) -> CommandResult {
    let raw = match &input.value {
        Value::String(s) => s.clone(),
        other => coerce_value(other).to_string(),
    };
    respond(&state, "edit", state.edit_field(field, &raw))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let view = state.display_state();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: TimerView::from(&view),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
