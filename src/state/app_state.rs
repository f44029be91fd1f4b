//! Shared server state wrapping the timer engine

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{keys, DisplayState, TimeField, TimeSpec, TimerState};
use crate::{engine::{EngineError, TimerEngine}, utils::format_uptime};

/// Failures of a command issued through [`AppState`]
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("failed to lock timer engine: {0}")]
    Lock(String),
}

/// Application state shared by the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// The countdown engine; every command and clock reading goes through this lock
    pub engine: Arc<Mutex<TimerEngine>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Presentation view, kept current by bus subscriptions
    pub display_tx: Arc<watch::Sender<DisplayState>>,
    /// Keep the receiver alive to prevent channel closure
    pub _display_rx: watch::Receiver<DisplayState>,
}

impl AppState {
    /// Wrap an engine, wiring its presentation keys into a watch channel
    pub fn new(mut engine: TimerEngine, port: u16, host: String) -> Self {
        let (display_tx, display_rx) = watch::channel(engine.snapshot().display_state());
        let display_tx = Arc::new(display_tx);
        bind_display(&mut engine, &display_tx);

        Self {
            engine: Arc::new(Mutex::new(engine)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            display_tx,
            _display_rx: display_rx,
        }
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, TimerEngine>, StateError> {
        self.engine
            .lock()
            .map_err(|e| StateError::Lock(e.to_string()))
    }

    /// Run a user command against the engine and record it as the last action
    fn command<T, F>(&self, action: &str, apply: F) -> Result<DisplayState, StateError>
    where
        F: FnOnce(&mut TimerEngine) -> Result<T, EngineError>,
    {
        let mut engine = self.lock_engine()?;
        let result = apply(&mut *engine);
        drop(engine); // Release the lock early

        // Refused commands still count as the last thing the user did
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        result?;
        Ok(self.display_state())
    }

    /// Start or resume the countdown
    pub fn start(&self) -> Result<DisplayState, StateError> {
        info!("Start requested");
        self.command("start", TimerEngine::start)
    }

    /// Pause the countdown
    pub fn pause(&self) -> Result<DisplayState, StateError> {
        info!("Pause requested");
        self.command("pause", TimerEngine::pause)
    }

    /// Reset the countdown back to editing
    pub fn reset(&self) -> Result<DisplayState, StateError> {
        info!("Reset requested");
        self.command("reset", |engine| Ok::<_, EngineError>(engine.reset()))
    }

    /// Replace the time spec
    pub fn set_time_spec(&self, time_spec: TimeSpec) -> Result<DisplayState, StateError> {
        self.command("edit", |engine| engine.set_time_spec(time_spec))
    }

    /// Apply raw input to one time field
    pub fn edit_field(&self, field: TimeField, raw: &str) -> Result<DisplayState, StateError> {
        self.command("edit", |engine| engine.edit_field(field, raw))
    }

    /// Feed a pushed clock timestamp to the engine
    pub fn on_tick(&self, now_ms: i64) -> Result<TimerState, StateError> {
        let mut engine = self.lock_engine()?;
        Ok(engine.on_tick(now_ms))
    }

    /// Let the engine read the clock itself
    pub fn poll(&self) -> Result<TimerState, StateError> {
        let mut engine = self.lock_engine()?;
        Ok(engine.poll())
    }

    /// Current presentation view
    pub fn display_state(&self) -> DisplayState {
        *self.display_tx.borrow()
    }

    /// Subscribe to presentation view changes
    pub fn watch_display(&self) -> watch::Receiver<DisplayState> {
        self.display_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

/// Mirror the presentation keys of the bus into a watch channel
fn bind_display(engine: &mut TimerEngine, display_tx: &Arc<watch::Sender<DisplayState>>) {
    let tx = Arc::clone(display_tx);
    engine.subscribe::<keys::Status, _>(move |status| {
        debug!("Status -> {}", status);
        tx.send_modify(|view| view.status = *status);
    });

    let tx = Arc::clone(display_tx);
    engine.subscribe::<keys::TimeSpecKey, _>(move |time_spec| {
        tx.send_modify(|view| view.time_spec = *time_spec);
    });

    let tx = Arc::clone(display_tx);
    engine.subscribe::<keys::TotalSeconds, _>(move |total| {
        tx.send_modify(|view| view.total_seconds = *total);
    });

    let tx = Arc::clone(display_tx);
    engine.subscribe::<keys::ElapsedSeconds, _>(move |elapsed| {
        tx.send_modify(|view| view.elapsed_seconds = *elapsed);
    });
}
