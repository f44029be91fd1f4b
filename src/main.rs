//! Countdown Timer - a countdown engine with an HTTP control surface
//! 
//! This is the main entry point for the countdown-timer application.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::{mpsc, watch}};
use tracing::{info, warn};

use countdown_timer::{
    config::Config,
    engine::{ReconcileMode, SystemClock, TimerEngine},
    services::TerminalBell,
    state::AppState,
    api::create_router,
    tasks::{clock_worker_task, display_task, frame_loop_task, tick_dispatch_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, mode={:?}, time={:?}",
          config.host, config.port, config.mode, config.initial_time_spec());

    // Build the engine together with the clock source it controls
    let state = match config.mode {
        ReconcileMode::Push => {
            let (command_tx, command_rx) = mpsc::unbounded_channel();
            let (tick_tx, tick_rx) = mpsc::unbounded_channel();
            let engine = TimerEngine::new(config.mode, SystemClock, command_tx, TerminalBell::new());
            let state = Arc::new(AppState::new(engine, config.port, config.host.clone()));

            tokio::spawn(clock_worker_task(command_rx, tick_tx, config.tick_interval()));
            tokio::spawn(tick_dispatch_task(Arc::clone(&state), tick_rx));
            state
        }
        ReconcileMode::Pull => {
            let (gate_tx, gate_rx) = watch::channel(false);
            let engine = TimerEngine::new(config.mode, SystemClock, gate_tx, TerminalBell::new());
            let state = Arc::new(AppState::new(engine, config.port, config.host.clone()));

            tokio::spawn(frame_loop_task(Arc::clone(&state), gate_rx, config.frame_interval()));
            state
        }
    };

    if !config.quiet {
        tokio::spawn(display_task(state.watch_display()));
    }

    // Apply the preset from the command line
    let preset = config.initial_time_spec();
    if preset.is_valid() {
        state.set_time_spec(preset)?;
        if config.autostart {
            state.start()?;
        }
    } else if config.autostart {
        warn!("--autostart ignored, no initial time given");
    }

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  PUT  /time         - Set hours/minutes/seconds");
    info!("  PUT  /time/:field  - Set a single field");
    info!("  POST /start        - Start or resume the countdown");
    info!("  POST /pause        - Pause the countdown");
    info!("  POST /reset        - Reset to editing");
    info!("  GET  /status       - Current countdown");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
