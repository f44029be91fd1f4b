//! Pull-model clock: a frame loop that polls the engine while gated open

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Poll the engine once per frame while the gate is open.
///
/// The engine reads the wall clock itself on every poll, so a slow or
/// skipped frame only delays the update, it never loses time.
pub async fn frame_loop_task(state: Arc<AppState>, mut gate: watch::Receiver<bool>, frame: Duration) {
    info!("Starting frame loop with {}ms frames", frame.as_millis());
    let mut frames = interval(frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let open = *gate.borrow_and_update();
        if !open {
            debug!("Frame loop idle");
            if gate.changed().await.is_err() {
                info!("Frame gate closed, stopping frame loop");
                break;
            }
            continue;
        }

        tokio::select! {
            _ = frames.tick() => {
                if let Err(e) = state.poll() {
                    error!("Failed to poll engine: {}", e);
                }
            }
            changed = gate.changed() => {
                if changed.is_err() {
                    info!("Frame gate closed, stopping frame loop");
                    break;
                }
            }
        }
    }
}
