//! Push-model clock: a background worker emitting wall-clock timestamps

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::{
    engine::{ClockCommand, SystemClock, WallClock},
    state::AppState,
};

/// Worker that emits a timestamp every `tick` while started.
///
/// Start and stop are idempotent. The worker exits once the command channel
/// closes or nobody is listening for timestamps any more.
pub async fn clock_worker_task(
    mut commands: mpsc::UnboundedReceiver<ClockCommand>,
    ticks: mpsc::UnboundedSender<i64>,
    tick: Duration,
) {
    info!("Starting clock worker with {}ms interval", tick.as_millis());
    let clock = SystemClock;
    let mut running = false;
    let mut interval = interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(ClockCommand::Start) => {
                        if !running {
                            debug!("Clock worker started");
                            interval.reset();
                        }
                        running = true;
                    }
                    Some(ClockCommand::Stop) => {
                        if running {
                            debug!("Clock worker stopped");
                        }
                        running = false;
                    }
                    None => {
                        info!("Clock command channel closed, stopping clock worker");
                        break;
                    }
                }
            }

            _ = interval.tick(), if running => {
                if ticks.send(clock.now_ms()).is_err() {
                    info!("Tick receiver dropped, stopping clock worker");
                    break;
                }
            }
        }
    }
}

/// Deliver pushed timestamps to the engine one at a time
pub async fn tick_dispatch_task(state: Arc<AppState>, mut ticks: mpsc::UnboundedReceiver<i64>) {
    info!("Starting tick dispatcher");

    while let Some(now_ms) = ticks.recv().await {
        if let Err(e) = state.on_tick(now_ms) {
            error!("Failed to apply clock tick: {}", e);
        }
    }

    info!("Clock worker gone, tick dispatcher exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    use crate::{
        engine::{ManualClock, ReconcileMode, TimerEngine},
        state::{TimeSpec, TimerState},
    };

    #[tokio::test]
    async fn test_worker_emits_only_while_started() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(clock_worker_task(cmd_rx, tick_tx, Duration::from_millis(5)));

        // Nothing before start
        assert!(timeout(Duration::from_millis(30), tick_rx.recv()).await.is_err());

        cmd_tx.send(ClockCommand::Start).unwrap();
        let first = timeout(Duration::from_secs(1), tick_rx.recv())
            .await
            .expect("tick after start")
            .expect("worker alive");
        let second = timeout(Duration::from_secs(1), tick_rx.recv())
            .await
            .expect("second tick")
            .expect("worker alive");
        assert!(second >= first);

        cmd_tx.send(ClockCommand::Stop).unwrap();
        cmd_tx.send(ClockCommand::Stop).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        while tick_rx.try_recv().is_ok() {}
        assert!(timeout(Duration::from_millis(30), tick_rx.recv()).await.is_err());

        drop(cmd_tx);
        timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker exits")
            .unwrap();
    }

    #[tokio::test]
    async fn test_dispatched_ticks_reach_engine() {
        let clock = ManualClock::new(0);
        let (cmd_tx, _cmd_rx) = mpsc::unbounded_channel();
        let engine = TimerEngine::new(ReconcileMode::Push, clock, cmd_tx, || {});
        let state = Arc::new(AppState::new(engine, 0, "127.0.0.1".to_string()));
        state.set_time_spec(TimeSpec::new(0, 0, 3)).unwrap();
        state.start().unwrap();

        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(tick_dispatch_task(Arc::clone(&state), tick_rx));
        for now_ms in [400, 1_000, 2_500] {
            tick_tx.send(now_ms).unwrap();
        }
        drop(tick_tx);
        timeout(Duration::from_secs(1), dispatcher)
            .await
            .expect("dispatcher exits once the worker is gone")
            .unwrap();

        let view = state.display_state();
        assert_eq!(view.status, TimerState::Running);
        assert_eq!(view.elapsed_seconds, 2);
    }
}
