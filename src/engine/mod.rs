//! Countdown timer engine
//!
//! The engine owns the lifecycle state machine and the wall-clock
//! reconciliation, and publishes every change onto its [`StateBus`].
//! It is driven from outside by commands (`start`, `pause`, `reset`, edits)
//! and by clock readings (`on_tick` for pushed timestamps, `poll` for frame
//! loops reading the clock themselves).

pub mod clock;
pub mod error;
pub mod reconcile;

use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    services::CompletionCue,
    state::{keys, BusKey, Command, EngineSnapshot, StateBus, TimeField, TimeSpec, TimerState},
};

pub use clock::{ClockCommand, ClockControl, ManualClock, SystemClock, WallClock};
pub use error::EngineError;
pub use reconcile::ReconcileMode;

/// A single countdown timer
pub struct TimerEngine {
    bus: StateBus,
    mode: ReconcileMode,
    clock: Box<dyn WallClock + Send>,
    control: Box<dyn ClockControl + Send>,
    cue: Box<dyn CompletionCue + Send>,
    /// Wall-clock ms at which the current pause began
    pause_started_ms: Option<i64>,
    /// Paused ms from pauses already resumed in this run
    paused_committed_ms: i64,
    /// Tick cursor for [`ReconcileMode::Pull`]
    last_tick_ms: i64,
}

impl TimerEngine {
    /// Create an engine in the editing state with an all-zero time spec
    pub fn new<W, C, Q>(mode: ReconcileMode, clock: W, control: C, cue: Q) -> Self
    where
        W: WallClock + Send + 'static,
        C: ClockControl + Send + 'static,
        Q: CompletionCue + Send + 'static,
    {
        Self {
            bus: StateBus::default(),
            mode,
            clock: Box::new(clock),
            control: Box::new(control),
            cue: Box::new(cue),
            pause_started_ms: None,
            paused_committed_ms: 0,
            last_tick_ms: 0,
        }
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    pub fn status(&self) -> TimerState {
        self.bus.current::<keys::Status>()
    }

    pub fn time_spec(&self) -> TimeSpec {
        self.bus.current::<keys::TimeSpecKey>()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.bus.current::<keys::ElapsedSeconds>()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.bus
            .current::<keys::TotalSeconds>()
            .saturating_sub(self.elapsed_seconds())
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.bus.snapshot()
    }

    pub fn bus(&self) -> &StateBus {
        &self.bus
    }

    /// Register a presentation handler for a bus key
    pub fn subscribe<K, F>(&mut self, handler: F)
    where
        K: BusKey,
        F: FnMut(&K::Value) + Send + 'static,
    {
        self.bus.subscribe::<K, F>(handler);
    }

    /// Replace the whole time spec; only allowed while editing
    pub fn set_time_spec(&mut self, time_spec: TimeSpec) -> Result<TimeSpec, EngineError> {
        let status = self.status();
        if !status.is_editable() {
            warn!("Ignoring time edit while {}", status);
            return Err(EngineError::NotEditing { status });
        }

        debug!("Time spec edited to {:?}", time_spec);
        self.bus.publish::<keys::TimeSpecKey>(time_spec);
        self.bus.publish::<keys::TotalSeconds>(time_spec.total_seconds());
        Ok(time_spec)
    }

    /// Apply raw input to one field; non-numeric input becomes zero
    pub fn edit_field(&mut self, field: TimeField, raw: &str) -> Result<TimeSpec, EngineError> {
        let time_spec = self.time_spec().with_field(field, raw);
        self.set_time_spec(time_spec)
    }

    /// Begin a countdown from editing, or resume one from paused
    pub fn start(&mut self) -> Result<TimerState, EngineError> {
        let status = self.status();
        match status {
            TimerState::Editing | TimerState::Paused if !self.time_spec().is_valid() => {
                warn!("Refusing to start, time spec {:?} is invalid", self.time_spec());
                Err(EngineError::InvalidTimeSpec)
            }
            TimerState::Editing => {
                let now = self.clock.now_ms();
                self.pause_started_ms = None;
                self.paused_committed_ms = 0;
                self.last_tick_ms = now;

                self.bus.publish::<keys::ReferenceTimestamp>(now);
                self.bus.publish::<keys::PausedAccumulatedMs>(0);
                self.bus.publish::<keys::ElapsedSeconds>(0);
                self.bus.publish::<keys::Status>(TimerState::Running);
                self.control.start();

                info!(
                    "Countdown started for {} seconds",
                    self.bus.current::<keys::TotalSeconds>()
                );
                Ok(TimerState::Running)
            }
            TimerState::Paused => {
                let now = self.clock.now_ms();
                if let Some(pause_started) = self.pause_started_ms.take() {
                    let pause_len = (now - pause_started).max(0);
                    self.paused_committed_ms += pause_len;
                    self.last_tick_ms += pause_len;
                }

                self.bus
                    .publish::<keys::PausedAccumulatedMs>(self.paused_committed_ms);
                self.bus.publish::<keys::Status>(TimerState::Running);
                self.control.start();

                info!(
                    "Countdown resumed after {}ms paused in total",
                    self.paused_committed_ms
                );
                Ok(TimerState::Running)
            }
            TimerState::Running | TimerState::Finished => {
                warn!("Ignoring start while {}", status);
                Err(EngineError::InvalidTransition {
                    command: Command::Start,
                    status,
                })
            }
        }
    }

    /// Freeze a running countdown
    pub fn pause(&mut self) -> Result<TimerState, EngineError> {
        let status = self.status();
        if !status.is_running() {
            warn!("Ignoring pause while {}", status);
            return Err(EngineError::InvalidTransition {
                command: Command::Pause,
                status,
            });
        }

        let now = self.clock.now_ms();
        self.pause_started_ms = Some(now);
        self.bus.publish::<keys::Status>(TimerState::Paused);

        info!("Countdown paused at {} elapsed seconds", self.elapsed_seconds());
        Ok(TimerState::Paused)
    }

    /// Return to editing with the current time spec, discarding progress
    pub fn reset(&mut self) -> TimerState {
        let from = self.status();
        self.pause_started_ms = None;
        self.paused_committed_ms = 0;
        self.last_tick_ms = 0;

        self.bus.publish::<keys::Status>(TimerState::Editing);
        self.bus
            .publish::<keys::TotalSeconds>(self.time_spec().total_seconds());
        self.bus.publish::<keys::ElapsedSeconds>(0);
        self.bus.publish::<keys::ReferenceTimestamp>(0);
        self.bus.publish::<keys::PausedAccumulatedMs>(0);
        self.control.stop();

        info!("Countdown reset from {}", from);
        TimerState::Editing
    }

    /// Handle a timestamp pushed by a clock source
    pub fn on_tick(&mut self, now_ms: i64) -> TimerState {
        self.advance(now_ms)
    }

    /// Read the wall clock and reconcile against it
    pub fn poll(&mut self) -> TimerState {
        let now = self.clock.now_ms();
        self.advance(now)
    }

    fn advance(&mut self, now_ms: i64) -> TimerState {
        match self.status() {
            TimerState::Running => self.advance_running(now_ms),
            TimerState::Paused => self.advance_paused(now_ms),
            status => {
                debug!("Dropping stale clock reading {} while {}", now_ms, status);
                status
            }
        }
    }

    fn advance_running(&mut self, now_ms: i64) -> TimerState {
        let total = self.bus.current::<keys::TotalSeconds>();
        let current = self.elapsed_seconds();

        match self.mode {
            ReconcileMode::Push => {
                let elapsed = reconcile::elapsed_seconds(
                    now_ms,
                    self.bus.current::<keys::ReferenceTimestamp>(),
                    self.bus.current::<keys::PausedAccumulatedMs>(),
                )
                .min(total);
                if elapsed > current {
                    debug!("Elapsed {} -> {} at {}", current, elapsed, now_ms);
                    self.bus.publish::<keys::ElapsedSeconds>(elapsed);
                }
            }
            ReconcileMode::Pull => {
                let max_steps = total.saturating_sub(current);
                let mut cursor = self.last_tick_ms;
                let steps = reconcile::step_seconds(&mut cursor, now_ms, max_steps);
                self.last_tick_ms = cursor;
                for elapsed in current + 1..=current + steps {
                    self.bus.publish::<keys::ElapsedSeconds>(elapsed);
                }
                if steps > 0 {
                    debug!("Stepped {} seconds at {}", steps, now_ms);
                }
            }
        }

        if self.elapsed_seconds() >= total {
            self.finish();
        }
        self.status()
    }

    fn advance_paused(&mut self, now_ms: i64) -> TimerState {
        if let Some(pause_started) = self.pause_started_ms {
            let paused = reconcile::paused_ms(self.paused_committed_ms, pause_started, now_ms);
            if paused != self.bus.current::<keys::PausedAccumulatedMs>() {
                self.bus.publish::<keys::PausedAccumulatedMs>(paused);
            }
        }
        TimerState::Paused
    }

    fn finish(&mut self) {
        self.bus.publish::<keys::Status>(TimerState::Finished);
        self.control.stop();
        info!("Countdown finished");
        self.cue.play();
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("mode", &self.mode)
            .field("snapshot", &self.snapshot())
            .field("pause_started_ms", &self.pause_started_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use tokio::sync::mpsc;

    use super::*;

    struct Harness {
        engine: TimerEngine,
        clock: ManualClock,
        commands: mpsc::UnboundedReceiver<ClockCommand>,
        cues: Arc<AtomicUsize>,
    }

    impl Harness {
        fn new(mode: ReconcileMode) -> Self {
            let clock = ManualClock::new(1_000_000);
            let (tx, commands) = mpsc::unbounded_channel();
            let cues = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&cues);
            let engine = TimerEngine::new(mode, clock.clone(), tx, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            Self {
                engine,
                clock,
                commands,
                cues,
            }
        }

        fn tick(&mut self, delta_ms: i64) -> TimerState {
            let now = self.clock.advance(delta_ms);
            match self.engine.mode() {
                ReconcileMode::Push => self.engine.on_tick(now),
                ReconcileMode::Pull => self.engine.poll(),
            }
        }

        fn drain_commands(&mut self) -> Vec<ClockCommand> {
            let mut out = Vec::new();
            while let Ok(command) = self.commands.try_recv() {
                out.push(command);
            }
            out
        }

        fn cues(&self) -> usize {
            self.cues.load(Ordering::SeqCst)
        }
    }

    const MODES: [ReconcileMode; 2] = [ReconcileMode::Push, ReconcileMode::Pull];

    #[test]
    fn test_starts_in_editing() {
        let h = Harness::new(ReconcileMode::Push);
        assert_eq!(h.engine.status(), TimerState::Editing);
        assert_eq!(h.engine.snapshot(), EngineSnapshot::default());
    }

    #[test]
    fn test_start_with_zero_time_is_refused() {
        let mut h = Harness::new(ReconcileMode::Push);
        assert_eq!(h.engine.start(), Err(EngineError::InvalidTimeSpec));
        assert_eq!(h.engine.status(), TimerState::Editing);
        assert!(h.drain_commands().is_empty());
    }

    #[test]
    fn test_start_records_reference() {
        let mut h = Harness::new(ReconcileMode::Push);
        h.engine.set_time_spec(TimeSpec::new(0, 1, 0)).unwrap();
        assert_eq!(h.engine.start(), Ok(TimerState::Running));

        let snap = h.engine.snapshot();
        assert_eq!(snap.reference_timestamp, 1_000_000);
        assert_eq!(snap.paused_accumulated_ms, 0);
        assert_eq!(snap.total_seconds, 60);
        assert_eq!(h.drain_commands(), vec![ClockCommand::Start]);
    }

    #[test]
    fn test_edits_rejected_outside_editing() {
        let mut h = Harness::new(ReconcileMode::Push);
        h.engine.edit_field(TimeField::Seconds, "10").unwrap();
        h.engine.start().unwrap();

        assert_eq!(
            h.engine.edit_field(TimeField::Minutes, "3"),
            Err(EngineError::NotEditing {
                status: TimerState::Running
            })
        );
        assert_eq!(h.engine.time_spec(), TimeSpec::new(0, 0, 10));
    }

    #[test]
    fn test_pause_only_from_running() {
        let mut h = Harness::new(ReconcileMode::Push);
        assert_eq!(
            h.engine.pause(),
            Err(EngineError::InvalidTransition {
                command: Command::Pause,
                status: TimerState::Editing
            })
        );
    }

    #[test]
    fn test_start_while_running_is_refused() {
        let mut h = Harness::new(ReconcileMode::Push);
        h.engine.set_time_spec(TimeSpec::new(0, 0, 10)).unwrap();
        h.engine.start().unwrap();
        h.tick(2_000);

        assert!(h.engine.start().is_err());
        assert_eq!(h.engine.snapshot().reference_timestamp, 1_000_000);
    }

    #[test]
    fn test_stall_catch_up() {
        for mode in MODES {
            let mut h = Harness::new(mode);
            h.engine.set_time_spec(TimeSpec::new(0, 1, 0)).unwrap();
            h.engine.start().unwrap();

            h.tick(3_500);
            assert_eq!(h.engine.elapsed_seconds(), 3, "{:?}", mode);
            h.tick(500);
            assert_eq!(h.engine.elapsed_seconds(), 4, "{:?}", mode);
        }
    }

    #[test]
    fn test_stall_publishes_every_second_in_pull_mode() {
        let mut h = Harness::new(ReconcileMode::Pull);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        h.engine
            .subscribe::<keys::ElapsedSeconds, _>(move |v| sink.lock().unwrap().push(*v));

        h.engine.set_time_spec(TimeSpec::new(0, 1, 0)).unwrap();
        h.engine.start().unwrap();
        h.tick(3_500);

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_pause_is_excluded() {
        for mode in MODES {
            let mut h = Harness::new(mode);
            h.engine.set_time_spec(TimeSpec::new(0, 1, 0)).unwrap();
            h.engine.start().unwrap();

            h.tick(1_500);
            h.engine.pause().unwrap();
            for _ in 0..10 {
                h.tick(997);
            }
            assert_eq!(h.engine.elapsed_seconds(), 1, "{:?}", mode);
            assert_eq!(h.engine.snapshot().paused_accumulated_ms, 9_970);

            h.engine.start().unwrap();
            h.tick(700);
            assert_eq!(h.engine.elapsed_seconds(), 2, "{:?}", mode);
        }
    }

    #[test]
    fn test_multiple_pauses_accumulate() {
        for mode in MODES {
            let mut h = Harness::new(mode);
            h.engine.set_time_spec(TimeSpec::new(0, 1, 0)).unwrap();
            h.engine.start().unwrap();

            h.tick(800);
            h.engine.pause().unwrap();
            h.clock.advance(5_000);
            h.engine.start().unwrap();
            h.tick(800);
            h.engine.pause().unwrap();
            h.clock.advance(7_000);
            h.engine.start().unwrap();
            h.tick(800);

            assert_eq!(h.engine.elapsed_seconds(), 2, "{:?}", mode);
            assert_eq!(h.engine.snapshot().paused_accumulated_ms, 12_000);
        }
    }

    #[test]
    fn test_out_of_order_timestamps_do_not_rewind() {
        let mut h = Harness::new(ReconcileMode::Push);
        h.engine.set_time_spec(TimeSpec::new(0, 1, 0)).unwrap();
        h.engine.start().unwrap();

        h.engine.on_tick(1_004_200);
        assert_eq!(h.engine.elapsed_seconds(), 4);
        h.engine.on_tick(1_002_000);
        assert_eq!(h.engine.elapsed_seconds(), 4);
        h.engine.on_tick(999_000);
        assert_eq!(h.engine.elapsed_seconds(), 4);
    }

    #[test]
    fn test_finishes_exactly_once() {
        for mode in MODES {
            let mut h = Harness::new(mode);
            h.engine.set_time_spec(TimeSpec::new(0, 0, 2)).unwrap();
            h.engine.start().unwrap();
            h.drain_commands();

            h.tick(5_000);
            assert_eq!(h.engine.status(), TimerState::Finished);
            assert_eq!(h.engine.elapsed_seconds(), 2);
            assert_eq!(h.engine.remaining_seconds(), 0);
            assert_eq!(h.drain_commands(), vec![ClockCommand::Stop]);

            h.tick(1_000);
            h.tick(1_000);
            assert_eq!(h.engine.status(), TimerState::Finished);
            assert_eq!(h.cues(), 1);
        }
    }

    #[test]
    fn test_stale_ticks_after_reset_are_ignored() {
        let mut h = Harness::new(ReconcileMode::Push);
        h.engine.set_time_spec(TimeSpec::new(0, 0, 3)).unwrap();
        h.engine.start().unwrap();
        h.tick(1_000);
        h.engine.reset();

        assert_eq!(h.tick(10_000), TimerState::Editing);
        assert_eq!(h.engine.elapsed_seconds(), 0);
        assert_eq!(h.cues(), 0);
    }

    #[test]
    fn test_reset_from_every_state() {
        let mut h = Harness::new(ReconcileMode::Push);
        h.engine.set_time_spec(TimeSpec::new(0, 0, 3)).unwrap();

        h.engine.start().unwrap();
        h.tick(1_000);
        assert_eq!(h.engine.reset(), TimerState::Editing);
        assert_eq!(h.engine.elapsed_seconds(), 0);

        h.engine.start().unwrap();
        h.engine.pause().unwrap();
        h.engine.reset();
        assert_eq!(h.engine.snapshot().paused_accumulated_ms, 0);

        h.engine.start().unwrap();
        h.tick(3_000);
        assert_eq!(h.engine.status(), TimerState::Finished);
        h.engine.reset();

        let snap = h.engine.snapshot();
        assert_eq!(snap.status, TimerState::Editing);
        assert_eq!(snap.total_seconds, 3);
        assert_eq!(snap.elapsed_seconds, 0);
        assert_eq!(h.drain_commands().last(), Some(&ClockCommand::Stop));
    }

    #[test]
    fn test_restart_after_reset_is_fresh() {
        for mode in MODES {
            let mut h = Harness::new(mode);
            h.engine.set_time_spec(TimeSpec::new(0, 0, 3)).unwrap();
            h.engine.start().unwrap();
            h.tick(2_600);
            h.engine.pause().unwrap();
            h.clock.advance(4_000);
            h.engine.reset();

            h.engine.start().unwrap();
            assert_eq!(h.engine.snapshot().reference_timestamp, h.clock.now_ms());
            h.tick(999);
            assert_eq!(h.engine.elapsed_seconds(), 0, "{:?}", mode);
            h.tick(1);
            assert_eq!(h.engine.elapsed_seconds(), 1, "{:?}", mode);
        }
    }
}
