use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::capture::backend::{ErrorCallback, FrameSink, FrameSource};
use crate::capture::error::CaptureError;
use crate::capture::frame::TransformFlags;
use crate::capture::target::CaptureTarget;
use crate::diagnostics::stats::{DiagnosticSnapshot, DiagnosticStats};
use crate::scheduler::config::{RunState, ScheduleConfig};
use crate::scheduler::error::{Result, SchedulerError};
use crate::transform;

/// Drives periodic capture of one window.
///
/// Each tick captures a raw frame from the [`FrameSource`], runs it through
/// [`transform::apply`] on the blocking pool, and hands the result to the
/// [`FrameSink`]. At most one capture is in flight at any time: a tick that
/// fires while the previous one is still capturing is skipped, not queued.
///
/// Per-tick failures go to the optional [`ErrorCallback`] and never stop the
/// loop. The sink's `publish` runs while the run state is locked, so it must
/// not call back into the scheduler.
pub struct CaptureScheduler {
    shared: Arc<Shared>,
}

struct Shared {
    control: Mutex<RunControl>,
    in_flight: AtomicBool,
    stats: Mutex<DiagnosticStats>,
    source: Arc<dyn FrameSource>,
    sink: Arc<dyn FrameSink>,
    on_error: Option<ErrorCallback>,
}

/// Everything `start`/`stop`/`update_config` mutate, behind one lock.
struct RunControl {
    run_state: RunState,
    config: ScheduleConfig,
    target: Option<CaptureTarget>,
    /// Bumped on every stop and start; ticks from an older run never publish.
    generation: u64,
    timer: Option<JoinHandle<()>>,
    runtime: Option<Handle>,
}

impl RunControl {
    fn is_live(&self, generation: u64) -> bool {
        self.run_state == RunState::Running && self.generation == generation
    }

    /// Cancel the timer and invalidate any in-flight tick.
    fn halt(&mut self) {
        self.run_state = RunState::Idle;
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Clears the in-flight flag when a tick finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CaptureScheduler {
    /// Create an idle scheduler.
    ///
    /// If `on_error` is provided, it is called with `(target, error)` for
    /// every tick that fails to capture or transform.
    pub fn new(
        source: Arc<dyn FrameSource>,
        sink: Arc<dyn FrameSink>,
        on_error: Option<ErrorCallback>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                control: Mutex::new(RunControl {
                    run_state: RunState::Idle,
                    config: ScheduleConfig::default(),
                    target: None,
                    generation: 0,
                    timer: None,
                    runtime: None,
                }),
                in_flight: AtomicBool::new(false),
                stats: Mutex::new(DiagnosticStats::new()),
                source,
                sink,
                on_error,
            }),
        }
    }

    /// Start capturing `target` at the configured rate.
    ///
    /// Captures one frame immediately, then once per `1 / fps` seconds. If a
    /// run is already active it is torn down first. Must be called from
    /// within a tokio runtime.
    pub fn start(&self, target: CaptureTarget, config: ScheduleConfig) -> Result<()> {
        config.validate()?;
        self.shared
            .source
            .resolve(&target)
            .map_err(|e| SchedulerError::InvalidTarget(e.to_string()))?;
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let mut control = self.shared.control.lock();
        if control.run_state == RunState::Running {
            debug!("restarting capture for {target}");
            control.halt();
        }
        self.shared.stats.lock().reset();
        info!(
            "capture starting for {target} at {} fps ({:?})",
            config.frames_per_second, config.flags
        );
        self.shared.arm(&mut control, runtime, target, config);
        Ok(())
    }

    /// Stop capturing. Idempotent.
    ///
    /// No tick starts and no frame is published after this returns. A capture
    /// already in flight runs to completion and its frame is discarded.
    ///
    /// The error callback runs outside the run-state lock, so a tick that
    /// failed just before `stop` may still be reported after it returns. The
    /// callback may call `stop` itself.
    pub fn stop(&self) {
        let mut control = self.shared.control.lock();
        if control.run_state == RunState::Idle {
            return;
        }
        control.halt();
        info!("capture stopped");
    }

    /// Replace the rate and transforms.
    ///
    /// An invalid rate leaves the current config and run state untouched and
    /// returns `InvalidRate`. A valid config on a running scheduler restarts
    /// the loop on the same target so the new interval applies from the very
    /// next tick.
    pub fn update_config(&self, config: ScheduleConfig) -> Result<()> {
        if let Err(e) = config.validate() {
            debug!("keeping previous capture config: {e}");
            return Err(e);
        }

        let mut control = self.shared.control.lock();
        let restart = match (control.run_state, &control.target, &control.runtime) {
            (RunState::Running, Some(target), Some(runtime)) => {
                Some((target.clone(), runtime.clone()))
            }
            _ => None,
        };
        match restart {
            Some((target, runtime)) => {
                control.halt();
                info!(
                    "capture rate changed to {} fps, restarting",
                    config.frames_per_second
                );
                self.shared.arm(&mut control, runtime, target, config);
            }
            None => control.config = config,
        }
        Ok(())
    }

    /// Change only the transforms. Takes effect from the next tick without
    /// restarting the timer.
    pub fn set_flags(&self, flags: TransformFlags) {
        self.shared.control.lock().config.flags = flags;
    }

    pub fn run_state(&self) -> RunState {
        self.shared.control.lock().run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    /// The config the next tick will use.
    pub fn config(&self) -> ScheduleConfig {
        self.shared.control.lock().config
    }

    /// Target of the current or most recent run.
    pub fn target(&self) -> Option<CaptureTarget> {
        self.shared.control.lock().target.clone()
    }

    /// Take a snapshot of diagnostic stats for the current run.
    pub fn diagnostics(&self) -> DiagnosticSnapshot {
        self.shared.stats.lock().snapshot()
    }
}

impl Drop for CaptureScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    /// Enter `Running` for a fresh generation, kick one tick immediately and
    /// spawn the periodic timer. Caller holds the control lock.
    fn arm(
        self: &Arc<Self>,
        control: &mut RunControl,
        runtime: Handle,
        target: CaptureTarget,
        config: ScheduleConfig,
    ) {
        control.generation += 1;
        control.run_state = RunState::Running;
        control.config = config;
        control.target = Some(target);
        control.runtime = Some(runtime.clone());

        let generation = control.generation;
        self.initiate_tick(control, generation);

        let timer = runtime.spawn(Arc::clone(self).run_timer(generation, config.frame_interval()));
        control.timer = Some(timer);
    }

    /// Fire ticks on schedule until the run's generation goes stale.
    ///
    /// The timer only spawns tick bodies; it never waits for one.
    async fn run_timer(self: Arc<Self>, generation: u64, period: Duration) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let control = self.control.lock();
            if !control.is_live(generation) {
                break;
            }
            self.initiate_tick(&control, generation);
        }
    }

    /// Start a tick unless one is already in flight. Caller holds the control lock.
    fn initiate_tick(self: &Arc<Self>, control: &RunControl, generation: u64) {
        if !control.is_live(generation) {
            return;
        }
        let (Some(target), Some(runtime)) = (control.target.clone(), control.runtime.as_ref())
        else {
            return;
        };
        if self.in_flight.swap(true, Ordering::AcqRel) {
            self.stats.lock().record_skip();
            debug!("capture still in flight for {target}, skipping tick");
            return;
        }

        let flags = control.config.flags;
        let started = Instant::now();
        runtime.spawn(Arc::clone(self).run_tick(generation, target, flags, started));
    }

    /// One capture -> transform -> publish cycle.
    async fn run_tick(
        self: Arc<Self>,
        generation: u64,
        target: CaptureTarget,
        flags: TransformFlags,
        started: Instant,
    ) {
        let _in_flight = InFlight(&self.in_flight);

        let result = match self.source.capture(&target).await {
            Ok(raw) => tokio::task::spawn_blocking(move || transform::apply(raw, flags))
                .await
                .unwrap_or_else(|e| Err(CaptureError::Worker(e.to_string()))),
            Err(e) => Err(e),
        };

        let failure = {
            let control = self.control.lock();
            let live = control.is_live(generation);
            match result {
                Ok(frame) if live => {
                    self.sink.publish(frame);
                    self.stats.lock().record_publish(started);
                    None
                }
                Err(e) if live => {
                    self.stats.lock().record_failure();
                    Some(e)
                }
                Ok(_) | Err(_) => {
                    self.stats.lock().record_discard();
                    debug!("discarding tick result for {target}: run no longer active");
                    None
                }
            }
        };

        if let Some(e) = failure {
            warn!("capture tick failed for {target}: {e}");
            if let Some(cb) = &self.on_error {
                cb(&target, &e);
            }
        }
    }
}
