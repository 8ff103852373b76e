use std::time::Instant;

use crate::error::VizflowResult;
use crate::eval::{Evaluator, LayerState};
use crate::model::{Layer, VisualizationSpec};
use crate::render::{Frame, render_frame};

/// Monotonic time source in milliseconds. Elapsed playback time is always
/// `now - start`, never accumulated per-tick deltas, so delayed ticks
/// self-correct instead of compounding drift.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// `Clock` backed by `std::time::Instant`.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Identifies one scheduled tick so it can be cancelled before it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Cooperative tick source. The display shell decides what backs it
/// (display-sync callback, timer, explicit event loop); the session only
/// requires that a pending tick can be cancelled deterministically.
pub trait TickScheduler {
    fn request_tick(&mut self) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

/// One run of a spec from elapsed time 0 to its duration.
///
/// The session owns the only mutable state in the engine: the effective
/// layer states for the current run, plus the handle of the one pending
/// tick. Both are replaced wholesale on restart and released on drop.
pub struct Playback<S: TickScheduler> {
    spec: VisualizationSpec,
    scheduler: S,
    started_at_ms: f64,
    state: Vec<LayerState>,
    pending: Option<TickHandle>,
    finished: bool,
}

impl<S: TickScheduler> Playback<S> {
    /// Validates the spec, snapshots the base layer props as the initial
    /// effective state (so the first paint matches them exactly), and
    /// schedules the first tick.
    pub fn start(
        spec: VisualizationSpec,
        clock: &dyn Clock,
        mut scheduler: S,
    ) -> VizflowResult<Self> {
        spec.validate()?;
        tracing::debug!(spec = %spec.id, duration_ms = spec.duration_ms, "starting playback");
        let state = base_state(&spec.layers);
        let pending = Some(scheduler.request_tick());
        Ok(Self {
            started_at_ms: clock.now_ms(),
            spec,
            scheduler,
            state,
            pending,
            finished: false,
        })
    }

    /// Runs one evaluation-and-draw cycle. Call when the scheduled tick
    /// fires.
    ///
    /// All layers are evaluated before the frame is assembled, so the
    /// consumer never observes a partially-updated frame. The next tick is
    /// scheduled only while elapsed time is below the spec's duration; past
    /// it the last computed state stays current and nothing further fires.
    pub fn tick(&mut self, clock: &dyn Clock) -> Frame {
        self.pending = None;
        let elapsed_ms = (clock.now_ms() - self.started_at_ms)
            .max(0.0)
            .min(self.spec.duration_ms);

        self.state = Evaluator::eval_layers(&self.spec.layers, elapsed_ms);
        let frame = render_frame(&self.state, elapsed_ms);

        if elapsed_ms < self.spec.duration_ms {
            self.pending = Some(self.scheduler.request_tick());
        } else if !self.finished {
            self.finished = true;
            tracing::debug!(spec = %self.spec.id, elapsed_ms, "playback finished");
        }
        frame
    }

    /// Replaces the current run with a new spec. The previous run's pending
    /// tick is cancelled first; two evaluation loops must never coexist.
    pub fn restart(&mut self, spec: VisualizationSpec, clock: &dyn Clock) -> VizflowResult<()> {
        spec.validate()?;
        self.cancel_pending();
        tracing::debug!(spec = %spec.id, "restarting playback with new spec");
        self.state = base_state(&spec.layers);
        self.spec = spec;
        self.started_at_ms = clock.now_ms();
        self.finished = false;
        self.pending = Some(self.scheduler.request_tick());
        Ok(())
    }

    /// Restarts the current spec from elapsed time 0 with fresh effective
    /// state. The spec was validated when it was first accepted.
    pub fn replay(&mut self, clock: &dyn Clock) {
        self.cancel_pending();
        tracing::debug!(spec = %self.spec.id, "replaying");
        self.state = base_state(&self.spec.layers);
        self.started_at_ms = clock.now_ms();
        self.finished = false;
        self.pending = Some(self.scheduler.request_tick());
    }

    /// Cancels the pending tick and ends the run. Dropping the session does
    /// the same; this exists for shells that tear down explicitly.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.finished = true;
    }

    pub fn spec(&self) -> &VisualizationSpec {
        &self.spec
    }

    /// The effective layer states as of the latest evaluation.
    pub fn state(&self) -> &[LayerState] {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<S: TickScheduler> Drop for Playback<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn base_state(layers: &[Layer]) -> Vec<LayerState> {
    layers.iter().map(LayerState::base).collect()
}
