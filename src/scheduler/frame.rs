use std::{
    cell::RefCell,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    rc::Rc,
};

use crate::{
    foundation::{
        error::{PlayerError, PlayerResult},
        events::{Emitter, IdGen, SubscriptionId},
    },
    scheduler::{
        host::{TickHandle, TickSource},
        quality::{QualityChange, QualityMonitor, QualityOpts},
        signal::{FrameSignal, FrameTime},
        stats::{FrameWindow, PerformanceMetrics},
    },
};

/// Smallest delta recorded for a tick, used when the host clock stalls or runs backwards.
pub const MIN_FRAME_DELTA_MS: f64 = 0.001;

/// Frame scheduler options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SchedulerOpts {
    /// Rate the host tick is registered at.
    pub target_fps: f64,
    /// Number of frame deltas kept for the rolling statistics.
    pub window_size: usize,
    /// Frame-time variance (ms²) under which pacing counts as stable.
    pub stability_variance_threshold: f64,
    /// Adaptive quality advice.
    pub quality: QualityOpts,
}

impl Default for SchedulerOpts {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            window_size: 60,
            stability_variance_threshold: 4.0,
            quality: QualityOpts::default(),
        }
    }
}

impl SchedulerOpts {
    /// Reject option values the scheduler cannot run with.
    pub fn validate(&self) -> PlayerResult<()> {
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(PlayerError::validation("target_fps must be > 0"));
        }
        if self.window_size == 0 {
            return Err(PlayerError::validation("window_size must be > 0"));
        }
        if !(self.stability_variance_threshold.is_finite()
            && self.stability_variance_threshold >= 0.0)
        {
            return Err(PlayerError::validation(
                "stability_variance_threshold must be finite and >= 0",
            ));
        }
        let q = &self.quality;
        if !(q.interval_ms.is_finite() && q.interval_ms > 0.0) {
            return Err(PlayerError::validation("quality.interval_ms must be > 0"));
        }
        if q.low_fps >= q.high_fps {
            return Err(PlayerError::validation(
                "quality.low_fps must be below quality.high_fps",
            ));
        }
        if q.sustain_checks == 0 {
            return Err(PlayerError::validation("quality.sustain_checks must be > 0"));
        }
        Ok(())
    }

    /// Host tick interval derived from `target_fps`.
    pub fn interval_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }
}

/// Per-tick context handed to frame callbacks.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FrameContext {
    /// Time since the previous tick (`0` on the first tick after `start`).
    pub delta_ms: f64,
    /// Host time of this tick.
    pub now_ms: f64,
    /// Rolling frame rate.
    pub fps: f64,
    /// Tick counter since `start`, starting at `0`.
    pub frame: u64,
    /// Rolling statistics including this tick.
    pub metrics: PerformanceMetrics,
}

type FrameCallback = Rc<RefCell<dyn FnMut(&FrameContext) -> anyhow::Result<()>>>;

struct Clock {
    handle: Option<TickHandle>,
    last_ms: Option<f64>,
    frame: u64,
    window: FrameWindow,
    quality: QualityMonitor,
}

impl Clock {
    fn reset(&mut self) {
        self.last_ms = None;
        self.frame = 0;
        self.window.clear();
        self.quality.reset();
    }
}

/// Drives frame callbacks from host ticks and keeps rolling pacing statistics.
///
/// All methods take `&self`; the scheduler is meant to be shared by reference between the host
/// timer and the components it drives.
pub struct FrameScheduler {
    opts: SchedulerOpts,
    source: RefCell<Box<dyn TickSource>>,
    clock: RefCell<Clock>,
    ids: IdGen,
    frame_callbacks: RefCell<Vec<(SubscriptionId, FrameCallback)>>,
    quality_callbacks: Emitter<QualityChange>,
    signal: FrameSignal,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("opts", &self.opts)
            .field("running", &self.is_running())
            .field("frame_callbacks", &self.frame_callbacks.borrow().len())
            .field("quality_callbacks", &self.quality_callbacks.len())
            .finish()
    }
}

impl FrameScheduler {
    /// Build a stopped scheduler ticking through `source`.
    pub fn new(opts: SchedulerOpts, source: Box<dyn TickSource>) -> PlayerResult<Self> {
        opts.validate()?;
        let clock = Clock {
            handle: None,
            last_ms: None,
            frame: 0,
            window: FrameWindow::new(opts.window_size),
            quality: QualityMonitor::new(opts.quality.clone()),
        };
        Ok(Self {
            opts,
            source: RefCell::new(source),
            clock: RefCell::new(clock),
            ids: IdGen::default(),
            frame_callbacks: RefCell::new(Vec::new()),
            quality_callbacks: Emitter::default(),
            signal: FrameSignal::new(),
        })
    }

    /// Options the scheduler was built with.
    pub fn opts(&self) -> &SchedulerOpts {
        &self.opts
    }

    /// Register the periodic tick with the host. No-op while already running.
    pub fn start(&self) {
        if self.is_running() {
            return;
        }
        let interval_ms = self.opts.interval_ms();
        let handle = self.source.borrow_mut().schedule(interval_ms);
        let mut clock = self.clock.borrow_mut();
        clock.reset();
        clock.handle = Some(handle);
        tracing::debug!(interval_ms, "frame scheduler started");
    }

    /// Cancel the host tick and reset every rolling statistic. No-op while stopped.
    pub fn stop(&self) {
        let handle = {
            let mut clock = self.clock.borrow_mut();
            let handle = clock.handle.take();
            clock.reset();
            handle
        };
        if let Some(handle) = handle {
            self.source.borrow_mut().cancel(handle);
            tracing::debug!("frame scheduler stopped");
        }
    }

    /// `true` between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.clock.borrow().handle.is_some()
    }

    /// Process one host tick at `now_ms`. Returns `None` (and does nothing) while stopped.
    pub fn tick(&self, now_ms: f64) -> Option<FrameContext> {
        if !now_ms.is_finite() {
            tracing::warn!(now_ms, "ignoring tick with non-finite time");
            return None;
        }

        let (ctx, advice) = {
            let mut clock = self.clock.borrow_mut();
            clock.handle?;

            let delta_ms = match clock.last_ms {
                None => 0.0,
                Some(prev) => {
                    let delta = (now_ms - prev).max(MIN_FRAME_DELTA_MS);
                    clock.window.push(delta);
                    delta
                }
            };
            clock.last_ms = Some(now_ms);
            let frame = clock.frame;
            clock.frame += 1;

            let metrics = clock
                .window
                .metrics(self.opts.target_fps, self.opts.stability_variance_threshold);
            let ctx = FrameContext {
                delta_ms,
                now_ms,
                fps: metrics.fps,
                frame,
                metrics,
            };
            let advice = clock.quality.observe(now_ms, &metrics);
            (ctx, advice)
        };

        self.run_frame_callbacks(&ctx);

        if let Some(change) = advice {
            tracing::warn!(
                delta = change.delta,
                fps = change.metrics.fps,
                grade = %change.metrics.grade,
                "quality change advised"
            );
            self.quality_callbacks.emit(&change);
        }

        self.signal
            .publish(FrameTime::new(ctx.frame, now_ms, ctx.delta_ms));
        Some(ctx)
    }

    fn run_frame_callbacks(&self, ctx: &FrameContext) {
        let snapshot: Vec<(SubscriptionId, FrameCallback)> = self
            .frame_callbacks
            .borrow()
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();

        for (id, cb) in snapshot {
            let Ok(mut cb) = cb.try_borrow_mut() else {
                tracing::warn!(?id, "skipping re-entrant frame callback");
                continue;
            };
            match catch_unwind(AssertUnwindSafe(|| (&mut *cb)(ctx))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(?id, frame = ctx.frame, error = %err, "frame callback failed");
                }
                Err(panic) => {
                    tracing::error!(
                        ?id,
                        frame = ctx.frame,
                        panic = panic_message(panic.as_ref()),
                        "frame callback panicked"
                    );
                }
            }
        }
    }

    /// Run `cb` on every tick, after the callbacks registered before it.
    pub fn add_frame_callback(
        &self,
        cb: impl FnMut(&FrameContext) -> anyhow::Result<()> + 'static,
    ) -> SubscriptionId {
        let id = self.ids.next();
        let cb: FrameCallback = Rc::new(RefCell::new(cb));
        self.frame_callbacks.borrow_mut().push((id, cb));
        id
    }

    /// Remove a frame callback. Returns `false` for unknown ids.
    pub fn remove_frame_callback(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.frame_callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(cid, _)| *cid != id);
        callbacks.len() != before
    }

    /// Receive quality advice.
    pub fn add_quality_callback(&self, cb: impl Fn(&QualityChange) + 'static) -> SubscriptionId {
        self.quality_callbacks.subscribe(cb)
    }

    /// Remove a quality callback. Returns `false` for unknown ids.
    pub fn remove_quality_callback(&self, id: SubscriptionId) -> bool {
        self.quality_callbacks.unsubscribe(id)
    }

    /// Rolling frame rate, `0` until two ticks have been seen since `start`.
    pub fn current_fps(&self) -> f64 {
        self.clock.borrow().window.fps()
    }

    /// Snapshot of the rolling statistics.
    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.clock
            .borrow()
            .window
            .metrics(self.opts.target_fps, self.opts.stability_variance_threshold)
    }

    /// Signal published after every processed tick.
    pub fn frame_signal(&self) -> FrameSignal {
        self.signal.clone()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/frame.rs"]
mod tests;
