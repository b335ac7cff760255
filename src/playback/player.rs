use std::{cell::RefCell, collections::HashMap, fmt, future::Future};

use crate::{
    animation::{
        set::{SampledProperty, TrackSet},
        track::TrackSpec,
    },
    foundation::{
        core::SceneId,
        error::{PlayerError, PlayerResult},
        events::{Emitter, SubscriptionId},
    },
    lifecycle::{
        manager::LifecycleManager,
        phase::{LifecycleEvent, ScenePhase, SceneState},
        stage::SceneStage,
    },
    playback::state::{PlaybackStateMachine, RendererState, StateChange},
    scheduler::{
        frame::{FrameContext, FrameScheduler, SchedulerOpts},
        host::TickSource,
        quality::QualityChange,
        stats::PerformanceMetrics,
    },
    transitions::{
        descriptor::TransitionDescriptor,
        engine::{TransitionContext, TransitionEngine, TransitionOutcome},
        surface::SurfaceRef,
    },
};

/// Player options.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerOpts {
    /// Frame loop options.
    pub scheduler: SchedulerOpts,
}

/// Timeline values of one active scene for one tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneSample {
    /// Sampled scene.
    pub scene: SceneId,
    /// Scheduler frame.
    pub frame: u64,
    /// Playing time since the first tick the scene was seen active. Time spent paused does not
    /// count, so a resumed timeline continues where it stopped.
    pub local_ms: f64,
    /// One value per track, in declaration order.
    pub values: Vec<SampledProperty>,
}

#[derive(Debug)]
struct Timeline {
    tracks: TrackSet,
    local_ms: Option<f64>,
}

/// Wires the playback state machine, frame scheduler, lifecycle manager and transition engine
/// together and gates every call by the renderer state.
///
/// The host owns the timer: it calls [`Player::tick`] whenever the registration made through the
/// [`TickSource`] fires, and polls the futures returned by the lifecycle and transition methods on
/// a single-threaded executor.
pub struct Player<S> {
    state: PlaybackStateMachine,
    scheduler: FrameScheduler,
    lifecycle: LifecycleManager<S>,
    engine: TransitionEngine,
    timelines: RefCell<HashMap<SceneId, Timeline>>,
    samples: Emitter<SceneSample>,
}

impl<S> fmt::Debug for Player<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.state.state())
            .field("scheduler", &self.scheduler)
            .field("engine", &self.engine)
            .field("timelines", &self.timelines.borrow().len())
            .finish()
    }
}

impl<S: SceneStage> Player<S> {
    /// Build an idle player.
    pub fn new(
        opts: PlayerOpts,
        stage: S,
        surface: SurfaceRef,
        source: Box<dyn TickSource>,
    ) -> PlayerResult<Self> {
        let scheduler = FrameScheduler::new(opts.scheduler, source)?;
        let engine = TransitionEngine::new(scheduler.frame_signal());
        Ok(Self {
            state: PlaybackStateMachine::new(),
            scheduler,
            lifecycle: LifecycleManager::new(stage, surface),
            engine,
            timelines: RefCell::new(HashMap::new()),
            samples: Emitter::default(),
        })
    }

    /// Load assets for `scene`.
    pub fn prepare_scene(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene, ScenePhase::Prepare)
    }

    /// Mount the layers of `scene`.
    pub fn mount_scene(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene, ScenePhase::Mount)
    }

    /// Start `scene`; its timeline begins at the next tick.
    pub fn play_scene(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene, ScenePhase::Play)
    }

    /// Unmount the layers of `scene`.
    pub fn unmount_scene(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene, ScenePhase::Unmount)
    }

    /// Release the resources of `scene`.
    pub fn destroy_scene(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene, ScenePhase::Destroy)
    }

    /// Run a lifecycle phase, rejected while the renderer is idle or destroyed.
    pub fn run_phase(
        &self,
        scene: &SceneId,
        phase: ScenePhase,
    ) -> impl Future<Output = PlayerResult<()>> + '_ {
        let pending = self
            .allow_lifecycle(phase.as_str())
            .map(|()| self.lifecycle.run_phase(scene.clone(), phase));
        let scene = scene.clone();

        async move {
            pending?.await?;
            if matches!(phase, ScenePhase::Play | ScenePhase::Unmount)
                && let Some(timeline) = self.timelines.borrow_mut().get_mut(&scene)
            {
                timeline.local_ms = None;
            }
            Ok(())
        }
    }

    /// Transition between scenes. Only allowed while playing; a bad descriptor or state fails
    /// here, before anything is awaited.
    pub fn transition(
        &self,
        desc: TransitionDescriptor,
        ctx: TransitionContext,
    ) -> PlayerResult<impl Future<Output = PlayerResult<TransitionOutcome>> + '_> {
        let state = self.state();
        if state != RendererState::Playing {
            return Err(PlayerError::NotAllowed {
                operation: "transition",
                state,
            });
        }
        self.engine.execute(desc, ctx)
    }

    fn allow_lifecycle(&self, operation: &'static str) -> PlayerResult<()> {
        match self.state() {
            state @ (RendererState::Idle | RendererState::Destroyed) => {
                Err(PlayerError::NotAllowed { operation, state })
            }
            _ => Ok(()),
        }
    }
}

impl<S> Player<S> {
    /// Idle to ready.
    pub fn initialize(&self) -> PlayerResult<()> {
        self.state.transition(RendererState::Ready)?;
        Ok(())
    }

    /// Start or resume playback and register the host tick.
    pub fn play(&self) -> PlayerResult<()> {
        self.state.transition(RendererState::Playing)?;
        self.scheduler.start();
        Ok(())
    }

    /// Suspend ticking. Scene states and timeline positions are kept.
    pub fn pause(&self) -> PlayerResult<()> {
        self.state.transition(RendererState::Paused)?;
        self.scheduler.stop();
        Ok(())
    }

    /// End playback, cancelling any running transition.
    pub fn stop(&self) -> PlayerResult<()> {
        self.state.transition(RendererState::Stopped)?;
        self.halt();
        Ok(())
    }

    /// Stopped to ready. Timelines restart from their next activation tick.
    pub fn reset(&self) -> PlayerResult<()> {
        let from = self.state();
        if from != RendererState::Stopped {
            return Err(PlayerError::InvalidStateTransition {
                from,
                to: RendererState::Ready,
            });
        }
        self.state.transition(RendererState::Ready)?;
        for timeline in self.timelines.borrow_mut().values_mut() {
            timeline.local_ms = None;
        }
        Ok(())
    }

    /// Tear the player down for good.
    pub fn destroy(&self) -> PlayerResult<()> {
        self.state.transition(RendererState::Destroyed)?;
        self.halt();
        Ok(())
    }

    fn halt(&self) {
        self.scheduler.stop();
        self.engine.cancel_active();
    }

    /// Compile and attach the timeline of `scene`, replacing any previous one.
    pub fn load_timeline(&self, scene: &SceneId, specs: &[TrackSpec]) -> PlayerResult<()> {
        if self.state() == RendererState::Destroyed {
            return Err(PlayerError::NotAllowed {
                operation: "load_timeline",
                state: RendererState::Destroyed,
            });
        }
        let tracks = TrackSet::compile(specs)?;
        tracing::debug!(%scene, tracks = tracks.len(), "timeline loaded");
        self.timelines.borrow_mut().insert(
            scene.clone(),
            Timeline {
                tracks,
                local_ms: None,
            },
        );
        Ok(())
    }

    /// Drop the timeline of `scene`. Returns `false` when none was loaded.
    pub fn unload_timeline(&self, scene: &SceneId) -> bool {
        self.timelines.borrow_mut().remove(scene).is_some()
    }

    /// Duration of the timeline loaded for `scene`.
    pub fn timeline_duration_ms(&self, scene: &SceneId) -> Option<f64> {
        self.timelines
            .borrow()
            .get(scene)
            .map(|t| t.tracks.duration_ms())
    }

    /// Process one host tick: run frame callbacks, wake transitions and sample the timeline of
    /// every active scene. Returns `None` while the scheduler is stopped.
    pub fn tick(&self, now_ms: f64) -> Option<FrameContext> {
        let ctx = self.scheduler.tick(now_ms)?;

        let active = self.lifecycle.scenes_in(SceneState::Active);
        let samples: Vec<SceneSample> = {
            let mut timelines = self.timelines.borrow_mut();
            active
                .into_iter()
                .filter_map(|scene| {
                    let timeline = timelines.get_mut(&scene)?;
                    let local_ms = timeline.local_ms.map_or(0.0, |t| t + ctx.delta_ms);
                    timeline.local_ms = Some(local_ms);
                    Some(SceneSample {
                        values: timeline.tracks.sample(local_ms),
                        scene,
                        frame: ctx.frame,
                        local_ms,
                    })
                })
                .collect()
        };
        for sample in &samples {
            self.samples.emit(sample);
        }
        Some(ctx)
    }

    /// Current renderer state.
    pub fn state(&self) -> RendererState {
        self.state.state()
    }

    /// Last committed state of `scene`.
    pub fn scene_state(&self, scene: &SceneId) -> Option<SceneState> {
        self.lifecycle.scene_state(scene)
    }

    /// Rolling frame rate.
    pub fn current_fps(&self) -> f64 {
        self.scheduler.current_fps()
    }

    /// Rolling pacing statistics.
    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.scheduler.performance_metrics()
    }

    /// `true` while a transition holds the engine.
    pub fn is_transitioning(&self) -> bool {
        self.engine.is_transitioning()
    }

    /// Surface scenes are mounted on and transitions draw into.
    pub fn surface(&self) -> &SurfaceRef {
        self.lifecycle.surface()
    }

    /// The stage collaborator.
    pub fn stage(&self) -> &S {
        self.lifecycle.stage()
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// The transition engine.
    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    /// Receive every renderer state change.
    pub fn on_state_change(&self, listener: impl Fn(&StateChange) + 'static) -> SubscriptionId {
        self.state.subscribe(listener)
    }

    /// Undo [`Self::on_state_change`].
    pub fn unsubscribe_state(&self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Receive every committed scene phase.
    pub fn on_lifecycle(&self, listener: impl Fn(&LifecycleEvent) + 'static) -> SubscriptionId {
        self.lifecycle.subscribe(listener)
    }

    /// Undo [`Self::on_lifecycle`].
    pub fn unsubscribe_lifecycle(&self, id: SubscriptionId) -> bool {
        self.lifecycle.unsubscribe(id)
    }

    /// Receive quality advice.
    pub fn on_quality(&self, listener: impl Fn(&QualityChange) + 'static) -> SubscriptionId {
        self.scheduler.add_quality_callback(listener)
    }

    /// Undo [`Self::on_quality`].
    pub fn unsubscribe_quality(&self, id: SubscriptionId) -> bool {
        self.scheduler.remove_quality_callback(id)
    }

    /// Receive timeline samples of active scenes.
    pub fn on_sample(&self, listener: impl Fn(&SceneSample) + 'static) -> SubscriptionId {
        self.samples.subscribe(listener)
    }

    /// Undo [`Self::on_sample`].
    pub fn unsubscribe_sample(&self, id: SubscriptionId) -> bool {
        self.samples.unsubscribe(id)
    }

    /// Run `cb` on every tick.
    pub fn add_frame_callback(
        &self,
        cb: impl FnMut(&FrameContext) -> anyhow::Result<()> + 'static,
    ) -> SubscriptionId {
        self.scheduler.add_frame_callback(cb)
    }

    /// Undo [`Self::add_frame_callback`].
    pub fn remove_frame_callback(&self, id: SubscriptionId) -> bool {
        self.scheduler.remove_frame_callback(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/player.rs"]
mod tests;
