use std::{cell::RefCell, collections::HashMap, fmt, future::Future, rc::Rc};

use futures::lock::Mutex;
use tracing::Instrument;

use crate::{
    foundation::{
        core::SceneId,
        error::{PlayerError, PlayerResult},
        events::{Emitter, SubscriptionId},
    },
    lifecycle::{
        phase::{LifecycleEvent, ScenePhase, SceneState},
        stage::SceneStage,
    },
    transitions::surface::SurfaceRef,
};

/// Sequences the phases of every scene through a [`SceneStage`].
///
/// Phase order is checked when a phase is requested and again once the scene's gate is held, so a
/// phase requested while an earlier one is still in flight fails instead of queueing. Different
/// scenes progress independently.
pub struct LifecycleManager<S> {
    stage: S,
    surface: SurfaceRef,
    states: RefCell<HashMap<SceneId, SceneState>>,
    gates: RefCell<HashMap<SceneId, Rc<Mutex<()>>>>,
    events: Emitter<LifecycleEvent>,
}

impl<S> fmt::Debug for LifecycleManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("states", &self.states.borrow())
            .field("subscribers", &self.events.len())
            .finish()
    }
}

impl<S: SceneStage> LifecycleManager<S> {
    /// Manager driving `stage`, mounting layers on `surface`.
    pub fn new(stage: S, surface: SurfaceRef) -> Self {
        Self {
            stage,
            surface,
            states: RefCell::new(HashMap::new()),
            gates: RefCell::new(HashMap::new()),
            events: Emitter::default(),
        }
    }

    /// Load assets; the scene becomes `Created`.
    pub fn prepare(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene.clone(), ScenePhase::Prepare)
    }

    /// Mount layers; the scene becomes `Mounted`.
    pub fn mount(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene.clone(), ScenePhase::Mount)
    }

    /// Start playback; the scene becomes `Active`.
    pub fn play(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene.clone(), ScenePhase::Play)
    }

    /// Unmount layers; the scene becomes `Exiting`.
    pub fn unmount(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene.clone(), ScenePhase::Unmount)
    }

    /// Release resources; the scene becomes `Unmounted`.
    pub fn destroy(&self, scene: &SceneId) -> impl Future<Output = PlayerResult<()>> + '_ {
        self.run_phase(scene.clone(), ScenePhase::Destroy)
    }

    /// Run `phase` for `scene`.
    pub fn run_phase(
        &self,
        scene: SceneId,
        phase: ScenePhase,
    ) -> impl Future<Output = PlayerResult<()>> + '_ {
        let requested = self.check_order(&scene, phase);
        let span = tracing::debug_span!("scene_phase", scene = %scene, %phase);

        async move {
            requested?;
            let gate = self.gate(&scene);
            let held = gate.lock().await;
            self.check_order(&scene, phase)?;

            let result = match phase {
                ScenePhase::Prepare => self.stage.prepare_assets(&scene).await,
                ScenePhase::Mount => self.stage.mount_layers(&scene, &self.surface).await,
                ScenePhase::Play => self.stage.start_playback(&scene).await,
                ScenePhase::Unmount => self.stage.unmount_layers(&scene).await,
                ScenePhase::Destroy => self.stage.release_resources(&scene).await,
            };
            if let Err(source) = result {
                tracing::warn!(error = %source, "scene phase failed");
                return Err(PlayerError::Collaborator {
                    scene,
                    phase,
                    source,
                });
            }

            let state = phase.commits();
            self.states.borrow_mut().insert(scene.clone(), state);
            tracing::debug!(%state, "scene state committed");
            drop(held);
            if phase == ScenePhase::Destroy {
                self.release_gate(&scene, gate);
            }
            self.events.emit(&LifecycleEvent {
                kind: phase.event(),
                scene,
            });
            Ok(())
        }
        .instrument(span)
    }

    fn check_order(&self, scene: &SceneId, phase: ScenePhase) -> PlayerResult<()> {
        let state = self.scene_state(scene);
        if phase.accepts(state) {
            Ok(())
        } else {
            Err(PlayerError::LifecycleOrder {
                scene: scene.clone(),
                phase,
                state,
            })
        }
    }

    /// Forget a destroyed scene's gate unless another phase is already queued on it.
    fn release_gate(&self, scene: &SceneId, gate: Rc<Mutex<()>>) {
        let mut gates = self.gates.borrow_mut();
        let idle = gates
            .get(scene)
            .is_some_and(|g| Rc::ptr_eq(g, &gate) && Rc::strong_count(&gate) == 2);
        if idle {
            gates.remove(scene);
        }
    }

    fn gate(&self, scene: &SceneId) -> Rc<Mutex<()>> {
        let mut gates = self.gates.borrow_mut();
        Rc::clone(
            gates
                .entry(scene.clone())
                .or_insert_with(|| Rc::new(Mutex::new(()))),
        )
    }
}

impl<S> LifecycleManager<S> {
    /// The stage collaborator.
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Surface layers are mounted on.
    pub fn surface(&self) -> &SurfaceRef {
        &self.surface
    }

    /// Last committed state of `scene`, `None` if it was never prepared.
    pub fn scene_state(&self, scene: &SceneId) -> Option<SceneState> {
        self.states.borrow().get(scene).copied()
    }

    /// Every known scene and its state, ordered by id.
    pub fn scenes(&self) -> Vec<(SceneId, SceneState)> {
        let mut scenes: Vec<_> = self
            .states
            .borrow()
            .iter()
            .map(|(id, state)| (id.clone(), *state))
            .collect();
        scenes.sort_by(|a, b| a.0.cmp(&b.0));
        scenes
    }

    /// Scenes currently in `state`, ordered by id.
    pub fn scenes_in(&self, state: SceneState) -> Vec<SceneId> {
        self.scenes()
            .into_iter()
            .filter(|(_, s)| *s == state)
            .map(|(id, _)| id)
            .collect()
    }

    /// Receive an event after every committed phase.
    pub fn subscribe(&self, listener: impl Fn(&LifecycleEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Stop receiving events. Returns `false` for unknown ids.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/manager.rs"]
mod tests;
