use std::{
    cell::{Cell, RefCell},
    fmt,
    future::Future,
    pin::pin,
    rc::Rc,
};

use futures::{
    FutureExt,
    channel::oneshot,
    future::{self, Either, Shared},
};
use tracing::Instrument;

use crate::{
    foundation::{
        core::{SceneId, unit_clamp},
        error::{PlayerError, PlayerResult},
    },
    scheduler::signal::FrameSignal,
    transitions::{
        descriptor::{ResolvedTransition, TransitionDescriptor},
        strategy::VisualPair,
        surface::{NodeId, NodeRole, ScratchNode, SurfaceRef},
    },
};

/// Progress report delivered once per tick while a transition runs.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TransitionFrame {
    /// Transition id.
    pub id: u64,
    /// Scheduler frame that drove this step.
    pub frame: u64,
    /// Running time since the first tick seen by the transition. Time the scheduler spent
    /// stopped does not count.
    pub elapsed_ms: f64,
    /// `elapsed / duration`, clamped to `[0, 1]`.
    pub raw_progress: f64,
    /// Eased progress.
    pub progress: f64,
    /// Visuals written to the scratch nodes.
    pub visuals: VisualPair,
}

/// How a transition ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// Reached full progress; `on_complete` ran.
    Completed,
    /// Cancelled or superseded; `on_complete` did not run.
    Cancelled,
}

type ProgressFn = Box<dyn FnMut(&TransitionFrame)>;
type CompleteFn = Box<dyn FnOnce()>;

/// Scenes, surface and callbacks of one transition.
pub struct TransitionContext {
    /// Scene being left, if any.
    pub from: Option<SceneId>,
    /// Scene being entered.
    pub to: SceneId,
    surface: SurfaceRef,
    on_progress: Option<ProgressFn>,
    on_complete: Option<CompleteFn>,
}

impl TransitionContext {
    /// Context drawing into `surface`.
    pub fn new(from: Option<SceneId>, to: SceneId, surface: SurfaceRef) -> Self {
        Self {
            from,
            to,
            surface,
            on_progress: None,
            on_complete: None,
        }
    }

    /// Called after every tick's visuals are written.
    pub fn on_progress(mut self, f: impl FnMut(&TransitionFrame) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Called once on natural completion, after the scratch nodes are detached.
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for TransitionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionContext")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

#[derive(Default)]
struct CancelToken {
    flag: Cell<bool>,
    waiters: RefCell<Vec<oneshot::Sender<()>>>,
}

impl CancelToken {
    fn cancel(&self) {
        if self.flag.replace(true) {
            return;
        }
        for tx in std::mem::take(&mut *self.waiters.borrow_mut()) {
            let _ = tx.send(());
        }
    }

    fn is_cancelled(&self) -> bool {
        self.flag.get()
    }

    fn cancelled(&self) -> impl Future<Output = ()> + use<> {
        let (tx, rx) = oneshot::channel();
        if self.is_cancelled() {
            let _ = tx.send(());
        } else {
            self.waiters.borrow_mut().push(tx);
        }
        rx.map(|_| ())
    }
}

struct ActiveSlot {
    id: u64,
    cancel: Rc<CancelToken>,
    settled: Shared<oneshot::Receiver<()>>,
}

/// Clears the slot (if still owned) and wakes the successor when a transition ends or is dropped.
struct SettleGuard<'a> {
    engine: &'a TransitionEngine,
    id: u64,
    tx: Option<oneshot::Sender<()>>,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.engine.active.try_borrow_mut()
            && active.as_ref().is_some_and(|slot| slot.id == self.id)
        {
            *active = None;
        }
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

struct Claim<'a> {
    id: u64,
    cancel: Rc<CancelToken>,
    previous: Option<Shared<oneshot::Receiver<()>>>,
    guard: SettleGuard<'a>,
}

/// Runs at most one transition at a time, driven by scheduler ticks.
pub struct TransitionEngine {
    signal: FrameSignal,
    next_id: Cell<u64>,
    active: RefCell<Option<ActiveSlot>>,
}

impl fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("active", &self.active_id())
            .finish()
    }
}

impl TransitionEngine {
    /// Engine advancing on every tick published to `signal`.
    pub fn new(signal: FrameSignal) -> Self {
        Self {
            signal,
            next_id: Cell::new(0),
            active: RefCell::new(None),
        }
    }

    /// `true` from the moment a transition claims the slot until it settles.
    pub fn is_transitioning(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// Id of the transition holding the slot.
    pub fn active_id(&self) -> Option<u64> {
        self.active.borrow().as_ref().map(|slot| slot.id)
    }

    /// Cancel the active transition. Returns `false` when none is running.
    pub fn cancel_active(&self) -> bool {
        let active = self.active.borrow();
        let Some(slot) = active.as_ref() else {
            return false;
        };
        tracing::debug!(id = slot.id, "cancelling active transition");
        slot.cancel.cancel();
        true
    }

    /// Run a transition.
    ///
    /// The descriptor is resolved and the slot claimed before this returns, so a bad descriptor
    /// fails here without touching the running transition, and a valid one cancels it right away.
    /// The returned future waits for the cancelled transition to settle before attaching its own
    /// nodes. Cancellation is silent: the outcome is [`TransitionOutcome::Cancelled`] and
    /// `on_complete` is not called. Dropping the future detaches its nodes and frees the slot.
    pub fn execute(
        &self,
        desc: TransitionDescriptor,
        ctx: TransitionContext,
    ) -> PlayerResult<impl Future<Output = PlayerResult<TransitionOutcome>> + '_> {
        let resolved = desc.resolve()?;
        let Claim {
            id,
            cancel,
            previous,
            guard,
        } = self.claim();
        let span = tracing::debug_span!(
            "transition",
            id,
            kind = resolved.kind.name(),
            to = %ctx.to
        );

        Ok(async move {
            let _guard = guard;
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            if cancel.is_cancelled() {
                tracing::debug!("superseded before it started");
                return Ok(TransitionOutcome::Cancelled);
            }
            let outcome = self.run(id, &resolved, ctx, &cancel).await;
            tracing::debug!(?outcome, "transition settled");
            outcome
        }
        .instrument(span))
    }

    fn claim(&self) -> Claim<'_> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let cancel = Rc::new(CancelToken::default());
        let (tx, rx) = oneshot::channel();
        let slot = ActiveSlot {
            id,
            cancel: Rc::clone(&cancel),
            settled: rx.shared(),
        };

        let previous = self.active.borrow_mut().replace(slot).map(|prev| {
            tracing::debug!(superseded = prev.id, by = id, "superseding active transition");
            prev.cancel.cancel();
            prev.settled
        });

        Claim {
            id,
            cancel,
            previous,
            guard: SettleGuard {
                engine: self,
                id,
                tx: Some(tx),
            },
        }
    }

    async fn run(
        &self,
        id: u64,
        t: &ResolvedTransition,
        mut ctx: TransitionContext,
        cancel: &CancelToken,
    ) -> PlayerResult<TransitionOutcome> {
        let surface = Rc::clone(&ctx.surface);
        let attached = AttachedNodes {
            nodes: attach_nodes(&surface, id, &ctx)?,
            surface: Rc::clone(&surface),
            live: true,
        };

        let outcome = self
            .drive(id, t, &mut ctx, &surface, attached.nodes, cancel)
            .await;
        let detached = attached.detach();
        let outcome = outcome?;
        detached?;

        if outcome == TransitionOutcome::Completed
            && let Some(done) = ctx.on_complete.take()
        {
            done();
        }
        Ok(outcome)
    }

    async fn drive(
        &self,
        id: u64,
        t: &ResolvedTransition,
        ctx: &mut TransitionContext,
        surface: &SurfaceRef,
        nodes: Nodes,
        cancel: &CancelToken,
    ) -> PlayerResult<TransitionOutcome> {
        paint(surface, nodes, &t.kind.visuals(t.ease.apply(0.0)))?;

        let mut stop = pin!(cancel.cancelled());
        let mut elapsed = None;
        loop {
            let next = pin!(self.signal.next_frame());
            let tick = match future::select(next, stop.as_mut()).await {
                Either::Left((Some(tick), _)) => tick,
                Either::Left((None, _)) | Either::Right(_) => {
                    return Ok(TransitionOutcome::Cancelled);
                }
            };
            if cancel.is_cancelled() {
                return Ok(TransitionOutcome::Cancelled);
            }

            let elapsed_ms = elapsed.map_or(0.0, |e: f64| e + tick.delta_ms.max(0.0));
            elapsed = Some(elapsed_ms);
            let raw_progress = if t.duration_ms <= 0.0 {
                1.0
            } else {
                unit_clamp(elapsed_ms / t.duration_ms)
            };
            let progress = t.ease.apply(raw_progress);
            let visuals = t.kind.visuals(progress);
            paint(surface, nodes, &visuals)?;

            if let Some(on_progress) = ctx.on_progress.as_mut() {
                on_progress(&TransitionFrame {
                    id,
                    frame: tick.frame,
                    elapsed_ms,
                    raw_progress,
                    progress,
                    visuals,
                });
            }
            if raw_progress >= 1.0 {
                return Ok(TransitionOutcome::Completed);
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Nodes {
    outgoing: NodeId,
    incoming: NodeId,
}

/// Scratch nodes owned by a running transition, detached on drop if the run never got to it.
struct AttachedNodes {
    surface: SurfaceRef,
    nodes: Nodes,
    live: bool,
}

impl AttachedNodes {
    fn detach(mut self) -> PlayerResult<()> {
        self.live = false;
        detach_nodes(&self.surface, self.nodes)
    }
}

impl Drop for AttachedNodes {
    fn drop(&mut self) {
        if !self.live {
            return;
        }
        let Ok(mut surface) = self.surface.try_borrow_mut() else {
            tracing::warn!("surface busy, scratch nodes of a dropped transition stay attached");
            return;
        };
        for node in [self.nodes.outgoing, self.nodes.incoming] {
            if let Err(err) = surface.detach(node) {
                tracing::warn!(error = %err, "failed to detach scratch node");
            }
        }
    }
}

fn attach_nodes(surface: &SurfaceRef, id: u64, ctx: &TransitionContext) -> PlayerResult<Nodes> {
    let mut surface = surface.borrow_mut();
    let outgoing = surface
        .attach(ScratchNode {
            transition: id,
            role: NodeRole::Outgoing,
            scene: ctx.from.clone(),
        })
        .map_err(PlayerError::surface)?;
    let incoming = match surface.attach(ScratchNode {
        transition: id,
        role: NodeRole::Incoming,
        scene: Some(ctx.to.clone()),
    }) {
        Ok(node) => node,
        Err(err) => {
            if let Err(cleanup) = surface.detach(outgoing) {
                tracing::warn!(error = %cleanup, "failed to detach scratch node");
            }
            return Err(PlayerError::surface(err));
        }
    };
    Ok(Nodes { outgoing, incoming })
}

fn detach_nodes(surface: &SurfaceRef, nodes: Nodes) -> PlayerResult<()> {
    let mut surface = surface.borrow_mut();
    let outgoing = surface.detach(nodes.outgoing);
    let incoming = surface.detach(nodes.incoming);
    outgoing.and(incoming).map_err(PlayerError::surface)
}

fn paint(surface: &SurfaceRef, nodes: Nodes, visuals: &VisualPair) -> PlayerResult<()> {
    let mut surface = surface.borrow_mut();
    surface
        .update(nodes.outgoing, &visuals.outgoing)
        .map_err(PlayerError::surface)?;
    surface
        .update(nodes.incoming, &visuals.incoming)
        .map_err(PlayerError::surface)
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/engine.rs"]
mod tests;
