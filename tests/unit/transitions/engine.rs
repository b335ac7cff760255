use futures::{executor::LocalPool, task::LocalSpawnExt};

use super::*;
use crate::{
    scheduler::signal::FrameTime,
    transitions::{
        strategy::TransitionVisual,
        surface::{MemorySurface, TransitionSurface},
    },
};

type Slot = Rc<RefCell<Option<PlayerResult<TransitionOutcome>>>>;

struct Rig {
    pool: LocalPool,
    signal: FrameSignal,
    engine: Rc<TransitionEngine>,
    surface: Rc<RefCell<MemorySurface>>,
    frame: u64,
    last_ms: Option<f64>,
}

impl Rig {
    fn new() -> Self {
        let signal = FrameSignal::new();
        Self {
            pool: LocalPool::new(),
            engine: Rc::new(TransitionEngine::new(signal.clone())),
            signal,
            surface: MemorySurface::shared(),
            frame: 0,
            last_ms: None,
        }
    }

    fn ctx(&self, to: &str) -> TransitionContext {
        let surface: SurfaceRef = self.surface.clone();
        TransitionContext::new(Some(SceneId::new("from")), SceneId::new(to), surface)
    }

    fn spawn(&mut self, desc: TransitionDescriptor, ctx: TransitionContext) -> Slot {
        let slot: Slot = Rc::new(RefCell::new(None));
        let out = Rc::clone(&slot);
        let engine = Rc::clone(&self.engine);
        self.pool
            .spawner()
            .spawn_local(async move {
                let result = match engine.execute(desc, ctx) {
                    Ok(run) => run.await,
                    Err(err) => Err(err),
                };
                *out.borrow_mut() = Some(result);
            })
            .unwrap();
        self.pool.run_until_stalled();
        slot
    }

    fn tick(&mut self, now_ms: f64) {
        let delta_ms = self.last_ms.map_or(0.0, |last| now_ms - last);
        self.signal
            .publish(FrameTime::new(self.frame, now_ms, delta_ms));
        self.frame += 1;
        self.last_ms = Some(now_ms);
        self.pool.run_until_stalled();
    }

    /// The scheduler was stopped and started again: frames restart at zero.
    fn restart(&mut self) {
        self.frame = 0;
        self.last_ms = None;
    }
}

fn outcome(slot: &Slot) -> Option<TransitionOutcome> {
    slot.borrow().as_ref().map(|r| *r.as_ref().unwrap())
}

fn crossfade(duration_ms: f64) -> TransitionDescriptor {
    TransitionDescriptor::new("crossfade").with_duration_ms(duration_ms)
}

#[test]
fn runs_to_completion_on_ticks() {
    let mut rig = Rig::new();
    let progress = Rc::new(RefCell::new(Vec::new()));
    let completed = Rc::new(Cell::new(0));

    let p = Rc::clone(&progress);
    let c = Rc::clone(&completed);
    let ctx = rig
        .ctx("b")
        .on_progress(move |f| p.borrow_mut().push(f.progress))
        .on_complete(move || c.set(c.get() + 1));
    let slot = rig.spawn(crossfade(100.0), ctx);

    assert!(rig.engine.is_transitioning());
    assert_eq!(rig.surface.borrow().live(), 2);
    let incoming = rig.surface.borrow().find(NodeRole::Incoming).unwrap();
    assert_eq!(rig.surface.borrow().visual(incoming).unwrap().opacity, 0.0);

    for t in [1000.0, 1050.0, 1100.0] {
        rig.tick(t);
    }

    assert_eq!(outcome(&slot), Some(TransitionOutcome::Completed));
    assert_eq!(*progress.borrow(), vec![0.0, 0.5, 1.0]);
    assert_eq!(completed.get(), 1);
    assert_eq!(rig.surface.borrow().live(), 0);
    assert!(!rig.engine.is_transitioning());
}

#[test]
fn zero_duration_completes_on_first_tick() {
    let mut rig = Rig::new();
    let ctx = rig.ctx("b");
    let slot = rig.spawn(crossfade(0.0), ctx);
    assert_eq!(outcome(&slot), None);
    rig.tick(5.0);
    assert_eq!(outcome(&slot), Some(TransitionOutcome::Completed));
}

#[test]
fn newer_transition_supersedes_the_active_one() {
    let mut rig = Rig::new();
    let done_a = Rc::new(Cell::new(0));
    let done_b = Rc::new(Cell::new(0));

    let d = Rc::clone(&done_a);
    let ctx = rig.ctx("a").on_complete(move || d.set(d.get() + 1));
    let a = rig.spawn(crossfade(500.0), ctx);
    rig.tick(0.0);
    rig.tick(100.0);

    let d = Rc::clone(&done_b);
    let ctx = rig.ctx("b").on_complete(move || d.set(d.get() + 1));
    let b = rig.spawn(crossfade(200.0), ctx);

    assert_eq!(outcome(&a), Some(TransitionOutcome::Cancelled));
    assert!(rig.engine.is_transitioning());
    assert_eq!(rig.surface.borrow().live(), 2);

    for t in [200.0, 300.0, 400.0] {
        rig.tick(t);
    }
    assert_eq!(outcome(&b), Some(TransitionOutcome::Completed));
    assert_eq!(done_a.get(), 0);
    assert_eq!(done_b.get(), 1);
    assert!(!rig.engine.is_transitioning());
    assert_eq!(rig.surface.borrow().live(), 0);
}

#[test]
fn claimant_cancelled_while_waiting_never_runs() {
    let mut rig = Rig::new();
    let ctx = rig.ctx("a");
    let a = rig.spawn(crossfade(500.0), ctx);

    // Both claims happen back to back, before `a` has had a chance to settle.
    let b: Slot = Rc::new(RefCell::new(None));
    let c: Slot = Rc::new(RefCell::new(None));
    {
        let engine = Rc::clone(&rig.engine);
        let (ctx_b, ctx_c) = (rig.ctx("b"), rig.ctx("c"));
        let (out_b, out_c) = (Rc::clone(&b), Rc::clone(&c));
        rig.pool
            .spawner()
            .spawn_local(async move {
                let fb = engine.execute(crossfade(100.0), ctx_b).unwrap();
                let fc = engine.execute(crossfade(100.0), ctx_c).unwrap();
                futures::join!(
                    async { *out_b.borrow_mut() = Some(fb.await) },
                    async { *out_c.borrow_mut() = Some(fc.await) },
                );
            })
            .unwrap();
        rig.pool.run_until_stalled();
    }

    assert_eq!(outcome(&a), Some(TransitionOutcome::Cancelled));
    assert_eq!(outcome(&b), Some(TransitionOutcome::Cancelled));
    assert_eq!(outcome(&c), None);
    // `a` and `c` attached two nodes each; `b` never touched the surface.
    assert_eq!(rig.surface.borrow().attached(), 4);

    rig.tick(0.0);
    rig.tick(100.0);
    assert_eq!(outcome(&c), Some(TransitionOutcome::Completed));
}

#[test]
fn cancel_active_is_silent() {
    let mut rig = Rig::new();
    let completed = Rc::new(Cell::new(false));
    let c = Rc::clone(&completed);
    let ctx = rig.ctx("b").on_complete(move || c.set(true));
    let slot = rig.spawn(crossfade(500.0), ctx);
    rig.tick(0.0);

    assert!(rig.engine.cancel_active());
    rig.pool.run_until_stalled();

    assert_eq!(outcome(&slot), Some(TransitionOutcome::Cancelled));
    assert!(!completed.get());
    assert!(!rig.engine.is_transitioning());
    assert!(!rig.engine.cancel_active());
    assert_eq!(rig.surface.borrow().live(), 0);
}

#[test]
fn bad_descriptor_leaves_the_active_transition_alone() {
    let mut rig = Rig::new();
    let ctx = rig.ctx("a");
    let a = rig.spawn(crossfade(500.0), ctx);
    let active = rig.engine.active_id();

    let ctx = rig.ctx("b");
    let bad = rig.spawn(TransitionDescriptor::new("spin"), ctx);
    assert!(matches!(
        &*bad.borrow(),
        Some(Err(PlayerError::UnknownTransitionType(_)))
    ));
    assert_eq!(rig.engine.active_id(), active);
    assert_eq!(outcome(&a), None);
}

#[test]
fn unknown_type_fails_without_claiming() {
    let rig = Rig::new();
    let result = rig.engine.execute(TransitionDescriptor::new("spin"), rig.ctx("b"));
    assert!(matches!(result, Err(PlayerError::UnknownTransitionType(_))));
    assert!(!rig.engine.is_transitioning());
    assert_eq!(rig.surface.borrow().attached(), 0);
}

#[test]
fn dropping_a_running_transition_detaches_its_nodes() {
    let rig = Rig::new();
    let completed = Rc::new(Cell::new(false));
    let c = Rc::clone(&completed);
    let ctx = rig.ctx("b").on_complete(move || c.set(true));
    let mut run = Box::pin(rig.engine.execute(crossfade(500.0), ctx).unwrap());

    assert!((&mut run).now_or_never().is_none());
    rig.signal.publish(FrameTime::new(0, 0.0, 0.0));
    assert!((&mut run).now_or_never().is_none());
    assert_eq!(rig.surface.borrow().live(), 2);
    assert!(rig.engine.is_transitioning());

    drop(run);
    assert_eq!(rig.surface.borrow().live(), 0);
    assert!(!rig.engine.is_transitioning());
    assert!(!completed.get());
}

#[test]
fn restarted_frames_continue_from_the_elapsed_time() {
    let mut rig = Rig::new();
    let progress = Rc::new(RefCell::new(Vec::new()));
    let p = Rc::clone(&progress);
    let ctx = rig.ctx("b").on_progress(move |f| p.borrow_mut().push(f.elapsed_ms));
    let slot = rig.spawn(crossfade(200.0), ctx);

    rig.tick(0.0);
    rig.tick(100.0);
    rig.restart();
    rig.tick(5000.0);
    assert_eq!(outcome(&slot), None);
    rig.tick(5100.0);

    assert_eq!(*progress.borrow(), vec![0.0, 100.0, 100.0, 200.0]);
    assert_eq!(outcome(&slot), Some(TransitionOutcome::Completed));
}

struct FlakySurface {
    inner: MemorySurface,
    updates_left: usize,
}

impl TransitionSurface for FlakySurface {
    fn attach(&mut self, node: ScratchNode) -> anyhow::Result<NodeId> {
        self.inner.attach(node)
    }

    fn update(&mut self, id: NodeId, visual: &TransitionVisual) -> anyhow::Result<()> {
        if self.updates_left == 0 {
            anyhow::bail!("compositor lost");
        }
        self.updates_left -= 1;
        self.inner.update(id, visual)
    }

    fn detach(&mut self, id: NodeId) -> anyhow::Result<()> {
        self.inner.detach(id)
    }
}

#[test]
fn surface_errors_settle_before_propagating() {
    let mut rig = Rig::new();
    let flaky = Rc::new(RefCell::new(FlakySurface {
        inner: MemorySurface::new(),
        updates_left: 2,
    }));
    let surface: SurfaceRef = flaky.clone();
    let ctx = TransitionContext::new(None, SceneId::new("b"), surface);
    let slot = rig.spawn(crossfade(100.0), ctx);
    rig.tick(0.0);

    assert!(matches!(&*slot.borrow(), Some(Err(PlayerError::Surface(_)))));
    assert_eq!(flaky.borrow().inner.live(), 0);
    assert!(!rig.engine.is_transitioning());
}
