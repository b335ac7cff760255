use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use crate::{foundation::core::SceneId, transitions::strategy::TransitionVisual};

/// Identifier a surface assigns to an attached scratch node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

/// Which side of a transition a scratch node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The scene being left.
    Outgoing,
    /// The scene being entered.
    Incoming,
}

/// Node a transition attaches to the surface for its lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScratchNode {
    /// Transition owning the node.
    pub transition: u64,
    /// Side of the transition.
    pub role: NodeRole,
    /// Scene the node stands in for (`None` for an outgoing side with no scene).
    pub scene: Option<SceneId>,
}

/// Compositor the transition engine draws into.
pub trait TransitionSurface {
    /// Add a node and return its id.
    fn attach(&mut self, node: ScratchNode) -> anyhow::Result<NodeId>;

    /// Apply the visual for the current tick.
    fn update(&mut self, id: NodeId, visual: &TransitionVisual) -> anyhow::Result<()>;

    /// Remove a node.
    fn detach(&mut self, id: NodeId) -> anyhow::Result<()>;
}

/// Shared handle to the surface, as held by the engine and scene stages.
pub type SurfaceRef = Rc<RefCell<dyn TransitionSurface>>;

/// Headless surface that records nodes and the last visual written to each.
#[derive(Debug, Default)]
pub struct MemorySurface {
    next: u64,
    nodes: BTreeMap<NodeId, (ScratchNode, Option<TransitionVisual>)>,
    attached: usize,
    detached: usize,
    updates: usize,
}

impl MemorySurface {
    /// Empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a shared handle. Keep a clone of the `Rc` to inspect it afterwards.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Nodes currently attached.
    pub fn live(&self) -> usize {
        self.nodes.len()
    }

    /// Node attached under `id`.
    pub fn node(&self, id: NodeId) -> Option<&ScratchNode> {
        self.nodes.get(&id).map(|(node, _)| node)
    }

    /// Last visual written to `id`.
    pub fn visual(&self, id: NodeId) -> Option<&TransitionVisual> {
        self.nodes.get(&id).and_then(|(_, visual)| visual.as_ref())
    }

    /// Live node with `role`, if any.
    pub fn find(&self, role: NodeRole) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, (node, _))| node.role == role)
            .map(|(id, _)| *id)
    }

    /// Total attaches seen.
    pub fn attached(&self) -> usize {
        self.attached
    }

    /// Total detaches seen.
    pub fn detached(&self) -> usize {
        self.detached
    }

    /// Total visual updates seen.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl TransitionSurface for MemorySurface {
    fn attach(&mut self, node: ScratchNode) -> anyhow::Result<NodeId> {
        self.next += 1;
        let id = NodeId(self.next);
        self.nodes.insert(id, (node, None));
        self.attached += 1;
        Ok(id)
    }

    fn update(&mut self, id: NodeId, visual: &TransitionVisual) -> anyhow::Result<()> {
        let (_, slot) = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("update of unknown node {id:?}"))?;
        *slot = Some(*visual);
        self.updates += 1;
        Ok(())
    }

    fn detach(&mut self, id: NodeId) -> anyhow::Result<()> {
        self.nodes
            .remove(&id)
            .ok_or_else(|| anyhow::anyhow!("detach of unknown node {id:?}"))?;
        self.detached += 1;
        Ok(())
    }
}
