use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// Handle returned by every `subscribe`/`add_*_callback` call, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// Monotonic id allocator shared by the callback lists.
#[derive(Debug, Default)]
pub(crate) struct IdGen(Cell<u64>);

impl IdGen {
    pub(crate) fn next(&self) -> SubscriptionId {
        let id = self.0.get() + 1;
        self.0.set(id);
        SubscriptionId(id)
    }
}

type Listener<E> = Rc<dyn Fn(&E)>;

/// Single-threaded event fan-out.
///
/// Listeners are snapshotted before dispatch, so a listener may subscribe or unsubscribe while an
/// event is being delivered; the change applies from the next `emit`.
pub(crate) struct Emitter<E> {
    ids: IdGen,
    listeners: RefCell<Vec<(SubscriptionId, Listener<E>)>>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            ids: IdGen::default(),
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl<E> Emitter<E> {
    pub(crate) fn subscribe(&self, listener: impl Fn(&E) + 'static) -> SubscriptionId {
        let id = self.ids.next();
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub(crate) fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.borrow().len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/events.rs"]
mod tests;
