use std::{cell::RefCell, rc::Rc};

/// Registration handle returned by a [`TickSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Host timer the scheduler registers its periodic tick with.
///
/// The host is expected to call [`FrameScheduler::tick`](crate::FrameScheduler::tick) every time a
/// registration fires, until it is cancelled.
pub trait TickSource {
    /// Start firing roughly every `interval_ms` milliseconds.
    fn schedule(&mut self, interval_ms: f64) -> TickHandle;

    /// Stop firing for `handle`. Unknown or already cancelled handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// In-memory tick host for headless drivers and tests.
///
/// Clones share state, so a driver can keep one clone while the scheduler owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualTicks {
    inner: Rc<RefCell<ManualInner>>,
}

#[derive(Debug, Default)]
struct ManualInner {
    next: u64,
    active: Option<(TickHandle, f64)>,
    scheduled: usize,
    cancelled: usize,
}

impl ManualTicks {
    /// Fresh host with no registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live registration and its interval, if any.
    pub fn active(&self) -> Option<(TickHandle, f64)> {
        self.inner.borrow().active
    }

    /// Interval of the live registration.
    pub fn interval_ms(&self) -> Option<f64> {
        self.active().map(|(_, interval)| interval)
    }

    /// Total `schedule` calls seen.
    pub fn scheduled(&self) -> usize {
        self.inner.borrow().scheduled
    }

    /// Total `cancel` calls that hit the live registration.
    pub fn cancelled(&self) -> usize {
        self.inner.borrow().cancelled
    }
}

impl TickSource for ManualTicks {
    fn schedule(&mut self, interval_ms: f64) -> TickHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next += 1;
        let handle = TickHandle(inner.next);
        inner.active = Some((handle, interval_ms));
        inner.scheduled += 1;
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        let mut inner = self.inner.borrow_mut();
        if inner.active.is_some_and(|(live, _)| live == handle) {
            inner.active = None;
            inner.cancelled += 1;
        }
    }
}
