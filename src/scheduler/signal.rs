use std::{cell::RefCell, fmt, future::Future, rc::Rc};

use futures::channel::oneshot;

/// Frame number and tick time published after every scheduler tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FrameTime {
    /// Frame counter of the tick (starts at `0` after each `start`).
    pub frame: u64,
    /// Host time of the tick, in milliseconds.
    pub now_ms: f64,
    /// Time since the previous tick; `0` on the first tick after `start`, so time spent stopped
    /// never shows up here.
    pub delta_ms: f64,
}

impl FrameTime {
    /// Tick `frame` at `now_ms`, `delta_ms` after the one before it.
    pub fn new(frame: u64, now_ms: f64, delta_ms: f64) -> Self {
        Self {
            frame,
            now_ms,
            delta_ms,
        }
    }
}

/// Single-threaded broadcast of the latest tick.
///
/// Clones share state. Futures returned by [`FrameSignal::next_frame`] resolve at the next
/// [`FrameSignal::publish`], never with a frame published before they were created.
#[derive(Clone, Default)]
pub struct FrameSignal {
    inner: Rc<RefCell<SignalInner>>,
}

#[derive(Default)]
struct SignalInner {
    latest: Option<FrameTime>,
    waiters: Vec<oneshot::Sender<FrameTime>>,
}

impl fmt::Debug for FrameSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FrameSignal")
            .field("latest", &inner.latest)
            .field("waiters", &inner.waiters.len())
            .finish()
    }
}

impl FrameSignal {
    /// Signal with nothing published yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently published tick.
    pub fn latest(&self) -> Option<FrameTime> {
        self.inner.borrow().latest
    }

    /// Time of the most recent tick.
    pub fn now_ms(&self) -> Option<f64> {
        self.latest().map(|t| t.now_ms)
    }

    /// Resolve at the next published tick; `None` if every publisher is gone first.
    pub fn next_frame(&self) -> impl Future<Output = Option<FrameTime>> + use<> {
        let (tx, rx) = oneshot::channel();
        self.inner.borrow_mut().waiters.push(tx);
        async move { rx.await.ok() }
    }

    /// Record `time` and wake every pending `next_frame` future.
    pub fn publish(&self, time: FrameTime) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            inner.latest = Some(time);
            std::mem::take(&mut inner.waiters)
        };
        for tx in waiters {
            // A dropped receiver only means its waiter lost interest.
            let _ = tx.send(time);
        }
    }

    /// Pending `next_frame` futures.
    pub fn waiting(&self) -> usize {
        self.inner.borrow().waiters.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/signal.rs"]
mod tests;
