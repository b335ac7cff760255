use std::{cell::Cell, fmt, time::SystemTime};

use crate::foundation::{
    error::{PlayerError, PlayerResult},
    events::{Emitter, SubscriptionId},
};

/// Renderer-level playback state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererState {
    /// Constructed, not initialized.
    Idle,
    /// Initialized and able to play.
    Ready,
    /// Ticking.
    Playing,
    /// Ticking suspended; may resume.
    Paused,
    /// Playback ended; may be reset to `Ready`.
    Stopped,
    /// Torn down for good.
    Destroyed,
}

impl RendererState {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Destroyed => "destroyed",
        }
    }

    /// States reachable from `self` in one step.
    pub fn successors(self) -> &'static [RendererState] {
        use RendererState::*;

        match self {
            Idle => &[Ready],
            Ready => &[Playing, Destroyed],
            Playing => &[Paused, Stopped, Destroyed],
            Paused => &[Playing, Stopped, Destroyed],
            Stopped => &[Ready, Destroyed],
            Destroyed => &[],
        }
    }

    /// Whether `self -> to` is an allowed transition.
    pub fn can_transition_to(self, to: RendererState) -> bool {
        self.successors().contains(&to)
    }
}

impl fmt::Display for RendererState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted after every accepted transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    /// State before the transition.
    pub previous: RendererState,
    /// State after the transition.
    pub current: RendererState,
    /// Wall-clock time of the transition.
    pub timestamp: SystemTime,
}

/// Validated renderer state holder.
#[derive(Debug)]
pub struct PlaybackStateMachine {
    state: Cell<RendererState>,
    events: Emitter<StateChange>,
}

impl Default for PlaybackStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackStateMachine {
    /// Machine in [`RendererState::Idle`].
    pub fn new() -> Self {
        Self {
            state: Cell::new(RendererState::Idle),
            events: Emitter::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> RendererState {
        self.state.get()
    }

    /// Whether moving to `to` would be accepted.
    pub fn can_transition(&self, to: RendererState) -> bool {
        self.state().can_transition_to(to)
    }

    /// Move to `to`, notifying subscribers. Fails outside the allowed graph.
    pub fn transition(&self, to: RendererState) -> PlayerResult<StateChange> {
        let previous = self.state();
        if !previous.can_transition_to(to) {
            return Err(PlayerError::InvalidStateTransition { from: previous, to });
        }
        self.state.set(to);
        let change = StateChange {
            previous,
            current: to,
            timestamp: SystemTime::now(),
        };
        tracing::debug!(from = %previous, to = %to, "renderer state changed");
        self.events.emit(&change);
        Ok(change)
    }

    /// Receive every accepted transition.
    pub fn subscribe(&self, listener: impl Fn(&StateChange) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Stop receiving transitions. Returns `false` for unknown ids.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/state.rs"]
mod tests;
