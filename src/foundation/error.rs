use crate::{
    foundation::core::SceneId,
    lifecycle::phase::{ScenePhase, SceneState},
    playback::state::RendererState,
};

/// Convenience result type used across the player.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Top-level error taxonomy used by player APIs.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// A track could not be compiled into a sampler.
    #[error("track compile error for '{property}': {source}")]
    TrackCompile {
        /// Property path of the offending track.
        property: String,
        /// What was wrong with it.
        #[source]
        source: TrackError,
    },

    /// Easing name did not resolve to a known curve.
    #[error("unknown easing '{0}'")]
    UnknownEasing(String),

    /// Transition descriptor names a strategy that does not exist.
    #[error("unknown transition type '{0}'")]
    UnknownTransitionType(String),

    /// Renderer state change outside the allowed graph.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// State the renderer was in.
        from: RendererState,
        /// Requested state.
        to: RendererState,
    },

    /// Scene phase requested out of order.
    #[error("lifecycle order error: cannot {phase} scene '{scene}' from {}", describe_state(.state))]
    LifecycleOrder {
        /// Scene the phase was requested for.
        scene: SceneId,
        /// Requested phase.
        phase: ScenePhase,
        /// Last committed state, `None` when the scene was never prepared.
        state: Option<SceneState>,
    },

    /// An external collaborator failed while running a scene phase.
    #[error("{phase} failed for scene '{scene}': {source}")]
    Collaborator {
        /// Scene the phase was running for.
        scene: SceneId,
        /// Phase that failed.
        phase: ScenePhase,
        /// Error reported by the collaborator.
        #[source]
        source: anyhow::Error,
    },

    /// The transition surface rejected a scratch-node operation.
    #[error("surface error: {0}")]
    Surface(#[source] anyhow::Error),

    /// Operation rejected by the renderer state gate.
    #[error("'{operation}' is not allowed while the renderer is {state}")]
    NotAllowed {
        /// Rejected operation.
        operation: &'static str,
        /// Renderer state at the time of the call.
        state: RendererState,
    },

    /// Invalid options or descriptor parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reasons a single track fails to compile.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// `end_ms` must be finite and strictly after `start_ms`.
    #[error("invalid range: start {start_ms} ms, end {end_ms} ms")]
    InvalidRange {
        /// Declared start.
        start_ms: f64,
        /// Declared end.
        end_ms: f64,
    },

    /// Track (or keyframe) easing did not resolve.
    #[error("unknown easing '{0}'")]
    UnknownEasing(String),

    /// Neither `from`/`to` nor keyframes were given.
    #[error("track needs `from` and `to` or at least one keyframe")]
    MissingValues,

    /// Two values that must interpolate have different kinds.
    #[error("cannot interpolate {from} into {to}")]
    MismatchedValues {
        /// Kind of the start value.
        from: &'static str,
        /// Kind of the end value.
        to: &'static str,
    },

    /// Value has a shape no interpolation exists for.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// Keyframe time is not a finite number.
    #[error("keyframe {index} has a non-finite time")]
    KeyframeTime {
        /// Position in the declared keyframe list.
        index: usize,
    },
}

fn describe_state(state: &Option<SceneState>) -> String {
    match state {
        Some(s) => s.to_string(),
        None => "an unprepared state".to_owned(),
    }
}

impl PlayerError {
    /// Build a [`PlayerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlayerError::TrackCompile`] value.
    pub fn track(property: impl Into<String>, source: TrackError) -> Self {
        Self::TrackCompile {
            property: property.into(),
            source,
        }
    }

    /// Build a [`PlayerError::Surface`] value.
    pub fn surface(err: anyhow::Error) -> Self {
        Self::Surface(err)
    }

    /// `true` for errors raised by an ordering violation rather than by a collaborator.
    pub fn is_lifecycle_order(&self) -> bool {
        matches!(self, Self::LifecycleOrder { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
