use std::fmt;

use crate::foundation::core::SceneId;

/// Committed lifecycle state of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneState {
    /// Assets prepared, nothing mounted.
    Created,
    /// Layers mounted on the surface.
    Mounted,
    /// Playing.
    Active,
    /// Layers unmounted, resources still held.
    Exiting,
    /// Resources released; the scene may be prepared again.
    Unmounted,
}

impl SceneState {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Mounted => "mounted",
            Self::Active => "active",
            Self::Exiting => "exiting",
            Self::Unmounted => "unmounted",
        }
    }
}

impl fmt::Display for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the scene lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenePhase {
    /// Load assets (`→ Created`).
    Prepare,
    /// Attach layers to the surface (`Created → Mounted`).
    Mount,
    /// Start playback (`Mounted → Active`).
    Play,
    /// Detach layers (`Active | Mounted → Exiting`).
    Unmount,
    /// Release resources (`Exiting | Created → Unmounted`).
    Destroy,
}

impl ScenePhase {
    /// Every phase in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Prepare,
        Self::Mount,
        Self::Play,
        Self::Unmount,
        Self::Destroy,
    ];

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Mount => "mount",
            Self::Play => "play",
            Self::Unmount => "unmount",
            Self::Destroy => "destroy",
        }
    }

    /// Whether the phase may run from `state` (`None` for a scene never prepared).
    pub fn accepts(self, state: Option<SceneState>) -> bool {
        use SceneState as S;

        match self {
            Self::Prepare => matches!(state, None | Some(S::Unmounted)),
            Self::Mount => state == Some(S::Created),
            Self::Play => state == Some(S::Mounted),
            Self::Unmount => matches!(state, Some(S::Active | S::Mounted)),
            Self::Destroy => matches!(state, Some(S::Exiting | S::Created)),
        }
    }

    /// State committed when the phase succeeds.
    pub fn commits(self) -> SceneState {
        match self {
            Self::Prepare => SceneState::Created,
            Self::Mount => SceneState::Mounted,
            Self::Play => SceneState::Active,
            Self::Unmount => SceneState::Exiting,
            Self::Destroy => SceneState::Unmounted,
        }
    }

    /// Event emitted when the phase succeeds.
    pub fn event(self) -> LifecycleEventKind {
        match self {
            Self::Prepare => LifecycleEventKind::ScenePrepared,
            Self::Mount => LifecycleEventKind::SceneMounted,
            Self::Play => LifecycleEventKind::SceneActive,
            Self::Unmount => LifecycleEventKind::SceneUnmounted,
            Self::Destroy => LifecycleEventKind::SceneDestroyed,
        }
    }
}

impl fmt::Display for ScenePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a [`LifecycleEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum LifecycleEventKind {
    /// `prepare` finished.
    ScenePrepared,
    /// `mount` finished.
    SceneMounted,
    /// `play` finished.
    SceneActive,
    /// `unmount` finished.
    SceneUnmounted,
    /// `destroy` finished.
    SceneDestroyed,
}

/// Emitted after a phase commits.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LifecycleEvent {
    /// What happened.
    pub kind: LifecycleEventKind,
    /// Scene it happened to.
    pub scene: SceneId,
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/phase.rs"]
mod tests;
