//! Temporal core of a layered scene player.
//!
//! The crate decides when things happen and how progress maps to values; drawing, asset loading
//! and audio belong to the host. It is organised around four cooperating components:
//!
//! - [`TrackSet`] compiles declarative animation tracks into samplers
//! - [`FrameScheduler`] turns host ticks into frame callbacks, pacing statistics and quality advice
//! - [`LifecycleManager`] runs the ordered async phases of every scene through a [`SceneStage`]
//! - [`TransitionEngine`] runs one cancellable scene-to-scene transition at a time
//!
//! [`Player`] wires them together behind a [`PlaybackStateMachine`]. Everything is
//! single-threaded; hosts poll the returned futures on a local executor.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Easing, value interpolation and track compilation.
pub mod animation;
/// Scene lifecycle phases.
pub mod lifecycle;
/// Renderer state and the player facade.
pub mod playback;
/// Frame loop.
pub mod scheduler;
/// Scene-to-scene transitions.
pub mod transitions;

pub use kurbo::{Rect, Vec2};

pub use crate::foundation::core::SceneId;
pub use crate::foundation::error::{PlayerError, PlayerResult, TrackError};
pub use crate::foundation::events::SubscriptionId;

pub use crate::animation::color::Rgba;
pub use crate::animation::ease::{CubicBezier, Ease};
pub use crate::animation::set::{SampledProperty, TrackSet};
pub use crate::animation::track::{CompiledTrack, KeyframeSpec, TrackSpec, compile_track};
pub use crate::animation::value::{TrackValue, ValueKind};
pub use crate::lifecycle::manager::LifecycleManager;
pub use crate::lifecycle::phase::{LifecycleEvent, LifecycleEventKind, ScenePhase, SceneState};
pub use crate::lifecycle::stage::SceneStage;
pub use crate::playback::player::{Player, PlayerOpts, SceneSample};
pub use crate::playback::state::{PlaybackStateMachine, RendererState, StateChange};
pub use crate::scheduler::frame::{FrameContext, FrameScheduler, SchedulerOpts};
pub use crate::scheduler::host::{ManualTicks, TickHandle, TickSource};
pub use crate::scheduler::quality::{QualityChange, QualityOpts};
pub use crate::scheduler::signal::{FrameSignal, FrameTime};
pub use crate::scheduler::stats::{Grade, PerformanceMetrics};
pub use crate::transitions::descriptor::{
    ResolvedTransition, SlideDir, TransitionDescriptor, TransitionKind, WipeDir,
};
pub use crate::transitions::engine::{
    TransitionContext, TransitionEngine, TransitionFrame, TransitionOutcome,
};
pub use crate::transitions::strategy::{DissolveMask, TransitionVisual, VisualPair};
pub use crate::transitions::surface::{
    MemorySurface, NodeId, NodeRole, ScratchNode, SurfaceRef, TransitionSurface,
};
