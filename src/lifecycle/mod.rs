//! Scene lifecycle: ordered async phases per scene, delegated to a stage collaborator.

/// Per-scene phase sequencing.
pub mod manager;
/// Scene states, phases and lifecycle events.
pub mod phase;
/// Collaborator interface for phase work.
pub mod stage;
