//! Renderer-level playback: the validated state machine and the player facade wiring every
//! component together.

/// Player facade.
pub mod player;
/// Renderer state machine.
pub mod state;
