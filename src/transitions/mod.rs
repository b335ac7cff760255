//! Scene-to-scene transitions: descriptors, strategies, surfaces and the single-slot engine.

/// Transition descriptors and strategy parsing.
pub mod descriptor;
/// Single-active transition engine.
pub mod engine;
/// Progress-to-visual mapping of each strategy.
pub mod strategy;
/// Compositor interface and an in-memory implementation.
pub mod surface;
