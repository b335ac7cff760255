//! Frame scheduling: host tick registration, rolling pacing statistics and quality advice.

/// Frame scheduler and its options.
pub mod frame;
/// Host tick sources.
pub mod host;
/// Adaptive quality advice.
pub mod quality;
/// Per-tick broadcast used to wake frame-driven futures.
pub mod signal;
/// Rolling frame statistics.
pub mod stats;
