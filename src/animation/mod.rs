//! Animation primitives: easing curves, value interpolation and compiled tracks.
//!
//! Tracks are declared as [`track::TrackSpec`] and compiled once into immutable samplers.

/// Color parsing and interpolation.
pub mod color;
/// Named easing curves and CSS cubic-bezier timing functions.
pub mod ease;
/// Per-scene sets of compiled tracks.
pub mod set;
/// Track compilation and sampling.
pub mod track;
/// Values produced by sampling a track.
pub mod value;
