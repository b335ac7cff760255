//! Shared building blocks: error taxonomy, scene ids and event fan-out.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod events;
