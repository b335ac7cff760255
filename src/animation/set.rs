use std::sync::Arc;

use crate::{
    animation::{
        track::{CompiledTrack, TrackSpec, compile_track},
        value::TrackValue,
    },
    foundation::error::PlayerResult,
};

/// One property value produced by [`TrackSet::sample`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SampledProperty {
    /// Property path the value belongs to.
    pub property: Arc<str>,
    /// Sampled value.
    pub value: TrackValue,
}

/// Compiled tracks of one scene timeline, sampled together.
#[derive(Clone, Debug, Default)]
pub struct TrackSet {
    tracks: Vec<CompiledTrack>,
}

impl TrackSet {
    /// Compile every spec, failing on the first track that does not compile.
    #[tracing::instrument(skip(specs), fields(tracks = specs.len()))]
    pub fn compile(specs: &[TrackSpec]) -> PlayerResult<Self> {
        let tracks = specs
            .iter()
            .map(compile_track)
            .collect::<PlayerResult<Vec<_>>>()?;
        tracing::debug!(duration_ms = duration_of(&tracks), "compiled track set");
        Ok(Self { tracks })
    }

    /// Latest end time over all tracks (first cycle for looping ones).
    pub fn duration_ms(&self) -> f64 {
        duration_of(&self.tracks)
    }

    /// Number of compiled tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// `true` when the set holds no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// First track driving `property`.
    pub fn get(&self, property: &str) -> Option<&CompiledTrack> {
        self.tracks.iter().find(|t| t.property() == property)
    }

    /// Tracks in declaration order.
    pub fn tracks(&self) -> &[CompiledTrack] {
        &self.tracks
    }

    /// Sample every track at `time_ms` into `out`, replacing its contents.
    pub fn sample_into(&self, time_ms: f64, out: &mut Vec<SampledProperty>) {
        out.clear();
        out.extend(self.tracks.iter().map(|track| SampledProperty {
            property: Arc::clone(track.property_name()),
            value: track.sample(time_ms),
        }));
    }

    /// Sample every track at `time_ms`.
    pub fn sample(&self, time_ms: f64) -> Vec<SampledProperty> {
        let mut out = Vec::with_capacity(self.tracks.len());
        self.sample_into(time_ms, &mut out);
        out
    }
}

fn duration_of(tracks: &[CompiledTrack]) -> f64 {
    tracks.iter().map(CompiledTrack::end_ms).fold(0.0, f64::max)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/set.rs"]
mod tests;
