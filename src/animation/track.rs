use std::sync::Arc;

use crate::{
    animation::{
        ease::Ease,
        value::{Interp, TrackValue, ValueKind},
    },
    foundation::{
        core::unit_clamp,
        error::{PlayerError, PlayerResult, TrackError},
    },
};

/// Declarative animation of one property.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TrackSpec {
    /// Property path the track drives (e.g. `"layer.opacity"`).
    pub property: String,
    /// Start value, used when `keyframes` is empty.
    #[serde(default)]
    pub from: Option<serde_json::Value>,
    /// End value, used when `keyframes` is empty.
    #[serde(default)]
    pub to: Option<serde_json::Value>,
    /// Keyframes at normalized times; take precedence over `from`/`to`.
    #[serde(default)]
    pub keyframes: Vec<KeyframeSpec>,
    /// Track start on the scene clock, in milliseconds.
    pub start_ms: f64,
    /// Track end on the scene clock, in milliseconds.
    pub end_ms: f64,
    /// Easing name, `"ease"` when absent.
    #[serde(default)]
    pub easing: Option<String>,
    /// Repeat the `[start, end]` cycle forever.
    #[serde(default, rename = "loop")]
    pub looping: bool,
    /// Reverse direction on odd cycles (only meaningful with `looping`).
    #[serde(default)]
    pub yoyo: bool,
}

impl TrackSpec {
    /// Tween `property` from `from` to `to` over `[start_ms, end_ms]`.
    pub fn tween(
        property: impl Into<String>,
        from: serde_json::Value,
        to: serde_json::Value,
        start_ms: f64,
        end_ms: f64,
    ) -> Self {
        Self {
            property: property.into(),
            from: Some(from),
            to: Some(to),
            keyframes: Vec::new(),
            start_ms,
            end_ms,
            easing: None,
            looping: false,
            yoyo: false,
        }
    }

    /// Set the easing name.
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    /// Enable looping, optionally alternating direction.
    pub fn looped(mut self, yoyo: bool) -> Self {
        self.looping = true;
        self.yoyo = yoyo;
        self
    }
}

/// One keyframe of a [`TrackSpec`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct KeyframeSpec {
    /// Normalized time in `[0, 1]`; values outside are clamped.
    pub time: f64,
    /// Value at this keyframe.
    pub value: serde_json::Value,
    /// Easing toward the next keyframe; the track easing when absent.
    #[serde(default)]
    pub easing: Option<String>,
}

/// Immutable time sampler built from a [`TrackSpec`].
#[derive(Clone, Debug)]
pub struct CompiledTrack {
    property: Arc<str>,
    start_ms: f64,
    end_ms: f64,
    looping: bool,
    yoyo: bool,
    ease: Ease,
    kind: ValueKind,
    sampler: Sampler,
}

#[derive(Clone, Debug)]
enum Sampler {
    Tween(Interp),
    Keyframes(Vec<Segment>),
}

#[derive(Clone, Debug)]
struct Segment {
    t0: f64,
    t1: f64,
    ease: Ease,
    interp: Interp,
}

/// Compile a track into a sampler. Errors name the offending property.
pub fn compile_track(spec: &TrackSpec) -> PlayerResult<CompiledTrack> {
    compile_inner(spec).map_err(|source| PlayerError::track(spec.property.as_str(), source))
}

fn compile_inner(spec: &TrackSpec) -> Result<CompiledTrack, TrackError> {
    if !spec.start_ms.is_finite() || !spec.end_ms.is_finite() || spec.end_ms <= spec.start_ms {
        return Err(TrackError::InvalidRange {
            start_ms: spec.start_ms,
            end_ms: spec.end_ms,
        });
    }

    let ease = resolve_ease(spec.easing.as_deref())?.unwrap_or(Ease::EASE);

    let (kind, sampler) = if spec.keyframes.is_empty() {
        let (Some(from), Some(to)) = (&spec.from, &spec.to) else {
            return Err(TrackError::MissingValues);
        };
        let interp = Interp::between(from, to)?;
        (interp.kind(), Sampler::Tween(interp))
    } else {
        let segments = compile_keyframes(&spec.keyframes, ease)?;
        (segments[0].interp.kind(), Sampler::Keyframes(segments))
    };

    Ok(CompiledTrack {
        property: Arc::from(spec.property.as_str()),
        start_ms: spec.start_ms,
        end_ms: spec.end_ms,
        looping: spec.looping,
        yoyo: spec.yoyo,
        ease,
        kind,
        sampler,
    })
}

fn resolve_ease(name: Option<&str>) -> Result<Option<Ease>, TrackError> {
    name.map(|n| Ease::from_name(n).map_err(|_| TrackError::UnknownEasing(n.to_owned())))
        .transpose()
}

fn compile_keyframes(keys: &[KeyframeSpec], track_ease: Ease) -> Result<Vec<Segment>, TrackError> {
    let mut sorted: Vec<(f64, &KeyframeSpec)> = Vec::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        if !key.time.is_finite() {
            return Err(TrackError::KeyframeTime { index });
        }
        sorted.push((key.time.clamp(0.0, 1.0), key));
    }
    // Stable: keys sharing a time keep declaration order.
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    if let [(t, only)] = sorted[..] {
        return Ok(vec![Segment {
            t0: t,
            t1: t,
            ease: Ease::Linear,
            interp: Interp::constant(&only.value)?,
        }]);
    }

    let mut segments = Vec::with_capacity(sorted.len() - 1);
    for pair in sorted.windows(2) {
        let (t0, a) = pair[0];
        let (t1, b) = pair[1];
        let ease = resolve_ease(a.easing.as_deref())?.unwrap_or(track_ease);
        segments.push(Segment {
            t0,
            t1,
            ease,
            interp: Interp::between(&a.value, &b.value)?,
        });
    }

    let kind = segments[0].interp.kind();
    if let Some(other) = segments.iter().find(|s| s.interp.kind() != kind) {
        return Err(TrackError::MismatchedValues {
            from: kind.as_str(),
            to: other.interp.kind().as_str(),
        });
    }
    Ok(segments)
}

/// Phase within this distance of `1.0` belongs to the next loop cycle.
const LOOP_SNAP: f64 = 1e-9;

impl CompiledTrack {
    /// Property path this track drives.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Shared handle to the property path, cloned into every sample.
    pub fn property_name(&self) -> &Arc<str> {
        &self.property
    }

    /// Start time in milliseconds.
    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    /// End time in milliseconds (end of the first cycle when looping).
    pub fn end_ms(&self) -> f64 {
        self.end_ms
    }

    /// Whether the track repeats.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether odd cycles run backwards.
    pub fn is_yoyo(&self) -> bool {
        self.yoyo
    }

    /// Kind of the values this track returns.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Easing applied to track progress.
    pub fn ease(&self) -> Ease {
        self.ease
    }

    /// Normalized, not yet eased, progress at `time_ms`.
    pub fn progress(&self, time_ms: f64) -> f64 {
        let span = self.end_ms - self.start_ms;
        let local = time_ms - self.start_ms;
        if !local.is_finite() || local <= 0.0 {
            return 0.0;
        }
        if !self.looping {
            return unit_clamp(local / span);
        }

        // A time on a cycle boundary starts the next cycle.
        let mut cycle = (local / span).floor();
        let mut p = (local - cycle * span) / span;
        if p >= 1.0 - LOOP_SNAP {
            cycle += 1.0;
            p = 0.0;
        }
        let p = unit_clamp(p);
        if self.yoyo && cycle % 2.0 == 1.0 {
            1.0 - p
        } else {
            p
        }
    }

    /// Sample the track. Never fails: times outside the track clamp to its boundary values.
    pub fn sample(&self, time_ms: f64) -> TrackValue {
        let p = self.progress(time_ms);
        match &self.sampler {
            Sampler::Tween(interp) => interp.at(self.ease.apply(p)),
            Sampler::Keyframes(segments) => sample_segments(segments, p),
        }
    }
}

fn sample_segments(segments: &[Segment], p: f64) -> TrackValue {
    let first = &segments[0];
    if p <= first.t0 {
        return first.interp.at(0.0);
    }
    let idx = segments.partition_point(|s| s.t1 < p);
    let Some(seg) = segments.get(idx) else {
        return segments[segments.len() - 1].interp.at(1.0);
    };
    let span = seg.t1 - seg.t0;
    if span <= 0.0 {
        return seg.interp.at(1.0);
    }
    seg.interp.at(seg.ease.apply((p - seg.t0) / span))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/track.rs"]
mod tests;
