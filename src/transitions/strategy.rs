use kurbo::{Rect, Vec2};

use crate::{
    foundation::core::{lerp_f64, unit_clamp},
    transitions::descriptor::{TransitionKind, WipeDir},
};

/// Noise-threshold reveal parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DissolveMask {
    /// Noise seed.
    pub seed: u64,
    /// Pixels whose noise value is below the threshold are shown.
    pub threshold: f64,
}

/// How one scratch node is drawn at a given progress.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TransitionVisual {
    /// Layer opacity in `[0, 1]`.
    pub opacity: f64,
    /// Offset in viewport units (`1.0` is a full width or height).
    pub offset: Vec2,
    /// Uniform scale.
    pub scale: f64,
    /// Normalized scale origin.
    pub origin: Vec2,
    /// Gaussian blur radius in pixels.
    pub blur_radius: f64,
    /// Normalized visible region, `None` for the whole layer.
    pub clip: Option<Rect>,
    /// Feather of the clip edge in `[0, 1]`.
    pub soft_edge: f64,
    /// Noise reveal, if any.
    pub dissolve: Option<DissolveMask>,
}

impl TransitionVisual {
    /// Fully visible, untransformed layer.
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        offset: Vec2::ZERO,
        scale: 1.0,
        origin: Vec2::new(0.5, 0.5),
        blur_radius: 0.0,
        clip: None,
        soft_edge: 0.0,
        dissolve: None,
    };

    fn with_opacity(opacity: f64) -> Self {
        Self {
            opacity: unit_clamp(opacity),
            ..Self::IDENTITY
        }
    }
}

impl Default for TransitionVisual {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Visuals of both layers at one progress value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VisualPair {
    /// Scene being left.
    pub outgoing: TransitionVisual,
    /// Scene being entered.
    pub incoming: TransitionVisual,
}

impl TransitionKind {
    /// Map eased progress `p` to layer visuals.
    ///
    /// Offsets and scales follow overshooting easings; opacity, clip and thresholds stay in
    /// `[0, 1]`.
    pub fn visuals(&self, p: f64) -> VisualPair {
        let q = unit_clamp(p);
        match *self {
            Self::Crossfade => VisualPair {
                outgoing: TransitionVisual::with_opacity(1.0 - q),
                incoming: TransitionVisual::with_opacity(q),
            },
            Self::Slide { dir } => {
                let v = dir.entry_offset();
                VisualPair {
                    outgoing: TransitionVisual {
                        offset: -v * p,
                        ..TransitionVisual::IDENTITY
                    },
                    incoming: TransitionVisual {
                        offset: v * (1.0 - p),
                        ..TransitionVisual::IDENTITY
                    },
                }
            }
            Self::Zoom {
                origin,
                from_scale,
                to_scale,
            } => VisualPair {
                outgoing: TransitionVisual::IDENTITY,
                incoming: TransitionVisual {
                    opacity: q,
                    scale: lerp_f64(from_scale, to_scale, p).max(0.0),
                    origin,
                    ..TransitionVisual::IDENTITY
                },
            },
            Self::Wipe { dir, soft_edge } => VisualPair {
                outgoing: TransitionVisual::IDENTITY,
                incoming: TransitionVisual {
                    clip: Some(wipe_rect(dir, q)),
                    soft_edge,
                    ..TransitionVisual::IDENTITY
                },
            },
            Self::Dissolve { seed } => VisualPair {
                outgoing: TransitionVisual::IDENTITY,
                incoming: TransitionVisual {
                    dissolve: Some(DissolveMask { seed, threshold: q }),
                    ..TransitionVisual::IDENTITY
                },
            },
            Self::Blur { max_radius } => {
                let blur_radius = max_radius * (1.0 - (2.0 * q - 1.0).abs());
                VisualPair {
                    outgoing: TransitionVisual {
                        blur_radius,
                        ..TransitionVisual::with_opacity(1.0 - q)
                    },
                    incoming: TransitionVisual {
                        blur_radius,
                        ..TransitionVisual::with_opacity(q)
                    },
                }
            }
        }
    }
}

fn wipe_rect(dir: WipeDir, q: f64) -> Rect {
    match dir {
        WipeDir::LeftToRight => Rect::new(0.0, 0.0, q, 1.0),
        WipeDir::RightToLeft => Rect::new(1.0 - q, 0.0, 1.0, 1.0),
        WipeDir::TopToBottom => Rect::new(0.0, 0.0, 1.0, q),
        WipeDir::BottomToTop => Rect::new(0.0, 1.0 - q, 1.0, 1.0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/strategy.rs"]
mod tests;
