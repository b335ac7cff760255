use std::f64::consts::PI;

use crate::foundation::{
    core::unit_clamp,
    error::{PlayerError, PlayerResult},
};

/// Easing functions used to map normalized animation progress.
///
/// Every variant maps `0 -> 0` and `1 -> 1` exactly. The back, elastic and bounce families may
/// leave `[0, 1]` in between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Sinusoidal ease-in.
    InSine,
    /// Sinusoidal ease-out.
    OutSine,
    /// Sinusoidal ease-in/out.
    InOutSine,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Quartic ease-in.
    InQuart,
    /// Quartic ease-out.
    OutQuart,
    /// Quartic ease-in/out.
    InOutQuart,
    /// Quintic ease-in.
    InQuint,
    /// Quintic ease-out.
    OutQuint,
    /// Quintic ease-in/out.
    InOutQuint,
    /// Exponential ease-in.
    InExpo,
    /// Exponential ease-out.
    OutExpo,
    /// Exponential ease-in/out.
    InOutExpo,
    /// Circular ease-in.
    InCirc,
    /// Circular ease-out.
    OutCirc,
    /// Circular ease-in/out.
    InOutCirc,
    /// Ease-in that backs up before moving forward.
    InBack,
    /// Ease-out that overshoots the target.
    OutBack,
    /// Back ease on both ends.
    InOutBack,
    /// Elastic ease-in.
    InElastic,
    /// Elastic ease-out.
    OutElastic,
    /// Elastic ease-in/out.
    InOutElastic,
    /// Bouncing ease-in.
    InBounce,
    /// Bouncing ease-out.
    OutBounce,
    /// Bouncing ease-in/out.
    InOutBounce,
    /// CSS-style cubic bezier timing curve.
    CubicBezier(CubicBezier),
}

const FAMILIES: [(&str, [Ease; 3]); 10] = [
    ("sine", [Ease::InSine, Ease::OutSine, Ease::InOutSine]),
    ("quad", [Ease::InQuad, Ease::OutQuad, Ease::InOutQuad]),
    ("cubic", [Ease::InCubic, Ease::OutCubic, Ease::InOutCubic]),
    ("quart", [Ease::InQuart, Ease::OutQuart, Ease::InOutQuart]),
    ("quint", [Ease::InQuint, Ease::OutQuint, Ease::InOutQuint]),
    ("expo", [Ease::InExpo, Ease::OutExpo, Ease::InOutExpo]),
    ("circ", [Ease::InCirc, Ease::OutCirc, Ease::InOutCirc]),
    ("back", [Ease::InBack, Ease::OutBack, Ease::InOutBack]),
    ("elastic", [Ease::InElastic, Ease::OutElastic, Ease::InOutElastic]),
    ("bounce", [Ease::InBounce, Ease::OutBounce, Ease::InOutBounce]),
];

impl Ease {
    /// CSS `ease`, the default track easing.
    pub const EASE: Self = Self::CubicBezier(CubicBezier::EASE);

    /// Every named (non-parametric) curve.
    pub const NAMED: [Self; 31] = [
        Self::Linear,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InQuart,
        Self::OutQuart,
        Self::InOutQuart,
        Self::InQuint,
        Self::OutQuint,
        Self::InOutQuint,
        Self::InExpo,
        Self::OutExpo,
        Self::InOutExpo,
        Self::InCirc,
        Self::OutCirc,
        Self::InOutCirc,
        Self::InBack,
        Self::OutBack,
        Self::InOutBack,
        Self::InElastic,
        Self::OutElastic,
        Self::InOutElastic,
        Self::InBounce,
        Self::OutBounce,
        Self::InOutBounce,
    ];

    /// Resolve an easing by name.
    ///
    /// Matching ignores case, `-`, `_` and whitespace, and accepts an optional `ease` prefix, so
    /// `easeInOutCubic`, `ease-in-out-cubic`, `in_out_cubic` and `cubic-in-out` are the same curve.
    /// `ease`, `ease-in`, `ease-out` and `ease-in-out` are the CSS presets; `cubic-bezier(a, b, c, d)`
    /// builds a custom curve.
    pub fn from_name(name: &str) -> PlayerResult<Self> {
        let unknown = || PlayerError::UnknownEasing(name.to_owned());
        let lower = name.trim().to_ascii_lowercase();

        if let Some(args) = ["cubic-bezier(", "cubic_bezier(", "cubicbezier("]
            .iter()
            .find_map(|prefix| lower.strip_prefix(prefix))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let points = args
                .split(',')
                .map(|p| p.trim().parse::<f64>().map_err(|_| unknown()))
                .collect::<PlayerResult<Vec<_>>>()?;
            let &[x1, y1, x2, y2] = points.as_slice() else {
                return Err(unknown());
            };
            return CubicBezier::new(x1, y1, x2, y2)
                .map(Self::CubicBezier)
                .map_err(|_| unknown());
        }

        let norm: String = lower
            .chars()
            .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
            .collect();
        match norm.as_str() {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::EASE),
            "easein" => return Ok(Self::CubicBezier(CubicBezier::EASE_IN)),
            "easeout" => return Ok(Self::CubicBezier(CubicBezier::EASE_OUT)),
            "easeinout" => return Ok(Self::CubicBezier(CubicBezier::EASE_IN_OUT)),
            _ => {}
        }

        let rest = norm.strip_prefix("ease").unwrap_or(&norm);
        for (family, [ease_in, ease_out, ease_in_out]) in FAMILIES {
            let mode = rest
                .strip_suffix(family)
                .or_else(|| rest.strip_prefix(family));
            match mode {
                Some("in") => return Ok(ease_in),
                Some("out") => return Ok(ease_out),
                Some("inout") => return Ok(ease_in_out),
                _ => {}
            }
        }
        Err(unknown())
    }

    /// Canonical name, accepted back by [`Ease::from_name`].
    pub fn name(&self) -> String {
        match self {
            Self::Linear => "linear".to_owned(),
            Self::CubicBezier(b) => {
                format!("cubic-bezier({}, {}, {}, {})", b.x1, b.y1, b.x2, b.y2)
            }
            other => FAMILIES
                .iter()
                .find_map(|(family, modes)| {
                    let idx = modes.iter().position(|m| m == other)?;
                    let mode = ["in", "out", "in-out"][idx];
                    Some(format!("ease-{mode}-{family}"))
                })
                .unwrap_or_default(),
        }
    }

    /// Apply this easing function to normalized progress `t`, clamped into `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = unit_clamp(t);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match self {
            Self::Linear => t,
            Self::InSine => 1.0 - (t * PI / 2.0).cos(),
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::InQuad => in_pow(t, 2),
            Self::OutQuad => out_pow(t, 2),
            Self::InOutQuad => in_out_pow(t, 2),
            Self::InCubic => in_pow(t, 3),
            Self::OutCubic => out_pow(t, 3),
            Self::InOutCubic => in_out_pow(t, 3),
            Self::InQuart => in_pow(t, 4),
            Self::OutQuart => out_pow(t, 4),
            Self::InOutQuart => in_out_pow(t, 4),
            Self::InQuint => in_pow(t, 5),
            Self::OutQuint => out_pow(t, 5),
            Self::InOutQuint => in_out_pow(t, 5),
            Self::InExpo => 2f64.powf(10.0 * t - 10.0),
            Self::OutExpo => 1.0 - 2f64.powf(-10.0 * t),
            Self::InOutExpo => {
                if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Self::OutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Self::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Self::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::OutBack => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Self::InOutBack => {
                let c2 = BACK_C1 * 1.525;
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
                }
            }
            Self::InElastic => {
                let c4 = (2.0 * PI) / 3.0;
                -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
            }
            Self::OutElastic => elastic_out(t),
            Self::InOutElastic => {
                let c5 = (2.0 * PI) / 4.5;
                let s = ((20.0 * t - 11.125) * c5).sin();
                if t < 0.5 {
                    -(2f64.powf(20.0 * t - 10.0) * s) / 2.0
                } else {
                    (2f64.powf(-20.0 * t + 10.0) * s) / 2.0 + 1.0
                }
            }
            Self::InBounce => 1.0 - bounce_out(1.0 - t),
            Self::OutBounce => bounce_out(t),
            Self::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Self::CubicBezier(b) => b.solve(t),
        }
    }
}

impl Default for Ease {
    fn default() -> Self {
        Self::EASE
    }
}

impl serde::Serialize for Ease {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> serde::Deserialize<'de> for Ease {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;

fn in_pow(t: f64, n: i32) -> f64 {
    t.powi(n)
}

fn out_pow(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

fn in_out_pow(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

fn elastic_out(t: f64) -> f64 {
    let c4 = (2.0 * PI) / 3.0;
    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
}

fn bounce_out(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

/// Cubic bezier timing curve through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl CubicBezier {
    /// CSS `ease`.
    pub const EASE: Self = Self::preset(0.25, 0.1, 0.25, 1.0);
    /// CSS `ease-in`.
    pub const EASE_IN: Self = Self::preset(0.42, 0.0, 1.0, 1.0);
    /// CSS `ease-out`.
    pub const EASE_OUT: Self = Self::preset(0.0, 0.0, 0.58, 1.0);
    /// CSS `ease-in-out`.
    pub const EASE_IN_OUT: Self = Self::preset(0.42, 0.0, 0.58, 1.0);

    const fn preset(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a curve; x control points must lie in `[0, 1]` so the curve is a function of x.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> PlayerResult<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(PlayerError::validation(
                "cubic-bezier control points must be finite",
            ));
        }
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(PlayerError::validation(
                "cubic-bezier x control points must be within [0, 1]",
            ));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Control points as `[x1, y1, x2, y2]`.
    pub fn points(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Solve for the parameter whose x equals `x`, then return its y.
    fn solve(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }

        fn sample_curve(a1: f64, a2: f64, t: f64) -> f64 {
            let omt = 1.0 - t;
            3.0 * omt * omt * t * a1 + 3.0 * omt * t * t * a2 + t * t * t
        }
        fn sample_curve_derivative(a1: f64, a2: f64, t: f64) -> f64 {
            let omt = 1.0 - t;
            3.0 * omt * omt * a1 + 6.0 * omt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
        }

        // Newton-Raphson first; converges in a handful of steps on well-behaved curves.
        let mut t = x;
        for _ in 0..8 {
            let err = sample_curve(self.x1, self.x2, t) - x;
            if err.abs() < 1e-7 {
                return sample_curve(self.y1, self.y2, t);
            }
            let d = sample_curve_derivative(self.x1, self.x2, t);
            if d.abs() < 1e-7 {
                break;
            }
            t = (t - err / d).clamp(0.0, 1.0);
        }

        // Bisection fallback for flat derivatives.
        let mut lo = 0.0;
        let mut hi = 1.0;
        t = x;
        for _ in 0..40 {
            let x_t = sample_curve(self.x1, self.x2, t);
            if (x_t - x).abs() < 1e-7 {
                break;
            }
            if x_t < x {
                lo = t;
            } else {
                hi = t;
            }
            t = 0.5 * (lo + hi);
        }

        sample_curve(self.y1, self.y2, t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
