use kurbo::Vec2;

use crate::{
    animation::ease::Ease,
    foundation::error::{PlayerError, PlayerResult},
};

/// Declarative request for one scene-to-scene transition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionDescriptor {
    /// Strategy name: `crossfade`, `slide`, `zoom`, `wipe`, `dissolve` or `blur`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Duration in milliseconds.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f64,
    /// Easing name applied to raw progress.
    #[serde(default = "default_easing")]
    pub easing: String,
    /// Strategy parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

fn default_duration_ms() -> f64 {
    500.0
}

fn default_easing() -> String {
    "linear".to_owned()
}

impl TransitionDescriptor {
    /// Descriptor for `kind` with default duration, easing and parameters.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            duration_ms: default_duration_ms(),
            easing: default_easing(),
            params: serde_json::Value::Null,
        }
    }

    /// Set the duration.
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the easing name.
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = easing.into();
        self
    }

    /// Set the strategy parameters.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    /// Resolve strategy, easing and duration, rejecting anything the engine cannot run.
    pub fn resolve(&self) -> PlayerResult<ResolvedTransition> {
        let kind = parse_transition(self)?;
        let ease = Ease::from_name(&self.easing)?;
        if !(self.duration_ms.is_finite() && self.duration_ms >= 0.0) {
            return Err(PlayerError::validation(
                "transition duration_ms must be finite and >= 0",
            ));
        }
        Ok(ResolvedTransition {
            kind,
            duration_ms: self.duration_ms,
            ease,
        })
    }
}

/// Validated transition, ready to run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTransition {
    /// Strategy with its parameters.
    pub kind: TransitionKind,
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// Easing applied to raw progress.
    pub ease: Ease,
}

/// Edge a wipe starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WipeDir {
    /// Reveal grows rightwards.
    LeftToRight,
    /// Reveal grows leftwards.
    RightToLeft,
    /// Reveal grows downwards.
    TopToBottom,
    /// Reveal grows upwards.
    BottomToTop,
}

/// Direction content travels in a slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideDir {
    /// Incoming enters from the right.
    Left,
    /// Incoming enters from the left.
    Right,
    /// Incoming enters from the bottom.
    Up,
    /// Incoming enters from the top.
    Down,
}

impl SlideDir {
    /// Normalized offset of the incoming layer at progress `0`.
    pub fn entry_offset(self) -> Vec2 {
        match self {
            Self::Left => Vec2::new(1.0, 0.0),
            Self::Right => Vec2::new(-1.0, 0.0),
            Self::Up => Vec2::new(0.0, 1.0),
            Self::Down => Vec2::new(0.0, -1.0),
        }
    }
}

/// Built-in transition strategies.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionKind {
    /// Opacity swap.
    Crossfade,
    /// Both layers travel together.
    Slide {
        /// Travel direction.
        dir: SlideDir,
    },
    /// Incoming scales and fades in around `origin`.
    Zoom {
        /// Normalized scale origin.
        origin: Vec2,
        /// Incoming scale at progress `0`.
        from_scale: f64,
        /// Incoming scale at progress `1`.
        to_scale: f64,
    },
    /// Incoming is revealed by a moving edge.
    Wipe {
        /// Edge the reveal starts from.
        dir: WipeDir,
        /// Edge feather in `[0, 1]`.
        soft_edge: f64,
    },
    /// Incoming appears through a seeded noise threshold.
    Dissolve {
        /// Noise seed.
        seed: u64,
    },
    /// Blur peaks half-way while the layers crossfade.
    Blur {
        /// Peak blur radius in pixels.
        max_radius: f64,
    },
}

impl TransitionKind {
    /// Canonical strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Crossfade => "crossfade",
            Self::Slide { .. } => "slide",
            Self::Zoom { .. } => "zoom",
            Self::Wipe { .. } => "wipe",
            Self::Dissolve { .. } => "dissolve",
            Self::Blur { .. } => "blur",
        }
    }
}

type Params = serde_json::Map<String, serde_json::Value>;

/// Parse the strategy named by `desc` together with its parameters.
pub fn parse_transition(desc: &TransitionDescriptor) -> PlayerResult<TransitionKind> {
    let kind = desc.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(PlayerError::validation("transition kind must be non-empty"));
    }

    let empty = Params::new();
    let params = match &desc.params {
        serde_json::Value::Null => &empty,
        serde_json::Value::Object(map) => map,
        _ => {
            return Err(PlayerError::validation(format!(
                "{kind} params must be an object"
            )));
        }
    };

    match kind.as_str() {
        "crossfade" | "fade" => Ok(TransitionKind::Crossfade),
        "slide" => Ok(TransitionKind::Slide {
            dir: parse_slide_dir(str_param(params, "dir"))?,
        }),
        "zoom" => {
            let from_scale = number_param(params, "from_scale", 0.5)?;
            let to_scale = number_param(params, "to_scale", 1.0)?;
            if from_scale < 0.0 || to_scale < 0.0 {
                return Err(PlayerError::validation("zoom scales must be >= 0"));
            }
            let origin = match params.get("origin") {
                None => Vec2::new(0.5, 0.5),
                Some(v) => parse_vec2(v)
                    .ok_or_else(|| PlayerError::validation("zoom.origin must be [x, y] or {x, y}"))?,
            };
            Ok(TransitionKind::Zoom {
                origin,
                from_scale,
                to_scale,
            })
        }
        "wipe" => Ok(TransitionKind::Wipe {
            dir: parse_wipe_dir(str_param(params, "dir"))?,
            soft_edge: number_param(params, "soft_edge", 0.0)?.clamp(0.0, 1.0),
        }),
        "dissolve" => {
            let seed = match params.get("seed") {
                None => 0,
                Some(v) => v
                    .as_u64()
                    .ok_or_else(|| PlayerError::validation("dissolve.seed must be an unsigned integer"))?,
            };
            Ok(TransitionKind::Dissolve { seed })
        }
        "blur" => {
            let max_radius = number_param(params, "max_radius", 12.0)?;
            if max_radius < 0.0 {
                return Err(PlayerError::validation("blur.max_radius must be >= 0"));
            }
            Ok(TransitionKind::Blur { max_radius })
        }
        _ => Err(PlayerError::UnknownTransitionType(desc.kind.clone())),
    }
}

fn str_param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn number_param(params: &Params, key: &str, default: f64) -> PlayerResult<f64> {
    match params.get(key) {
        None => Ok(default),
        Some(v) => v
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| PlayerError::validation(format!("{key} must be a finite number"))),
    }
}

fn parse_wipe_dir(s: Option<&str>) -> PlayerResult<WipeDir> {
    let Some(s) = s else {
        return Ok(WipeDir::LeftToRight);
    };
    match s.trim().to_ascii_lowercase().as_str() {
        "left_to_right" | "lefttoright" | "ltr" => Ok(WipeDir::LeftToRight),
        "right_to_left" | "righttoleft" | "rtl" => Ok(WipeDir::RightToLeft),
        "top_to_bottom" | "toptobottom" | "ttb" => Ok(WipeDir::TopToBottom),
        "bottom_to_top" | "bottomtotop" | "btt" => Ok(WipeDir::BottomToTop),
        other => Err(PlayerError::validation(format!("unknown wipe.dir '{other}'"))),
    }
}

fn parse_slide_dir(s: Option<&str>) -> PlayerResult<SlideDir> {
    let Some(s) = s else {
        return Ok(SlideDir::Left);
    };
    match s.trim().to_ascii_lowercase().as_str() {
        "left" => Ok(SlideDir::Left),
        "right" => Ok(SlideDir::Right),
        "up" => Ok(SlideDir::Up),
        "down" => Ok(SlideDir::Down),
        other => Err(PlayerError::validation(format!("unknown slide.dir '{other}'"))),
    }
}

fn parse_vec2(v: &serde_json::Value) -> Option<Vec2> {
    if let Some(arr) = v.as_array()
        && arr.len() == 2
    {
        return Some(Vec2::new(arr[0].as_f64()?, arr[1].as_f64()?));
    }
    let obj = v.as_object()?;
    Some(Vec2::new(obj.get("x")?.as_f64()?, obj.get("y")?.as_f64()?))
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/descriptor.rs"]
mod tests;
