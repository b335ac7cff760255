use std::{fmt, sync::Arc};

use serde::ser::SerializeMap;

use crate::{
    animation::color::Rgba,
    foundation::{
        core::{lerp_f64, unit_clamp},
        error::TrackError,
    },
};

/// Value produced by sampling a compiled track.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackValue {
    /// Numeric property.
    Number(f64),
    /// Color property.
    Color(Rgba),
    /// Discrete string property.
    Text(Arc<str>),
    /// Discrete boolean property.
    Bool(bool),
    /// Object property, one entry per field.
    Record(Vec<(Arc<str>, TrackValue)>),
}

/// Kind of value a track interpolates, fixed at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Linear numeric interpolation.
    Number,
    /// Per-channel color interpolation.
    Color,
    /// Discrete string flip at the half-way mark.
    Text,
    /// Discrete boolean flip at the half-way mark.
    Bool,
    /// Field-wise interpolation of an object.
    Record,
}

impl ValueKind {
    /// Lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Color => "color",
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Record => "record",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TrackValue {
    /// Kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Color(_) => ValueKind::Color,
            Self::Text(_) => ValueKind::Text,
            Self::Bool(_) => ValueKind::Bool,
            Self::Record(_) => ValueKind::Record,
        }
    }

    /// Numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Color payload, if this is a color.
    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// String payload, if this is a discrete string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&TrackValue> {
        match self {
            Self::Record(fields) => fields.iter().find(|(k, _)| &**k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl serde::Serialize for TrackValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::Color(c) => serializer.serialize_str(&c.to_hex()),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(&**k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Interpolation strategy resolved once from a pair of declared values.
#[derive(Clone, Debug)]
pub(crate) enum Interp {
    Number { from: f64, to: f64 },
    Color { from: Rgba, to: Rgba },
    Discrete { from: TrackValue, to: TrackValue },
    Record(Vec<(Arc<str>, Interp)>),
}

enum Declared {
    Number(f64),
    Color(Rgba),
    Text(Arc<str>),
    Bool(bool),
    Record(serde_json::Map<String, serde_json::Value>),
}

impl Declared {
    fn classify(value: &serde_json::Value) -> Result<Self, TrackError> {
        use serde_json::Value;

        match value {
            Value::Number(n) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .map(Self::Number)
                .ok_or_else(|| TrackError::UnsupportedValue(format!("number {n}"))),
            Value::String(s) => Ok(match Rgba::parse(s) {
                Some(c) => Self::Color(c),
                None => Self::Text(Arc::from(s.as_str())),
            }),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Object(map) => Ok(Self::Record(map.clone())),
            Value::Array(_) => Err(TrackError::UnsupportedValue("array".to_owned())),
            Value::Null => Err(TrackError::UnsupportedValue("null".to_owned())),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Color(_) => "color",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Record(_) => "record",
        }
    }
}

impl Interp {
    /// Resolve how to move from `from` to `to`.
    pub(crate) fn between(
        from: &serde_json::Value,
        to: &serde_json::Value,
    ) -> Result<Self, TrackError> {
        let a = Declared::classify(from)?;
        let b = Declared::classify(to)?;
        Ok(match (a, b) {
            (Declared::Number(from), Declared::Number(to)) => Self::Number { from, to },
            (Declared::Color(from), Declared::Color(to)) => Self::Color { from, to },
            (Declared::Bool(from), Declared::Bool(to)) => Self::Discrete {
                from: TrackValue::Bool(from),
                to: TrackValue::Bool(to),
            },
            // Strings that are not both colors flip discretely, keeping their declared text.
            (
                Declared::Text(_) | Declared::Color(_),
                Declared::Text(_) | Declared::Color(_),
            ) => Self::Discrete {
                from: TrackValue::Text(text_of(from)),
                to: TrackValue::Text(text_of(to)),
            },
            (Declared::Record(from), Declared::Record(to)) => Self::record(&from, &to)?,
            (a, b) => {
                return Err(TrackError::MismatchedValues {
                    from: a.kind_name(),
                    to: b.kind_name(),
                });
            }
        })
    }

    /// A value that never changes.
    pub(crate) fn constant(value: &serde_json::Value) -> Result<Self, TrackError> {
        Self::between(value, value)
    }

    fn record(
        from: &serde_json::Map<String, serde_json::Value>,
        to: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, TrackError> {
        let mut fields = Vec::with_capacity(from.len().max(to.len()));
        for (key, a) in from {
            let interp = match to.get(key) {
                Some(b) => Self::between(a, b)?,
                None => Self::constant(a)?,
            };
            fields.push((Arc::from(key.as_str()), interp));
        }
        for (key, b) in to {
            if !from.contains_key(key) {
                fields.push((Arc::from(key.as_str()), Self::constant(b)?));
            }
        }
        Ok(Self::Record(fields))
    }

    pub(crate) fn kind(&self) -> ValueKind {
        match self {
            Self::Number { .. } => ValueKind::Number,
            Self::Color { .. } => ValueKind::Color,
            Self::Discrete { from, .. } => from.kind(),
            Self::Record(_) => ValueKind::Record,
        }
    }

    /// Value at eased progress `t`. Numbers follow overshooting easings; colors stay in gamut.
    pub(crate) fn at(&self, t: f64) -> TrackValue {
        match self {
            Self::Number { from, to } => TrackValue::Number(lerp_f64(*from, *to, t)),
            Self::Color { from, to } => TrackValue::Color(Rgba::lerp(from, to, unit_clamp(t))),
            Self::Discrete { from, to } => {
                if t >= 0.5 {
                    to.clone()
                } else {
                    from.clone()
                }
            }
            Self::Record(fields) => TrackValue::Record(
                fields
                    .iter()
                    .map(|(k, interp)| (Arc::clone(k), interp.at(t)))
                    .collect(),
            ),
        }
    }
}

fn text_of(value: &serde_json::Value) -> Arc<str> {
    Arc::from(value.as_str().unwrap_or_default())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/value.rs"]
mod tests;
