use crate::foundation::core::lerp_f64;

/// Straight (non-premultiplied) RGBA color with channels normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Rgba {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Rgba {
    /// Build a color from normalized channels.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    ///
    /// Functional notation takes 0–255 channels (or percentages) and a 0–1 alpha, as in CSS.
    /// Returns `None` when `s` is not a color, so callers can fall back to other value kinds.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        let (args, has_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = lower.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };
        parse_functional(args, has_alpha)
    }

    /// Per-channel interpolation, exact at both ends.
    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            r: lerp_f64(a.r, b.r, t),
            g: lerp_f64(a.g, b.g, t),
            b: lerp_f64(a.b, b.b, t),
            a: lerp_f64(a.a, b.a, t),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let (r, g, b, a) = (to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a));
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

fn parse_hex(s: &str) -> Option<Rgba> {
    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }
    fn byte(pair: &[u8]) -> Option<u8> {
        Some(nibble(pair[0])? * 16 + nibble(pair[1])?)
    }

    let bytes = s.as_bytes();
    let (r, g, b, a) = match bytes.len() {
        3 | 4 => {
            let short = |i: usize| nibble(bytes[i]).map(|n| n * 17);
            let a = if bytes.len() == 4 { short(3)? } else { 255 };
            (short(0)?, short(1)?, short(2)?, a)
        }
        6 | 8 => {
            let a = if bytes.len() == 8 {
                byte(&bytes[6..8])?
            } else {
                255
            };
            (byte(&bytes[0..2])?, byte(&bytes[2..4])?, byte(&bytes[4..6])?, a)
        }
        _ => return None,
    };

    Some(Rgba::new(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn parse_functional(args: &str, has_alpha: bool) -> Option<Rgba> {
    fn channel(s: &str) -> Option<f64> {
        let v = match s.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
            None => s.parse::<f64>().ok()? / 255.0,
        };
        v.is_finite().then(|| v.clamp(0.0, 1.0))
    }

    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let a = if has_alpha {
        let a = parts[3].parse::<f64>().ok()?;
        if !a.is_finite() {
            return None;
        }
        a.clamp(0.0, 1.0)
    } else {
        1.0
    };
    Some(Rgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/color.rs"]
mod tests;
