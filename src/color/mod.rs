//! Linear RGBA colours and HSV adjustments.

pub mod palette;

pub use palette::ColorPalette;

use serde::{Deserialize, Serialize};

use crate::easing;

/// A linear RGBA colour. Channels are not clamped: alpha above 1 drives
/// extra glow and HDR emission values exceed 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "Rgba::opaque")]
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    fn opaque() -> f32 {
        1.0
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Component-wise interpolation, `t` clamped to `[0.0, 1.0]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        Self {
            r: easing::lerp(self.r, other.r, t),
            g: easing::lerp(self.g, other.g, t),
            b: easing::lerp(self.b, other.b, t),
            a: easing::lerp(self.a, other.a, t),
        }
    }

    /// Hue in `[0, 1)`, saturation and value of the RGB part.
    pub fn to_hsv(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;

        let v = max;
        if max <= 0.0 || delta <= 0.0 {
            return (0.0, 0.0, v.max(0.0));
        }
        let s = delta / max;

        let h = if self.r >= max {
            (self.g - self.b) / delta
        } else if self.g >= max {
            2.0 + (self.b - self.r) / delta
        } else {
            4.0 + (self.r - self.g) / delta
        };
        let h = (h / 6.0).rem_euclid(1.0);
        (h, s, v)
    }

    /// Build a colour from HSV. `v` may exceed 1 for HDR output.
    pub fn from_hsv(h: f32, s: f32, v: f32, a: f32) -> Self {
        let s = s.clamp(0.0, 1.0);
        if s <= 0.0 {
            return Self::new(v, v, v, a);
        }
        let h6 = h.rem_euclid(1.0) * 6.0;
        let sector = h6.floor();
        let f = h6 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::new(r, g, b, a)
    }

    /// Keep hue and value, scale saturation by `factor`, clamp alpha into `[0, 1]`.
    pub fn desaturate(self, factor: f32) -> Self {
        let (h, s, v) = self.to_hsv();
        Self::from_hsv(h, s * factor, v, self.a.clamp(0.0, 1.0))
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}
