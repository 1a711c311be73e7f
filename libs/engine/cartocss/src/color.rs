// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.
use std::fmt;

/// Non-premultiplied RGBA color, channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color {
        r: 0.,
        g: 0.,
        b: 0.,
        a: 0.,
    };

    pub fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_argb_u32(argb: u32) -> Self {
        let a = ((argb >> 24) & 0xFF) as f32 / 255.0;
        let r = ((argb >> 16) & 0xFF) as f32 / 255.0;
        let g = ((argb >> 8) & 0xFF) as f32 / 255.0;
        let b = (argb & 0xFF) as f32 / 255.0;
        Self { r, g, b, a }
    }

    pub fn to_argb_u32(self) -> u32 {
        let a = (self.a.clamp(0., 1.) * 255.0).round() as u32;
        let r = (self.r.clamp(0., 1.) * 255.0).round() as u32;
        let g = (self.g.clamp(0., 1.) * 255.0).round() as u32;
        let b = (self.b.clamp(0., 1.) * 255.0).round() as u32;
        (a << 24) | (r << 16) | (g << 8) | b
    }

    /// Parse a CSS color literal (`#rrggbb`, `rgb(...)`, named colors, ...).
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let c = csscolorparser::parse(text)?;
        Ok(Self {
            r: c.r as f32,
            g: c.g as f32,
            b: c.b as f32,
            a: c.a as f32,
        })
    }

    fn to_hsla(self) -> (f32, f32, f32, f32) {
        let (r, g, b) = (self.r, self.g, self.b);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if (max - min).abs() < f32::EPSILON {
            return (0.0, 0.0, l, self.a);
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if (max - r).abs() < f32::EPSILON {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if (max - g).abs() < f32::EPSILON {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        } / 6.0;
        (h, s, l, self.a)
    }

    fn from_hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        if s.abs() < f32::EPSILON {
            return Self::from_rgba(l, l, l, a);
        }
        fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
        let g = hue_to_rgb(p, q, h);
        let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
        Self::from_rgba(r, g, b, a)
    }

    /// `mix(c1, c2, weight)`; `weight` (`[0,1]`) is how much of `self`
    /// survives. Weighted by the alpha difference between the two colors,
    /// same as the original's `mix()`: a fully-transparent `other` should
    /// not dilute `self`'s alpha just because `weight` is 0.5.
    pub fn mix(self, other: Color, weight: f32) -> Color {
        let p = weight.clamp(0.0, 1.0);
        let w = p * 2.0 - 1.0;
        let delta_a = self.a - other.a;
        let weighted = if w * delta_a == -1.0 {
            w
        } else {
            (w + delta_a) / (1.0 + w * delta_a)
        };
        let w1 = (weighted + 1.0) / 2.0;
        let w2 = 1.0 - w1;
        Color::from_rgba(
            self.r * w1 + other.r * w2,
            self.g * w1 + other.g * w2,
            self.b * w1 + other.b * w2,
            self.a * p + other.a * (1.0 - p),
        )
    }

    /// `lighten(c, amount)`; `amount` is additive, clamped to `[0,1]`.
    /// `darken(c, amount)` is defined as `lighten(c, -amount)`.
    pub fn lighten(self, amount: f32) -> Color {
        let (h, s, l, a) = self.to_hsla();
        Color::from_hsla(h, s, (l + amount).clamp(0.0, 1.0), a)
    }

    /// `saturate(c, amount)`; additive, clamped to `[0,1]`.
    /// `desaturate(c, amount)` is `saturate(c, -amount)`.
    pub fn saturate(self, amount: f32) -> Color {
        let (h, s, l, a) = self.to_hsla();
        Color::from_hsla(h, (s + amount).clamp(0.0, 1.0), l, a)
    }

    /// `fadein(c, amount)`; additive, clamped to `[0,1]`.
    /// `fadeout(c, amount)` is `fade(c, -amount)`.
    pub fn fade(self, amount: f32) -> Color {
        Color::from_rgba(self.r, self.g, self.b, (self.a + amount).clamp(0.0, 1.0))
    }

    pub fn add(self, other: Color) -> Color {
        Color::from_rgba(
            self.r + other.r,
            self.g + other.g,
            self.b + other.b,
            self.a + other.a,
        )
    }

    pub fn sub(self, other: Color) -> Color {
        Color::from_rgba(
            self.r - other.r,
            self.g - other.g,
            self.b - other.b,
            self.a - other.a,
        )
    }

    pub fn scale(self, k: f32) -> Color {
        Color::from_rgba(self.r * k, self.g * k, self.b * k, self.a * k)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.to_argb_u32())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_argb_round_trip() {
        let c = Color::from_rgba(1.0, 0.5, 0.0, 1.0);
        let round = Color::from_argb_u32(c.to_argb_u32());
        assert!((c.r - round.r).abs() < 0.01);
        assert!((c.g - round.g).abs() < 0.01);
        assert!((c.b - round.b).abs() < 0.01);
    }

    #[test]
    fn test_darken_is_negative_lighten() {
        let c = Color::from_rgba(0.5, 0.5, 0.5, 1.0);
        // darken(c, amount) must equal lighten(c, -amount) exactly, per original source.
        let darken = |c: Color, amount: f32| c.lighten(-amount);
        assert_eq!(darken(c, 0.1), c.lighten(-0.1));
    }

    #[test]
    fn test_mix_full_weight_returns_first() {
        let a = Color::from_rgba(1.0, 0.0, 0.0, 1.0);
        let b = Color::from_rgba(0.0, 1.0, 0.0, 1.0);
        assert_eq!(a.mix(b, 1.0), a);
        assert_eq!(a.mix(b, 0.0), b);
    }

    #[test]
    fn test_mix_even_weight_averages_equal_alpha_colors() {
        let a = Color::from_rgba(1.0, 0.0, 0.0, 1.0);
        let b = Color::from_rgba(0.0, 1.0, 0.0, 1.0);
        let m = a.mix(b, 0.5);
        assert!((m.r - 0.5).abs() < 1e-6);
        assert!((m.g - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fadeout_is_negative_fade() {
        let c = Color::from_rgba(1.0, 1.0, 1.0, 1.0);
        assert!((c.fade(-0.5).a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_lighten_amount_is_additive_not_percentage() {
        let c = Color::from_rgba(0.2, 0.2, 0.2, 1.0);
        let (_, _, l0, _) = c.to_hsla();
        let (_, _, l1, _) = c.lighten(0.1).to_hsla();
        assert!((l1 - l0 - 0.1).abs() < 1e-6);
    }
}
