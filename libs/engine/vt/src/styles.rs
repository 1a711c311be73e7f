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
use cartocss::Color;
use gpu::CompOp;
use std::sync::Arc;

use crate::view_state::ViewState;

/// A function of the current view's zoom level, shared cheaply across the
/// style parameter slots that reference it (many features in a tile use
/// the same translated symbolizer).
pub type FloatFunction = Arc<dyn Fn(&ViewState) -> f32 + Send + Sync>;
pub type ColorFunction = Arc<dyn Fn(&ViewState) -> Color + Send + Sync>;

pub fn constant_float(v: f32) -> FloatFunction {
    Arc::new(move |_| v)
}

pub fn constant_color(c: Color) -> ColorFunction {
    Arc::new(move |_| c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOrientation {
    Point,
    PointFlipping,
    Billboard2D,
    Billboard3D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrientation {
    Point,
    PointFlipping,
    Billboard2D,
    Billboard3D,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoinMode {
    Miter,
    Bevel,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCapMode {
    Butt,
    Square,
    Round,
}

/// One style slot: a zoom-dependent color/opacity/width, shared by up to
/// 16 features packed into the same `TileGeometry`.
#[derive(Clone)]
pub struct StyleSlot {
    pub color: ColorFunction,
    pub opacity: FloatFunction,
    pub width: FloatFunction,
}

impl StyleSlot {
    pub fn solid(color: Color) -> Self {
        Self {
            color: constant_color(color),
            opacity: constant_float(1.0),
            width: constant_float(1.0),
        }
    }
}

pub const MAX_STYLE_SLOTS: usize = 16;

/// Per-`TileGeometry` parameters needed to draw it: up to 16 style slots,
/// an optional pattern bitmap reference, an optional 2D transform, the
/// composition operator, and a point-orientation mode. Shared by all
/// primitive kinds; unused fields are simply ignored by the shader chosen
/// for a given primitive.
#[derive(Clone)]
pub struct StyleParameters {
    pub slots: smallvec::SmallVec<[StyleSlot; MAX_STYLE_SLOTS]>,
    pub pattern: Option<u32>,
    pub transform: Option<[[f32; 3]; 3]>,
    pub comp_op: CompOp,
    pub point_orientation: PointOrientation,
}

impl StyleParameters {
    pub fn is_compatible_with(&self, other: &StyleParameters) -> bool {
        self.pattern == other.pattern
            && self.transform == other.transform
            && self.comp_op == other.comp_op
            && self.point_orientation == other.point_orientation
            && self.slots.len() + 1 <= MAX_STYLE_SLOTS
    }
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            slots: smallvec::SmallVec::new(),
            pattern: None,
            transform: None,
            comp_op: CompOp::SrcOver,
            point_orientation: PointOrientation::Point,
        }
    }
}

#[derive(Clone)]
pub struct PointStyle {
    pub style: StyleSlot,
    pub orientation: PointOrientation,
}

#[derive(Clone)]
pub struct LineStyle {
    pub style: StyleSlot,
    pub join: LineJoinMode,
    pub cap: LineCapMode,
    pub dash_pattern: Option<u32>,
}

#[derive(Clone)]
pub struct PolygonStyle {
    pub style: StyleSlot,
    pub pattern: Option<u32>,
}

#[derive(Clone)]
pub struct Polygon3DStyle {
    pub style: StyleSlot,
    pub height: FloatFunction,
}

#[derive(Clone)]
pub struct TextLabelStyle {
    pub color: ColorFunction,
    pub size: FloatFunction,
    pub orientation: LabelOrientation,
}

#[derive(Clone)]
pub struct BitmapLabelStyle {
    pub scale: FloatFunction,
    pub orientation: LabelOrientation,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_style_parameters_compatible_when_identical_except_slots() {
        let mut a = StyleParameters::default();
        a.slots.push(StyleSlot::solid(Color::from_rgba(1., 0., 0., 1.)));
        let b = StyleParameters::default();
        assert!(a.is_compatible_with(&b));
    }

    #[test]
    fn test_style_parameters_incompatible_on_comp_op() {
        let a = StyleParameters::default();
        let mut b = StyleParameters::default();
        b.comp_op = CompOp::Multiply;
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_style_parameters_full_slots_incompatible() {
        let mut a = StyleParameters::default();
        for _ in 0..MAX_STYLE_SLOTS {
            a.slots.push(StyleSlot::solid(Color::from_rgba(0., 0., 0., 1.)));
        }
        let b = StyleParameters::default();
        assert!(!a.is_compatible_with(&b));
    }
}
