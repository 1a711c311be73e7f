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
use crate::styles::LabelOrientation;
use crate::tile_id::TileId;
use nalgebra::Point2;

#[derive(Debug, Clone, Copy)]
pub struct PlacedGlyph {
    pub offset: (f32, f32),
    pub size: (f32, f32),
    pub advance: f32,
}

/// What the label must be placed against: a fixed anchor (point symbols),
/// a polyline to follow (line labels), or both (a label that tries line
/// placement first and falls back to its anchor).
#[derive(Debug, Clone)]
pub enum LabelGeometry {
    Anchor(Point2<f64>),
    Polyline(Vec<Point2<f64>>),
    AnchorAndPolyline(Point2<f64>, Vec<Point2<f64>>),
}

#[derive(Debug, Clone)]
pub struct LabelStyle {
    pub orientation: LabelOrientation,
    pub priority: u32,
}

/// Immutable identity plus precomputed content for one label. Placement
/// (where it currently sits, whether it's visible, its fade opacity) is
/// tracked separately in `LabelState`, keyed by `(layer_index, global_id)`,
/// so it survives a label's owning `Tile` being replaced across frames.
#[derive(Clone)]
pub struct TileLabel {
    pub tile_id: TileId,
    pub local_id: u32,
    pub global_id: u64,
    pub group_id: u32,
    pub glyphs: Vec<PlacedGlyph>,
    pub geometry: LabelGeometry,
    pub style: LabelStyle,
}

impl TileLabel {
    pub fn key(&self, layer_index: u32) -> (u32, u64) {
        (layer_index, self.global_id)
    }
}

/// Mutable, frame-to-frame placement state for one label identity. Opacity
/// persists across frames (spec: "a visible label's opacity is advanced by
/// dt toward 1; an invisible label's toward 0"), so labels fade rather than
/// pop in and out.
#[derive(Debug, Clone)]
pub struct LabelState {
    pub visible: bool,
    pub opacity: f32,
    pub placement: Option<Placement>,
    pub flipped: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub screen_position: (f32, f32),
    pub axis_x: (f32, f32),
    pub axis_y: (f32, f32),
}

impl Default for LabelState {
    fn default() -> Self {
        Self {
            visible: false,
            opacity: 0.0,
            placement: None,
            flipped: false,
        }
    }
}

impl LabelState {
    /// Advance opacity toward its visibility target; never overshoots.
    pub fn advance(&mut self, dt: f32) {
        let target = if self.visible { 1.0 } else { 0.0 };
        if self.opacity < target {
            self.opacity = (self.opacity + dt).min(target);
        } else if self.opacity > target {
            self.opacity = (self.opacity - dt).max(target);
        }
    }

    pub fn is_discardable(&self) -> bool {
        !self.visible && self.opacity <= 0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_opacity_advances_toward_visible() {
        let mut state = LabelState {
            visible: true,
            opacity: 0.2,
            placement: None,
            flipped: false,
        };
        state.advance(0.5);
        assert!((state.opacity - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_opacity_never_overshoots_target() {
        let mut state = LabelState {
            visible: true,
            opacity: 0.9,
            placement: None,
            flipped: false,
        };
        state.advance(0.5);
        assert_eq!(state.opacity, 1.0);
    }

    #[test]
    fn test_label_persistence_opacity_monotone_while_visible() {
        let mut state = LabelState::default();
        state.visible = true;
        let before = state.opacity;
        state.advance(0.1);
        assert!(state.opacity >= before);
    }

    #[test]
    fn test_discardable_only_when_invisible_and_faded() {
        let mut state = LabelState::default();
        assert!(state.is_discardable());
        state.opacity = 0.1;
        assert!(!state.is_discardable());
    }
}
