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
use crate::bitmap::TileBitmap;
use crate::styles::FloatFunction;
use crate::tile_geometry::TileGeometry;
use crate::tile_label::TileLabel;
use gpu::CompOp;

/// One layer within a `Tile`: its draw-order index (from the map
/// descriptor's `layers` list), an opacity function, an optional
/// composition operator requiring offscreen compositing, and the
/// geometries/bitmaps/labels `TileLayerBuilder` produced for it.
pub struct TileLayer {
    pub layer_index: u32,
    pub opacity: FloatFunction,
    pub comp_op: Option<CompOp>,
    pub bitmaps: Vec<TileBitmap>,
    pub geometries: Vec<TileGeometry>,
    pub labels: Vec<TileLabel>,
}

impl TileLayer {
    pub fn requires_offscreen(&self) -> bool {
        self.comp_op.is_some()
    }
}
