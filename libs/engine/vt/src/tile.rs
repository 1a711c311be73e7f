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
use crate::tile_id::TileId;
use crate::tile_layer::TileLayer;
use std::sync::Arc;

/// A fully built tile: already-tessellated geometry, bitmaps, and labels
/// for each of its layers. Shared between the caller (who produced it) and
/// the renderer (which retains it across frames as part of the blend
/// tree), hence the `Arc`.
pub struct Tile {
    pub id: TileId,
    pub layers: Vec<TileLayer>,
}

pub type SharedTile = Arc<Tile>;

impl Tile {
    pub fn new(id: TileId, layers: Vec<TileLayer>) -> SharedTile {
        Arc::new(Self { id, layers })
    }
}
