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
//! Tile geometry, label placement, and the GPU-agnostic rendering core for
//! styled vector tiles: `cartocss`-compiled styles go in, tessellated
//! `TileLayer`s and per-frame draw passes come out.

mod bitmap;
mod bitmap_canvas;
mod bitmap_manager;
mod blend_tree;
mod glyph_map;
mod renderer;
mod stroke_map;
mod styles;
mod tile;
mod tile_geometry;
mod tile_id;
mod tile_label;
mod tile_label_culler;
mod tile_layer;
mod tile_layer_builder;
mod view_state;

pub use bitmap::{BitmapFormat, TileBitmap};
pub use bitmap_canvas::BitmapCanvas;
pub use bitmap_manager::{next_pot, BitmapManager};
pub use blend_tree::{
    calculate_blend_node_opacity, BlendForest, BlendNode, BlendTree, RenderNode, BLEND_RATE,
};
pub use glyph_map::{GlyphId, GlyphMap, GlyphMetrics, GlyphRect};
pub use renderer::{IntersectionHit, TileRenderer};
pub use stroke_map::{StrokeId, StrokeMap, StrokeRow};
pub use styles::{
    constant_color, constant_float, BitmapLabelStyle, ColorFunction, FloatFunction, LineCapMode,
    LineJoinMode, LineStyle, PointOrientation, PointStyle, Polygon3DStyle, PolygonStyle,
    StyleParameters, StyleSlot, TextLabelStyle, LabelOrientation, MAX_STYLE_SLOTS,
};
pub use tile::{SharedTile, Tile};
pub use tile_geometry::{GeometryLayoutParameters, IdRuns, PrimitiveKind, TileGeometry};
pub use tile_id::TileId;
pub use tile_label::{
    LabelGeometry, LabelState, LabelStyle, Placement, PlacedGlyph, TileLabel,
};
pub use tile_label_culler::{
    envelopes_overlap, line_placement_weight, longest_valid_run, midpoint, Envelope,
    LabelCandidate, LabelCuller, GRID_RESOLUTION,
};
pub use tile_layer::TileLayer;
pub use tile_layer_builder::{TileLayerBuilder, MAX_VERTICES_PER_BATCH};
pub use view_state::ViewState;
