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
use crate::tile::SharedTile;
use crate::tile_id::TileId;
use std::collections::HashMap;

/// A full fade takes ~0.4s: `blend` advances by `dt * BLEND_RATE` each
/// frame and a node whose blend reaches 1 discards its children.
pub const BLEND_RATE: f32 = 1.0 / 0.4;

/// One tile's fade state, plus the subtree of tiles it is in the process
/// of replacing. Children fade out as the parent fades in.
pub struct BlendNode {
    pub tile_id: TileId,
    pub tile: SharedTile,
    pub blend: f32,
    pub children: Vec<BlendNode>,
}

impl BlendNode {
    pub fn fresh(tile_id: TileId, tile: SharedTile, snap_opaque: bool) -> Self {
        Self {
            tile_id,
            tile,
            blend: if snap_opaque { 1.0 } else { 0.0 },
            children: Vec::new(),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.blend = (self.blend + dt * BLEND_RATE).min(1.0);
        if self.blend >= 1.0 {
            self.children.clear();
        } else {
            for child in &mut self.children {
                child.advance(dt);
            }
        }
    }

    pub fn any_animating(&self) -> bool {
        self.blend < 1.0 || self.children.iter().any(BlendNode::any_animating)
    }
}

/// `min(1, w*node.blend + sum(child_opacity(w*(1-node.blend))))` — the
/// effective opacity of a subtree once folded into a single node, used
/// both to collapse a displaced node's history and to flatten the tree
/// into render nodes.
pub fn calculate_blend_node_opacity(node: &BlendNode, w: f32) -> f32 {
    let own = w * node.blend;
    let children: f32 = node
        .children
        .iter()
        .map(|c| calculate_blend_node_opacity(c, w * (1.0 - node.blend)))
        .sum();
    (own + children).min(1.0)
}

#[derive(Debug, Clone, Copy)]
pub struct RenderNode {
    pub tile_id: TileId,
    pub layer_index: u32,
    pub effective_blend: f32,
}

/// The renderer's forest of `BlendNode`s, one root per tile visible in the
/// last frame. `set_visible_tiles` mutates this tree; `start_frame`
/// snapshots it into a separate tree so in-progress draw passes see a
/// stable view even if a worker thread calls `set_visible_tiles` mid-frame.
#[derive(Default)]
pub struct BlendTree {
    pub roots: Vec<BlendNode>,
}

impl BlendTree {
    pub fn set_visible_tiles(&mut self, tiles: &[(TileId, SharedTile)], blend: bool) {
        let mut previous = std::mem::take(&mut self.roots);
        let mut new_roots = Vec::with_capacity(tiles.len());

        for (tile_id, tile) in tiles {
            if let Some(idx) = previous
                .iter()
                .position(|n| n.tile_id == *tile_id && std::sync::Arc::ptr_eq(&n.tile, tile))
            {
                new_roots.push(previous.remove(idx));
                continue;
            }
            let mut node = BlendNode::fresh(*tile_id, tile.clone(), !blend);
            let mut i = 0;
            while i < previous.len() {
                if previous[i].tile_id.intersects(*tile_id) && previous[i].tile_id != *tile_id {
                    let mut displaced = previous.remove(i);
                    let opacity = calculate_blend_node_opacity(&displaced, 1.0);
                    displaced.children.clear();
                    displaced.blend = opacity;
                    node.children.push(displaced);
                } else {
                    i += 1;
                }
            }
            new_roots.push(node);
        }
        self.roots = new_roots;
    }

    pub fn advance(&mut self, dt: f32) {
        for root in &mut self.roots {
            root.advance(dt);
        }
    }

    pub fn any_animating(&self) -> bool {
        self.roots.iter().any(BlendNode::any_animating)
    }

    /// Snapshot used by `start_frame`: a shallow HashMap keyed by tile id
    /// so render passes don't need to walk the live mutable tree.
    pub fn build_render_nodes(&self, layer_index: u32) -> Vec<RenderNode> {
        let mut out = Vec::new();
        for root in &self.roots {
            collect(root, layer_index, 1.0, &mut out);
        }
        out
    }
}

fn collect(node: &BlendNode, layer_index: u32, w: f32, out: &mut Vec<RenderNode>) {
    out.push(RenderNode {
        tile_id: node.tile_id,
        layer_index,
        effective_blend: (w * node.blend).min(1.0),
    });
    for child in &node.children {
        collect(child, layer_index, w * (1.0 - node.blend), out);
    }
}

#[derive(Default)]
pub struct BlendForest {
    pub per_layer: HashMap<u32, BlendTree>,
}
