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
use crate::styles::{FloatFunction, StyleParameters};
use crate::tile_geometry::{GeometryLayoutParameters, IdRuns, PrimitiveKind, TileGeometry};
use crate::tile_label::TileLabel;
use crate::tile_layer::TileLayer;
use gpu::CompOp;
use log::debug;

/// Maximum distinct vertex indices per `TileGeometry` (spec §4.8, §8
/// "vertex budget"): a 16-bit index buffer can address at most this many.
pub const MAX_VERTICES_PER_BATCH: usize = 65536;

struct InProgress {
    kind: PrimitiveKind,
    style: StyleParameters,
    layout: GeometryLayoutParameters,
    vertices: Vec<u8>,
    indices: Vec<u16>,
    ids: IdRuns,
}

/// Accumulates features into tessellated `TileGeometry` batches. Callers
/// push raw triangle data through `push_triangle`/`push_quad` after doing
/// their own tessellation (polygon odd-winding tessellation, line
/// miter/bevel joins, point quad generation); this builder's job is purely
/// the batching/flush/id-run contract described in spec §4.8.
pub struct TileLayerBuilder {
    layer_index: u32,
    opacity: FloatFunction,
    comp_op: Option<CompOp>,
    finished: Vec<TileGeometry>,
    labels: Vec<TileLabel>,
    current: Option<InProgress>,
}

impl TileLayerBuilder {
    pub fn new(layer_index: u32, opacity: FloatFunction, comp_op: Option<CompOp>) -> Self {
        Self {
            layer_index,
            opacity,
            comp_op,
            finished: Vec::new(),
            labels: Vec::new(),
            current: None,
        }
    }

    /// Starts (or continues, if compatible) a geometry batch for one
    /// feature and appends its triangle data. `vertex_bytes` must already
    /// match `layout.stride`; `local_indices` are relative to this call's
    /// own vertices (the builder offsets them when appending).
    pub fn add_feature(
        &mut self,
        id: u64,
        kind: PrimitiveKind,
        style: StyleParameters,
        layout: GeometryLayoutParameters,
        vertex_bytes: &[u8],
        local_indices: &[u16],
    ) {
        let needs_flush = match &self.current {
            None => false,
            Some(cur) => {
                cur.kind != kind
                    || !cur.style.is_compatible_with(&style)
                    || cur.vertices.len() / cur.layout.stride as usize + vertex_bytes.len()
                        / layout.stride as usize
                        > MAX_VERTICES_PER_BATCH
            }
        };
        if needs_flush {
            self.flush();
        }
        if self.current.is_none() {
            debug!("tile layer builder starting new {:?} batch", kind);
            self.current = Some(InProgress {
                kind,
                style,
                layout,
                vertices: Vec::new(),
                indices: Vec::new(),
                ids: IdRuns::default(),
            });
        }
        let cur = self.current.as_mut().unwrap();
        let base_vertex = (cur.vertices.len() / cur.layout.stride as usize) as u16;
        cur.vertices.extend_from_slice(vertex_bytes);
        cur.indices.extend(local_indices.iter().map(|i| i + base_vertex));
        cur.ids.push_run((local_indices.len() / 3) as u32, id);
    }

    pub fn add_label(&mut self, label: TileLabel) {
        self.labels.push(label);
    }

    fn flush(&mut self) {
        if let Some(cur) = self.current.take() {
            self.finished.push(TileGeometry {
                kind: cur.kind,
                vertices: cur.vertices,
                indices: cur.indices,
                ids: cur.ids,
                style: cur.style,
                layout: cur.layout,
            });
        }
    }

    /// Finalizes any in-progress geometry, assigns every label's priority
    /// to the enclosing layer index, and returns the finished `TileLayer`.
    pub fn build(mut self) -> TileLayer {
        self.flush();
        for label in &mut self.labels {
            label.style.priority = self.layer_index;
        }
        TileLayer {
            layer_index: self.layer_index,
            opacity: self.opacity,
            comp_op: self.comp_op,
            bitmaps: Vec::new(),
            geometries: self.finished,
            labels: self.labels,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::styles::constant_float;

    fn quad(stride: u32) -> (Vec<u8>, Vec<u16>) {
        (vec![0u8; stride as usize * 4], vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_compatible_features_accumulate_into_one_geometry() {
        let mut builder = TileLayerBuilder::new(0, constant_float(1.0), None);
        let layout = GeometryLayoutParameters::for_fields(false, false, false);
        let (verts, idx) = quad(layout.stride);
        builder.add_feature(1, PrimitiveKind::Polygon, StyleParameters::default(), layout, &verts, &idx);
        builder.add_feature(2, PrimitiveKind::Polygon, StyleParameters::default(), layout, &verts, &idx);
        let layer = builder.build();
        assert_eq!(layer.geometries.len(), 1);
        assert_eq!(layer.geometries[0].triangle_count(), 4);
    }

    #[test]
    fn test_incompatible_style_flushes_batch() {
        let mut builder = TileLayerBuilder::new(0, constant_float(1.0), None);
        let layout = GeometryLayoutParameters::for_fields(false, false, false);
        let (verts, idx) = quad(layout.stride);
        let mut style_a = StyleParameters::default();
        style_a.comp_op = CompOp::Src;
        let mut style_b = StyleParameters::default();
        style_b.comp_op = CompOp::Multiply;
        builder.add_feature(1, PrimitiveKind::Polygon, style_a, layout, &verts, &idx);
        builder.add_feature(2, PrimitiveKind::Polygon, style_b, layout, &verts, &idx);
        let layer = builder.build();
        assert_eq!(layer.geometries.len(), 2);
    }

    #[test]
    fn test_id_runs_survive_into_finished_geometry() {
        let mut builder = TileLayerBuilder::new(0, constant_float(1.0), None);
        let layout = GeometryLayoutParameters::for_fields(false, false, false);
        let (verts, idx) = quad(layout.stride);
        builder.add_feature(42, PrimitiveKind::Polygon, StyleParameters::default(), layout, &verts, &idx);
        let layer = builder.build();
        assert_eq!(layer.geometries[0].ids.id_for_triangle(0), Some(42));
    }
}
