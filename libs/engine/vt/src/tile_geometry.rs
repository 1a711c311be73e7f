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
use crate::styles::StyleParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Point,
    Line,
    Polygon,
    Polygon3D,
}

/// Byte offsets and per-buffer scale factors for decoding the packed
/// 16-bit vertex layout: `position:i16[2]`, `attribs:i8[4]`, then
/// optionally `texcoord:i16[2]`, `binormal:i16[2]`, `height:f32`, in that
/// order — the shader reads these offsets directly, so the layout must
/// match byte-for-byte across implementations.
#[derive(Debug, Clone, Copy)]
pub struct GeometryLayoutParameters {
    pub stride: u32,
    pub texcoord_offset: Option<u32>,
    pub binormal_offset: Option<u32>,
    pub height_offset: Option<u32>,
    pub vertex_scale: f32,
    pub binormal_scale: f32,
    pub texcoord_scale: f32,
}

impl GeometryLayoutParameters {
    /// Position (4 bytes) + attribs (4 bytes) is the fixed prefix every
    /// primitive carries; extra fields are appended only as present.
    pub fn for_fields(has_texcoord: bool, has_binormal: bool, has_height: bool) -> Self {
        let mut stride = 8u32;
        let texcoord_offset = has_texcoord.then(|| {
            let o = stride;
            stride += 4;
            o
        });
        let binormal_offset = has_binormal.then(|| {
            let o = stride;
            stride += 4;
            o
        });
        let height_offset = has_height.then(|| {
            let o = stride;
            stride += 4;
            o
        });
        Self {
            stride,
            texcoord_offset,
            binormal_offset,
            height_offset,
            vertex_scale: 1.0,
            binormal_scale: 1.0,
            texcoord_scale: 1.0,
        }
    }
}

/// A run-length-encoded `triangleCount -> featureId` table, used by
/// intersection queries to map a hit triangle index back to a feature.
#[derive(Debug, Clone, Default)]
pub struct IdRuns {
    pub runs: Vec<(u32, u64)>,
}

impl IdRuns {
    pub fn push_run(&mut self, triangle_count: u32, id: u64) {
        if let Some(last) = self.runs.last_mut() {
            if last.1 == id {
                last.0 += triangle_count;
                return;
            }
        }
        self.runs.push((triangle_count, id));
    }

    pub fn id_for_triangle(&self, triangle_index: u32) -> Option<u64> {
        let mut cursor = 0u32;
        for &(count, id) in &self.runs {
            if triangle_index < cursor + count {
                return Some(id);
            }
            cursor += count;
        }
        None
    }
}

/// One tessellated, GPU-ready batch: an interleaved packed vertex buffer,
/// a 16-bit index buffer, per-feature id runs, and the style/layout
/// parameters a draw call needs. `TileLayerBuilder` is the only producer.
#[derive(Clone)]
pub struct TileGeometry {
    pub kind: PrimitiveKind,
    pub vertices: Vec<u8>,
    pub indices: Vec<u16>,
    pub ids: IdRuns,
    pub style: StyleParameters,
    pub layout: GeometryLayoutParameters,
}

impl TileGeometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_layout_offsets_are_sequential() {
        let layout = GeometryLayoutParameters::for_fields(true, true, false);
        assert_eq!(layout.texcoord_offset, Some(8));
        assert_eq!(layout.binormal_offset, Some(12));
        assert_eq!(layout.height_offset, None);
        assert_eq!(layout.stride, 16);
    }

    #[test]
    fn test_id_runs_merge_adjacent_equal_ids() {
        let mut runs = IdRuns::default();
        runs.push_run(2, 7);
        runs.push_run(3, 7);
        runs.push_run(1, 9);
        assert_eq!(runs.runs, vec![(5, 7), (1, 9)]);
    }

    #[test]
    fn test_id_runs_lookup_by_triangle_index() {
        let mut runs = IdRuns::default();
        runs.push_run(2, 7);
        runs.push_run(1, 9);
        assert_eq!(runs.id_for_triangle(0), Some(7));
        assert_eq!(runs.id_for_triangle(1), Some(7));
        assert_eq!(runs.id_for_triangle(2), Some(9));
        assert_eq!(runs.id_for_triangle(3), None);
    }
}
