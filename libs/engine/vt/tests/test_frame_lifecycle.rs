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
use gpu::{BlendState, CommandRecorder, CompOp, PassTarget, ShaderProgram, TextureFormat};
use nalgebra::Matrix4;
use std::ops::Range;
use vt::{
    constant_float, GeometryLayoutParameters, PrimitiveKind, StyleParameters, Tile, TileId,
    TileLayerBuilder, TileRenderer, ViewState,
};

/// A recorder that does nothing but count pass/draw calls, standing in for
/// a real backend (`wgpu`, a software rasterizer) in tests that only care
/// about the renderer's own bookkeeping.
#[derive(Default)]
struct CountingRecorder {
    passes_begun: u32,
    draws: u32,
}

struct NullBuffer;
impl gpu::Buffer for NullBuffer {
    fn size_in_bytes(&self) -> usize {
        0
    }
}

struct NullTexture;
impl gpu::Texture for NullTexture {
    fn format(&self) -> TextureFormat {
        TextureFormat::Rgba8Unorm
    }
    fn width(&self) -> u32 {
        0
    }
    fn height(&self) -> u32 {
        0
    }
}

struct NullFramebuffer;
impl gpu::Framebuffer for NullFramebuffer {
    fn color_attachment(&self) -> &dyn gpu::Texture {
        &NullTexture
    }
    fn width(&self) -> u32 {
        0
    }
    fn height(&self) -> u32 {
        0
    }
}

impl CommandRecorder for CountingRecorder {
    type Buffer = NullBuffer;
    type Texture = NullTexture;
    type Framebuffer = NullFramebuffer;

    fn begin_pass(&mut self, _target: PassTarget<'_, Self::Framebuffer>, _clear: Option<[f32; 4]>) {
        self.passes_begun += 1;
    }

    fn bind_shader(&mut self, _program: ShaderProgram, _blend: BlendState) {}
    fn bind_vertex_buffer(&mut self, _buffer: &Self::Buffer, _stride: u64) {}
    fn bind_index_buffer(&mut self, _buffer: &Self::Buffer) {}
    fn bind_texture(&mut self, _slot: u32, _texture: &Self::Texture) {}

    fn draw_indexed(&mut self, _indices: Range<u32>, _base_vertex: i32) {
        self.draws += 1;
    }

    fn end_pass(&mut self) {}

    fn composite(&mut self, _source: &Self::Texture, _op: CompOp) {}
}

fn view() -> ViewState {
    ViewState::new(Matrix4::identity(), Matrix4::identity(), 10.0, 1.0, (1024, 768))
}

fn quad(stride: u32) -> (Vec<u8>, Vec<u16>) {
    (vec![0u8; stride as usize * 4], vec![0, 1, 2, 0, 2, 3])
}

/// A feature tessellated by a builder, handed to a tile, made visible on a
/// renderer, and driven through a full frame: it should still be resident
/// afterward, and the 2D geometry pass should have run exactly once.
#[test]
fn test_builder_output_survives_a_full_frame() {
    let mut builder = TileLayerBuilder::new(0, constant_float(1.0), None);
    let layout = GeometryLayoutParameters::for_fields(false, false, false);
    let (vertices, indices) = quad(layout.stride);
    builder.add_feature(
        7,
        PrimitiveKind::Polygon,
        StyleParameters::default(),
        layout,
        &vertices,
        &indices,
    );
    let layer = builder.build();

    let id = TileId::new(0, 0, 0);
    let tile = Tile::new(id, vec![layer]);

    let renderer = TileRenderer::new(view());
    renderer.set_visible_tiles(0, &[(id, tile)], false);

    assert!(!renderer.start_frame(0.016));

    let mut recorder = CountingRecorder::default();
    renderer.render_geometry_2d(&mut recorder);
    assert_eq!(recorder.passes_begun, 1);

    let live = renderer.end_frame();
    assert_eq!(live, vec![id]);
}

/// Swapping in a blended tile set keeps both the old and new tile alive
/// until the fade finishes, then `end_frame` stops reporting the old one.
#[test]
fn test_blended_tile_swap_fades_out_the_old_tile() {
    let renderer = TileRenderer::new(view());
    let old_id = TileId::new(0, 0, 0);
    let new_id = TileId::new(1, 0, 0);
    let old_tile = Tile::new(old_id, vec![]);
    let new_tile = Tile::new(new_id, vec![]);

    renderer.set_visible_tiles(0, &[(old_id, old_tile)], false);
    renderer.start_frame(0.016);
    renderer.end_frame();

    renderer.set_visible_tiles(0, &[(new_id, new_tile)], true);
    assert!(renderer.start_frame(0.016));
    let live_mid_fade = renderer.end_frame();
    assert!(live_mid_fade.contains(&old_id));
    assert!(live_mid_fade.contains(&new_id));

    for _ in 0..100 {
        renderer.start_frame(1.0);
    }
    let live_after_fade = renderer.end_frame();
    assert_eq!(live_after_fade, vec![new_id]);
}
