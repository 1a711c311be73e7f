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
//
//! An abstract GPU command-recorder surface: buffers, textures, framebuffers,
//! and a small fixed shader library. The renderer in `vt` is written against
//! the traits here, never against a concrete `wgpu::Device`/`Surface`/
//! `Adapter`; a real backend only needs to implement [`CommandRecorder`].

mod comp_op;
mod upload_tracker;

pub use comp_op::CompOp;
pub use upload_tracker::UploadTracker;

// Re-export wgpu's own vocabulary rather than invent a parallel one: the
// renderer's blend/format types ARE wgpu's, just reached through a trait
// boundary instead of a concrete device.
pub use wgpu::{BlendComponent, BlendFactor, BlendOperation, BlendState, TextureFormat};

use std::ops::Range;

/// Which fixed shader a draw call should bind. The shader library is small
/// and closed: points, lines, polygons, 3D extrusions, labels, and the
/// offscreen-composite blit, each optionally specialized by a variant
/// (pattern vs. flat color, transform vs. identity).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    Point { textured: bool },
    Line { dashed: bool },
    Polygon { patterned: bool },
    Polygon3D,
    Label,
    Composite,
}

/// An opaque handle to a GPU-resident buffer. Concrete recorders map this
/// to their own buffer type; the abstraction only needs to move bytes in.
pub trait Buffer {
    fn size_in_bytes(&self) -> usize;
}

/// An opaque handle to a GPU-resident texture (an atlas page, a tile
/// bitmap, a pattern).
pub trait Texture {
    fn format(&self) -> TextureFormat;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// An offscreen render target a layer with a `comp-op` draws into before
/// being composited onto the frame target.
pub trait Framebuffer {
    fn color_attachment(&self) -> &dyn Texture;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Where a pass's color output goes.
pub enum PassTarget<'a, F> {
    Screen,
    Offscreen(&'a F),
}

/// The command-recorder surface the renderer issues draw calls against.
/// Implementations translate these calls into whatever the real backend
/// needs (a `wgpu::RenderPass`, a software rasterizer, a capture buffer for
/// tests). Every method borrows `self` mutably and is expected to be called
/// in frame order; there is no reordering or multithreading within a pass.
pub trait CommandRecorder {
    type Buffer: Buffer;
    type Texture: Texture;
    type Framebuffer: Framebuffer;

    /// Begin a render pass, optionally clearing to `clear_color` first.
    /// Callers drawing with a [`CompOp`] that is not in
    /// [`CompOp::allows_unclaimed_accumulator`] must pass `Some(_)`.
    fn begin_pass(&mut self, target: PassTarget<'_, Self::Framebuffer>, clear: Option<[f32; 4]>);

    fn bind_shader(&mut self, program: ShaderProgram, blend: BlendState);
    fn bind_vertex_buffer(&mut self, buffer: &Self::Buffer, stride: u64);
    fn bind_index_buffer(&mut self, buffer: &Self::Buffer);
    fn bind_texture(&mut self, slot: u32, texture: &Self::Texture);

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32);

    fn end_pass(&mut self);

    /// Composite a fully-rendered layer framebuffer onto the current pass
    /// target using `op`. The source framebuffer must already have been
    /// cleared appropriately at `begin_pass` time; this call only performs
    /// the final blit/blend.
    fn composite(&mut self, source: &Self::Texture, op: CompOp);
}

pub fn texture_format_sample_type(format: TextureFormat) -> wgpu::TextureSampleType {
    format.describe().sample_type
}

pub fn texture_format_size(format: TextureFormat) -> u32 {
    format.describe().block_size as u32
}
