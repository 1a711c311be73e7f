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
use wgpu::{BlendComponent, BlendFactor, BlendOperation, BlendState};

/// Porter-Duff-style composition operator, applied either per-layer (when
/// blending an offscreen layer framebuffer onto the frame target) or
/// per-geometry (drawing a single `TileGeometry` directly).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompOp {
    Src,
    SrcOver,
    SrcIn,
    SrcAtop,
    Dst,
    DstOver,
    DstIn,
    DstAtop,
    Zero,
    Plus,
    Minus,
    Multiply,
    Screen,
    Darken,
    Lighten,
}

impl Default for CompOp {
    fn default() -> Self {
        CompOp::SrcOver
    }
}

impl CompOp {
    /// Translate to a wgpu blend state. Each operator is a fixed
    /// (blend equation, src factor, dst factor) triple; alpha uses the same
    /// factors as color for every operator here.
    pub fn blend_state(self) -> BlendState {
        let (operation, src, dst) = match self {
            CompOp::Src => (BlendOperation::Add, BlendFactor::One, BlendFactor::Zero),
            CompOp::SrcOver => (
                BlendOperation::Add,
                BlendFactor::One,
                BlendFactor::OneMinusSrcAlpha,
            ),
            CompOp::SrcIn => (BlendOperation::Add, BlendFactor::DstAlpha, BlendFactor::Zero),
            CompOp::SrcAtop => (
                BlendOperation::Add,
                BlendFactor::DstAlpha,
                BlendFactor::OneMinusSrcAlpha,
            ),
            CompOp::Dst => (BlendOperation::Add, BlendFactor::Zero, BlendFactor::One),
            CompOp::DstOver => (
                BlendOperation::Add,
                BlendFactor::OneMinusDstAlpha,
                BlendFactor::One,
            ),
            CompOp::DstIn => (BlendOperation::Add, BlendFactor::Zero, BlendFactor::SrcAlpha),
            CompOp::DstAtop => (
                BlendOperation::Add,
                BlendFactor::OneMinusDstAlpha,
                BlendFactor::SrcAlpha,
            ),
            CompOp::Zero => (BlendOperation::Add, BlendFactor::Zero, BlendFactor::Zero),
            CompOp::Plus => (BlendOperation::Add, BlendFactor::One, BlendFactor::One),
            CompOp::Minus => (
                BlendOperation::ReverseSubtract,
                BlendFactor::One,
                BlendFactor::One,
            ),
            CompOp::Multiply => (BlendOperation::Add, BlendFactor::Dst, BlendFactor::Zero),
            CompOp::Screen => (
                BlendOperation::Add,
                BlendFactor::One,
                BlendFactor::OneMinusSrc,
            ),
            CompOp::Darken => (BlendOperation::Min, BlendFactor::One, BlendFactor::One),
            CompOp::Lighten => (BlendOperation::Max, BlendFactor::One, BlendFactor::One),
        };
        let component = BlendComponent {
            src_factor: src,
            dst_factor: dst,
            operation,
        };
        BlendState {
            color: component,
            alpha: component,
        }
    }

    /// True for the subset of operators that can draw directly into an
    /// empty/uncleared accumulator without visible artifacts. Everything
    /// else depends on the accumulator starting at transparent black and
    /// must be preceded by a clear.
    pub fn allows_unclaimed_accumulator(self) -> bool {
        matches!(
            self,
            CompOp::Src
                | CompOp::SrcOver
                | CompOp::DstOver
                | CompOp::DstAtop
                | CompOp::Plus
                | CompOp::Minus
                | CompOp::Lighten
        )
    }

    pub fn requires_clear(self) -> bool {
        !self.allows_unclaimed_accumulator()
    }
}
