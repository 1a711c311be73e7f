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
use log::debug;
use std::sync::Arc;

#[derive(Debug)]
struct CopyOwnedBufferToArcTextureDescriptor {
    buffer: wgpu::Buffer,
    layout: wgpu::ImageDataLayout,
    texture: Arc<wgpu::Texture>,
    mip_level: u32,
    origin: wgpu::Origin3d,
    extent: wgpu::Extent3d,
}

#[derive(Debug)]
struct CopyBufferToBufferDescriptor {
    source: wgpu::Buffer,
    source_offset: wgpu::BufferAddress,
    destination: Arc<wgpu::Buffer>,
    destination_offset: wgpu::BufferAddress,
    copy_size: wgpu::BufferAddress,
}

/// Batches pending buffer/texture uploads so atlas growth and tile-geometry
/// rebuilds can enqueue copies during the frame and flush them all into one
/// command encoder at the end of it, rather than submitting a command
/// buffer per upload.
#[derive(Debug, Default)]
pub struct UploadTracker {
    b2b_uploads: Vec<CopyBufferToBufferDescriptor>,
    b2t_uploads: Vec<CopyOwnedBufferToArcTextureDescriptor>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self {
            b2b_uploads: vec![],
            b2t_uploads: vec![],
        }
    }

    pub fn upload_buffer(
        &mut self,
        source: wgpu::Buffer,
        destination: Arc<wgpu::Buffer>,
        copy_size: wgpu::BufferAddress,
    ) {
        self.b2b_uploads.push(CopyBufferToBufferDescriptor {
            source,
            source_offset: 0,
            destination,
            destination_offset: 0,
            copy_size,
        });
    }

    pub fn upload_texture(
        &mut self,
        buffer: wgpu::Buffer,
        layout: wgpu::ImageDataLayout,
        texture: Arc<wgpu::Texture>,
        mip_level: u32,
        origin: wgpu::Origin3d,
        extent: wgpu::Extent3d,
    ) {
        self.b2t_uploads
            .push(CopyOwnedBufferToArcTextureDescriptor {
                buffer,
                layout,
                texture,
                mip_level,
                origin,
                extent,
            });
    }

    pub fn is_empty(&self) -> bool {
        self.b2b_uploads.is_empty() && self.b2t_uploads.is_empty()
    }

    pub fn dispatch_uploads(&mut self, encoder: &mut wgpu::CommandEncoder) {
        debug!(
            "dispatching {} buffer and {} texture uploads",
            self.b2b_uploads.len(),
            self.b2t_uploads.len()
        );
        for desc in self.b2b_uploads.drain(..) {
            encoder.copy_buffer_to_buffer(
                &desc.source,
                desc.source_offset,
                &desc.destination,
                desc.destination_offset,
                desc.copy_size,
            );
        }
        for desc in self.b2t_uploads.drain(..) {
            encoder.copy_buffer_to_texture(
                wgpu::ImageCopyBuffer {
                    buffer: &desc.buffer,
                    layout: desc.layout,
                },
                wgpu::ImageCopyTexture {
                    texture: &desc.texture,
                    mip_level: desc.mip_level,
                    origin: desc.origin,
                    aspect: wgpu::TextureAspect::All,
                },
                desc.extent,
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_tracker_is_empty() {
        assert!(UploadTracker::new().is_empty());
    }
}
