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

/// Pixel layout of a decoded raster tile (a basemap image layer, or a
/// procedurally rasterized marker). Releasable once uploaded to a GPU
/// texture — the renderer never needs the CPU-side bytes again after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapFormat {
    Gray,
    Rgb,
    Rgba,
}

impl BitmapFormat {
    pub fn channels(self) -> usize {
        match self {
            BitmapFormat::Gray => 1,
            BitmapFormat::Rgb => 3,
            BitmapFormat::Rgba => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TileBitmap {
    pub format: BitmapFormat,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TileBitmap {
    pub fn new(format: BitmapFormat, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * format.channels(),
            "pixel buffer size does not match format/dimensions"
        );
        Self {
            format,
            width,
            height,
            pixels,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}
