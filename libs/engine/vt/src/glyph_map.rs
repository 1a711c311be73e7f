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
use crate::bitmap::TileBitmap;
use log::debug;

pub type GlyphId = u32;

#[derive(Debug, Clone, Copy)]
pub struct GlyphRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct GlyphMetrics {
    pub offset: (f32, f32),
    pub advance: f32,
}

struct Entry {
    rect: GlyphRect,
    metrics: GlyphMetrics,
}

/// A shelf-packed 2D atlas: glyphs append left-to-right along the current
/// shelf, wrapping to a new shelf (sized to the tallest glyph seen on it)
/// when the next glyph would overflow the row. `load` returns glyph id `0`
/// (`AtlasFull`, spec §7) rather than an error when the atlas is full —
/// callers substitute a blank glyph and keep going.
pub struct GlyphMap {
    width: u32,
    height: u32,
    cursor_x: u32,
    shelf_y: u32,
    shelf_height: u32,
    entries: Vec<Entry>,
    dirty: bool,
}

impl GlyphMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cursor_x: 0,
            shelf_y: 0,
            shelf_height: 0,
            entries: vec![Entry {
                rect: GlyphRect { x: 0, y: 0, width: 0, height: 0 },
                metrics: GlyphMetrics { offset: (0.0, 0.0), advance: 0.0 },
            }],
            dirty: false,
        }
    }

    pub fn load(&mut self, bitmap: &TileBitmap, offset: (f32, f32), advance: f32) -> GlyphId {
        if bitmap.width > self.width {
            return 0;
        }
        if self.cursor_x + bitmap.width > self.width {
            self.shelf_y += self.shelf_height;
            self.cursor_x = 0;
            self.shelf_height = 0;
        }
        if self.shelf_y + bitmap.height > self.height {
            return 0;
        }
        let rect = GlyphRect {
            x: self.cursor_x,
            y: self.shelf_y,
            width: bitmap.width,
            height: bitmap.height,
        };
        self.cursor_x += bitmap.width;
        self.shelf_height = self.shelf_height.max(bitmap.height);
        self.entries.push(Entry {
            rect,
            metrics: GlyphMetrics { offset, advance },
        });
        self.dirty = true;
        debug!("glyph atlas grew to shelf_y={} cursor_x={}", self.shelf_y, self.cursor_x);
        (self.entries.len() - 1) as GlyphId
    }

    pub fn get(&self, id: GlyphId) -> Option<(GlyphRect, GlyphMetrics)> {
        self.entries.get(id as usize).map(|e| (e.rect, e.metrics))
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn bounds(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn bmp(w: u32, h: u32) -> TileBitmap {
        TileBitmap::new(crate::bitmap::BitmapFormat::Gray, w, h, vec![0u8; (w * h) as usize])
    }

    #[test]
    fn test_glyph_rect_stays_within_atlas_bounds() {
        let mut atlas = GlyphMap::new(64, 64);
        for _ in 0..20 {
            let id = atlas.load(&bmp(8, 8), (0.0, 0.0), 8.0);
            assert_ne!(id, 0);
            let (rect, _) = atlas.get(id).unwrap();
            assert!(rect.x + rect.width <= 64);
            assert!(rect.y + rect.height <= 64);
        }
    }

    #[test]
    fn test_full_atlas_returns_zero_id() {
        let mut atlas = GlyphMap::new(8, 8);
        let first = atlas.load(&bmp(8, 8), (0.0, 0.0), 8.0);
        assert_ne!(first, 0);
        let second = atlas.load(&bmp(8, 8), (0.0, 0.0), 8.0);
        assert_eq!(second, 0);
    }

    #[test]
    fn test_wraps_to_new_shelf() {
        let mut atlas = GlyphMap::new(16, 32);
        let a = atlas.load(&bmp(10, 4), (0.0, 0.0), 4.0);
        let b = atlas.load(&bmp(10, 4), (0.0, 0.0), 4.0);
        let (rect_a, _) = atlas.get(a).unwrap();
        let (rect_b, _) = atlas.get(b).unwrap();
        assert_eq!(rect_a.y, 0);
        assert_eq!(rect_b.y, 4);
    }
}
