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

pub type StrokeId = u32;

/// A dash pattern's row within the stroke atlas: `y0`/`y1` bound its rows,
/// `scale_along_line` is how many world units one tiled repeat of the
/// pattern (bilinearly rescaled to the atlas width) covers.
#[derive(Debug, Clone, Copy)]
pub struct StrokeRow {
    pub y0: u32,
    pub y1: u32,
    pub scale_along_line: f32,
}

/// Fixed-width atlas for line dash patterns. Each submitted pattern is
/// tiled horizontally to fill `width`, then conceptually bilinearly scaled
/// to it, so every stroke shares the same U range regardless of its native
/// repeat length; only `scale_along_line` differs per stroke.
pub struct StrokeMap {
    width: u32,
    next_row: u32,
    rows_per_stroke: u32,
    strokes: Vec<StrokeRow>,
}

impl StrokeMap {
    pub fn new(width: u32, rows_per_stroke: u32) -> Self {
        Self {
            width,
            next_row: 0,
            rows_per_stroke,
            strokes: Vec::new(),
        }
    }

    /// `pattern_length` is the dash pattern's native repeat length in world
    /// units; the row's `scale_along_line` is derived so the tiled,
    /// width-rescaled copy preserves that repeat.
    pub fn submit(&mut self, pattern_length: f32) -> Option<StrokeId> {
        let y0 = self.next_row;
        let y1 = y0 + self.rows_per_stroke;
        self.next_row = y1;
        self.strokes.push(StrokeRow {
            y0,
            y1,
            scale_along_line: pattern_length / self.width as f32,
        });
        Some((self.strokes.len() - 1) as StrokeId)
    }

    pub fn get(&self, id: StrokeId) -> Option<StrokeRow> {
        self.strokes.get(id as usize).copied()
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rows_do_not_overlap() {
        let mut atlas = StrokeMap::new(256, 4);
        let a = atlas.submit(10.0).unwrap();
        let b = atlas.submit(20.0).unwrap();
        let ra = atlas.get(a).unwrap();
        let rb = atlas.get(b).unwrap();
        assert!(ra.y1 <= rb.y0);
    }

    #[test]
    fn test_scale_along_line_tracks_pattern_length() {
        let mut atlas = StrokeMap::new(100, 2);
        let id = atlas.submit(50.0).unwrap();
        let row = atlas.get(id).unwrap();
        assert!((row.scale_along_line - 0.5).abs() < 1e-6);
    }
}
