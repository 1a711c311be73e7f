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
use crate::bitmap::{BitmapFormat, TileBitmap};
use cartocss::Color;

/// Software rasterizer used to synthesize procedural marker textures
/// (disks, rounded rectangles) on demand. 8-bit per channel RGBA with
/// coverage-based anti-aliasing: every draw call blends through
/// `draw_pixel`, which composites `color * opacity * coverage` onto the
/// existing pixel.
pub struct BitmapCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    color: Color,
    opacity: f32,
}

impl BitmapCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
            color: Color::from_rgba(0.0, 0.0, 0.0, 1.0),
            opacity: 1.0,
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let a = (coverage * self.opacity).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize * 4;
        let src = [self.color.r, self.color.g, self.color.b, self.color.a];
        for c in 0..4 {
            let dst = self.pixels[idx + c] as f32 / 255.0;
            let blended = src[c] * a + dst * (1.0 - a);
            self.pixels[idx + c] = (blended.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }

    pub fn draw_rectangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.draw_pixel(x, y, 1.0);
            }
        }
    }

    pub fn draw_triangle(&mut self, p0: (f32, f32), p1: (f32, f32), p2: (f32, f32)) {
        let min_x = p0.0.min(p1.0).min(p2.0).floor() as i32;
        let max_x = p0.0.max(p1.0).max(p2.0).ceil() as i32;
        let min_y = p0.1.min(p1.1).min(p2.1).floor() as i32;
        let max_y = p0.1.max(p1.1).max(p2.1).ceil() as i32;
        let sign = |a: (f32, f32), b: (f32, f32), c: (f32, f32)| {
            (a.0 - c.0) * (b.1 - c.1) - (b.0 - c.0) * (a.1 - c.1)
        };
        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let d1 = sign(p, p0, p1);
                let d2 = sign(p, p1, p2);
                let d3 = sign(p, p2, p0);
                let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
                let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
                if !(has_neg && has_pos) {
                    self.draw_pixel(x, y, 1.0);
                }
            }
        }
    }

    /// `coverage = clamp(0.5 + (1 - (x/rx)^2 - (y/ry)^2) * min(rx,ry), 0, 1)`,
    /// evaluated per pixel relative to the ellipse's center.
    pub fn draw_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        let min_x = (cx - rx).floor() as i32;
        let max_x = (cx + rx).ceil() as i32;
        let min_y = (cy - ry).floor() as i32;
        let max_y = (cy + ry).ceil() as i32;
        let min_r = rx.min(ry);
        for y in min_y..max_y {
            for x in min_x..max_x {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                let coverage = (0.5 + (1.0 - nx * nx - ny * ny) * min_r).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.draw_pixel(x, y, coverage);
                }
            }
        }
    }

    pub fn into_bitmap(self) -> TileBitmap {
        TileBitmap::new(BitmapFormat::Rgba, self.width, self.height, self.pixels)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ellipse_center_is_fully_covered() {
        let mut canvas = BitmapCanvas::new(32, 32);
        canvas.set_color(Color::from_rgba(1.0, 0.0, 0.0, 1.0));
        canvas.draw_ellipse(16.0, 16.0, 10.0, 10.0);
        let bmp = canvas.into_bitmap();
        let idx = (16 * 32 + 16) * 4;
        assert_eq!(bmp.pixels[idx], 255);
    }

    #[test]
    fn test_draw_outside_bounds_is_noop() {
        let mut canvas = BitmapCanvas::new(4, 4);
        canvas.draw_pixel(100, 100, 1.0);
        let bmp = canvas.into_bitmap();
        assert!(bmp.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rectangle_fills_requested_region() {
        let mut canvas = BitmapCanvas::new(8, 8);
        canvas.set_color(Color::from_rgba(0.0, 1.0, 0.0, 1.0));
        canvas.draw_rectangle(2, 2, 5, 5);
        let bmp = canvas.into_bitmap();
        let idx = (3 * 8 + 3) * 4;
        assert_eq!(bmp.pixels[idx + 1], 255);
    }
}
