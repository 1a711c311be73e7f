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
use geometry::{Aabb2, Plane};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Everything a frame's drawing and label placement need to know about the
/// camera: projection/view matrices, the current zoom (used to pick
/// per-style-parameter zoom functions), and the viewport in pixels.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub projection: Matrix4<f64>,
    pub view: Matrix4<f64>,
    pub zoom: f64,
    pub aspect_ratio: f64,
    pub resolution: (u32, u32),
}

impl ViewState {
    pub fn new(
        projection: Matrix4<f64>,
        view: Matrix4<f64>,
        zoom: f64,
        aspect_ratio: f64,
        resolution: (u32, u32),
    ) -> Self {
        Self {
            projection,
            view,
            zoom,
            aspect_ratio,
            resolution,
        }
    }

    pub fn view_projection(&self) -> Matrix4<f64> {
        self.projection * self.view
    }

    /// Project a world point to normalized device coordinates in `[-1,1]`,
    /// returning `None` if it lies behind the eye (`w <= 0`).
    pub fn project_to_ndc(&self, world: Point3<f64>) -> Option<(f64, f64)> {
        let clip: Vector4<f64> = self.view_projection() * world.to_homogeneous();
        if clip.w <= 0.0 {
            return None;
        }
        Some((clip.x / clip.w, clip.y / clip.w))
    }

    /// Project to pixel coordinates, origin top-left, matching the
    /// renderer's screen-space label/culling grid.
    pub fn project_to_screen(&self, world: Point3<f64>) -> Option<(f64, f64)> {
        let (ndc_x, ndc_y) = self.project_to_ndc(world)?;
        let (w, h) = (self.resolution.0 as f64, self.resolution.1 as f64);
        Some(((ndc_x * 0.5 + 0.5) * w, (1.0 - (ndc_y * 0.5 + 0.5)) * h))
    }

    /// Six frustum planes with outward normals, derived from the combined
    /// view-projection matrix (Gribb/Hartmann extraction).
    pub fn frustum_planes(&self) -> [Plane; 6] {
        let m = self.view_projection();
        let row = |i: usize| Vector4::new(m[(i, 0)], m[(i, 1)], m[(i, 2)], m[(i, 3)]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));
        let make = |v: Vector4<f64>| {
            let normal = Vector3::new(v.x, v.y, v.z);
            let len = normal.norm();
            Plane::from_normal_and_distance(normal / len, v.w / len)
        };
        [
            make(r3 + r0),
            make(r3 - r0),
            make(r3 + r1),
            make(r3 - r1),
            make(r3 + r2),
            make(r3 - r2),
        ]
    }

    /// Point `p` (in screen pixels) expanded by `half_extent` stays inside
    /// the viewport rectangle — used by label culling's visibility test.
    pub fn screen_bounds(&self) -> Aabb2 {
        Aabb2::new(
            [0.0, 0.0],
            [self.resolution.0 as f32, self.resolution.1 as f32],
        )
    }
}
