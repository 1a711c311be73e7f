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

mod axis_aligned_bounding_box;
pub mod intersect;
mod plane;
mod ray;

pub use axis_aligned_bounding_box::Aabb;
pub use plane::Plane;
pub use ray::Ray;

/// An axis-aligned box in screen space, used by label culling's overlap grid.
pub type Aabb2 = Aabb<f32, 2>;

/// An axis-aligned box in tile-local space, used for geometry/frustum bounds.
pub type Aabb3 = Aabb<f64, 3>;
