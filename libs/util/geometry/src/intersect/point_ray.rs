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
use crate::Ray;
use nalgebra::{Point3, RealField, Vector3};
use num_traits::cast::FromPrimitive;
use std::fmt::{Debug, Display};

/// Same quadratic solve as a sphere/ray test, but takes `center`/`radius`
/// directly rather than a `Sphere`, for picking a point feature (a label
/// anchor, a point symbolizer) expanded to a pick radius.
pub fn intersect_point<T>(center: &Point3<T>, radius: T, ray: &Ray<T>) -> Option<(Point3<T>, T)>
where
    T: Copy + Clone + Debug + Display + PartialEq + FromPrimitive + RealField + 'static,
{
    let two = T::one() + T::one();
    let half = T::one() / two;
    let four = two + two;

    let ray2center: Vector3<T> = ray.origin() - center;
    let a = ray.direction().dot(ray.direction());
    let b = two * ray.direction().dot(&ray2center);
    let c = ray2center.dot(&ray2center) - radius * radius;

    let discriminant = b * b - four * a * c;
    if discriminant < T::zero() {
        return None;
    }
    let (x0, x1) = if discriminant == T::zero() {
        let x = -half * b / a;
        (x, x)
    } else {
        let q = if b > T::zero() {
            -half * (b + discriminant.sqrt())
        } else {
            -half * (b - discriminant.sqrt())
        };
        (q / a, c / q)
    };
    let mut t = x0.min(x1);
    if t < T::zero() {
        t = x0.max(x1);
    }
    if t < T::zero() {
        return None;
    }

    Some((ray.origin() + ray.direction() * t, t))
}
