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

/// Moller-Trumbore ray/triangle test. Returns the world-space hit point and
/// the ray parameter `t`, or `None` if the ray misses, is parallel to the
/// triangle's plane, or hits behind its origin.
pub fn intersect_triangle<T>(
    v0: &Point3<T>,
    v1: &Point3<T>,
    v2: &Point3<T>,
    ray: &Ray<T>,
) -> Option<(Point3<T>, T)>
where
    T: Copy + Clone + Debug + Display + PartialEq + FromPrimitive + RealField + 'static,
{
    let epsilon = T::from_f64(1e-9).unwrap();
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction().cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < epsilon {
        return None;
    }
    let f = T::one() / a;
    let s = ray.origin() - v0;
    let u = f * s.dot(&h);
    if u < T::zero() || u > T::one() {
        return None;
    }
    let q = s.cross(&edge1);
    let v = f * ray.direction().dot(&q);
    if v < T::zero() || u + v > T::one() {
        return None;
    }
    let t = f * edge2.dot(&q);
    if t < T::zero() {
        return None;
    }
    Some((ray.origin() + ray.direction() * t, t))
}

/// `triangle` expanded outward from its centroid by `radius` before the
/// test, for "pick within N pixels of a thin line/point" queries.
pub fn intersect_triangle_with_radius<T>(
    v0: &Point3<T>,
    v1: &Point3<T>,
    v2: &Point3<T>,
    radius: T,
    ray: &Ray<T>,
) -> Option<(Point3<T>, T)>
where
    T: Copy + Clone + Debug + Display + PartialEq + FromPrimitive + RealField + 'static,
{
    if radius <= T::zero() {
        return intersect_triangle(v0, v1, v2, ray);
    }
    let three = T::from_f64(3.0).unwrap();
    let centroid = Point3::from((v0.coords + v1.coords + v2.coords) / three);
    let expand = |p: &Point3<T>| -> Point3<T> {
        let offset = p - centroid;
        let len = offset.norm();
        if len < T::from_f64(1e-9).unwrap() {
            *p
        } else {
            centroid + offset * ((len + radius) / len)
        }
    };
    let (e0, e1, e2) = (expand(v0), expand(v1), expand(v2));
    intersect_triangle(&e0, &e1, &e2, ray)
}
