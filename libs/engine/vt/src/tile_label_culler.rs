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
use crate::view_state::ViewState;
use nalgebra::{Point2, Point3};

pub const GRID_RESOLUTION: usize = 32;

/// An oriented screen-space quad: `center +- half_extent.x * axis_x +-
/// half_extent.y * axis_y`. Point labels use axis-aligned axes; line
/// labels' axes follow the glyph run's baseline direction.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub center: (f32, f32),
    pub half_extent: (f32, f32),
    pub axis_x: (f32, f32),
    pub axis_y: (f32, f32),
}

impl Envelope {
    pub fn axis_aligned(center: (f32, f32), half_extent: (f32, f32)) -> Self {
        Self {
            center,
            half_extent,
            axis_x: (1.0, 0.0),
            axis_y: (0.0, 1.0),
        }
    }

    fn corners(&self) -> [(f32, f32); 4] {
        let (cx, cy) = self.center;
        let (hx, hy) = self.half_extent;
        let (ax, ay) = self.axis_x;
        let (bx, by) = self.axis_y;
        let p = |sx: f32, sy: f32| (cx + sx * hx * ax + sy * hy * bx, cy + sx * hx * ay + sy * hy * by);
        [p(-1.0, -1.0), p(1.0, -1.0), p(1.0, 1.0), p(-1.0, 1.0)]
    }
}

/// Separating-axis test between two convex (here: rectangular) quads.
pub fn envelopes_overlap(a: &Envelope, b: &Envelope) -> bool {
    let ca = a.corners();
    let cb = b.corners();
    let axes = [a.axis_x, a.axis_y, b.axis_x, b.axis_y];
    for axis in axes {
        let (min_a, max_a) = project(&ca, axis);
        let (min_b, max_b) = project(&cb, axis);
        if max_a < min_b || max_b < min_a {
            return false;
        }
    }
    true
}

fn project(corners: &[(f32, f32); 4], axis: (f32, f32)) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &(x, y) in corners {
        let d = x * axis.0 + y * axis.1;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

pub struct LabelCandidate {
    pub key: (u32, u64),
    pub priority: u32,
    pub opacity: f32,
    pub envelope: Envelope,
    pub group_id: u32,
    pub world_position: Point3<f64>,
}

/// Re-places/re-evaluates visibility for one frame's active labels: insert
/// highest-`(priority, opacity)`-first into a `GRID_RESOLUTION^2`
/// screen-space bucket grid, rejecting any candidate that SAT-overlaps an
/// already-accepted label, or that shares a `group_id > 0` with an
/// accepted label closer than `minimum_group_distance` world units.
pub struct LabelCuller {
    view: ViewState,
    minimum_group_distance: f64,
}

impl LabelCuller {
    pub fn new(view: ViewState, minimum_group_distance: f64) -> Self {
        Self {
            view,
            minimum_group_distance,
        }
    }

    fn bucket(&self, center: (f32, f32)) -> (usize, usize) {
        let (w, h) = (self.view.resolution.0.max(1) as f32, self.view.resolution.1.max(1) as f32);
        let gx = ((center.0 / w) * GRID_RESOLUTION as f32)
            .clamp(0.0, GRID_RESOLUTION as f32 - 1.0) as usize;
        let gy = ((center.1 / h) * GRID_RESOLUTION as f32)
            .clamp(0.0, GRID_RESOLUTION as f32 - 1.0) as usize;
        (gx, gy)
    }

    /// Returns the keys of labels that survive culling, in acceptance
    /// order (highest priority first).
    pub fn cull(&self, mut candidates: Vec<LabelCandidate>) -> Vec<(u32, u64)> {
        candidates.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.opacity.partial_cmp(&a.opacity).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut grid: Vec<Vec<usize>> = vec![Vec::new(); GRID_RESOLUTION * GRID_RESOLUTION];
        let mut accepted: Vec<usize> = Vec::new();
        let mut out = Vec::new();

        'candidates: for (idx, candidate) in candidates.iter().enumerate() {
            let (gx, gy) = self.bucket(candidate.envelope.center);
            let radius = 1usize;
            for dy in gy.saturating_sub(radius)..=(gy + radius).min(GRID_RESOLUTION - 1) {
                for dx in gx.saturating_sub(radius)..=(gx + radius).min(GRID_RESOLUTION - 1) {
                    for &other_idx in &grid[dy * GRID_RESOLUTION + dx] {
                        let other = &candidates[other_idx];
                        if envelopes_overlap(&candidate.envelope, &other.envelope) {
                            continue 'candidates;
                        }
                        if candidate.group_id > 0 && candidate.group_id == other.group_id {
                            let dist = (candidate.world_position - other.world_position).norm();
                            if dist < self.minimum_group_distance {
                                continue 'candidates;
                            }
                        }
                    }
                }
            }
            grid[gy * GRID_RESOLUTION + gx].push(idx);
            accepted.push(idx);
            out.push(candidate.key);
        }
        out
    }

    /// `Point`/`PointFlipping`/`Billboard2D`/`Billboard3D` placement: the
    /// anchor is visible iff it projects inside the viewport expanded by
    /// the glyph bbox in screen pixels.
    pub fn place_point(&self, anchor: Point3<f64>, half_extent: (f32, f32)) -> Option<Envelope> {
        let (x, y) = self.view.project_to_screen(anchor)?;
        let (w, h) = (self.view.resolution.0 as f32, self.view.resolution.1 as f32);
        if x as f32 + half_extent.0 < 0.0
            || y as f32 + half_extent.1 < 0.0
            || x as f32 - half_extent.0 > w
            || y as f32 - half_extent.1 > h
        {
            return None;
        }
        Some(Envelope::axis_aligned((x as f32, y as f32), half_extent))
    }
}

/// Weighting factor `(1/j + 1/(n-j))` used by `Line`-orientation placement
/// to favor joints away from both polyline endpoints; `j` is 1-indexed
/// into the `n`-joint run. Kept exactly as specified — it interacts with
/// the previous-frame snap path, so it is not "simplified".
pub fn line_placement_weight(j: usize, n: usize) -> f64 {
    debug_assert!(j >= 1 && j < n);
    1.0 / j as f64 + 1.0 / (n - j) as f64
}

/// Longest contiguous run of joints in `turning_angles_deg` (per-joint
/// turning angle in degrees) whose per-joint angle is <= 60 deg and whose
/// summed angle over the run is <= 120 deg. Returns the `[start, end)`
/// vertex range of the run, or `None` if the whole polyline must be split
/// before any run qualifies.
pub fn longest_valid_run(turning_angles_deg: &[f64]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut start = 0usize;
    let mut sum = 0.0f64;
    for i in 0..turning_angles_deg.len() {
        if turning_angles_deg[i].abs() > 60.0 {
            start = i + 1;
            sum = 0.0;
            continue;
        }
        sum += turning_angles_deg[i].abs();
        while sum > 120.0 {
            sum -= turning_angles_deg[start].abs();
            start += 1;
        }
        let run = (start, i + 2);
        if best.map(|(s, e)| e - s <= run.1 - run.0).unwrap_or(true) {
            best = Some(run);
        }
    }
    best
}

pub fn midpoint(a: Point2<f64>, b: Point2<f64>) -> Point2<f64> {
    Point2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_identical_envelopes_overlap() {
        let a = Envelope::axis_aligned((0.0, 0.0), (10.0, 5.0));
        assert!(envelopes_overlap(&a, &a));
    }

    #[test]
    fn test_far_apart_envelopes_do_not_overlap() {
        let a = Envelope::axis_aligned((0.0, 0.0), (10.0, 5.0));
        let b = Envelope::axis_aligned((1000.0, 1000.0), (10.0, 5.0));
        assert!(!envelopes_overlap(&a, &b));
    }

    #[test]
    fn test_group_distance_suppresses_one_of_two() {
        let view = ViewState::new(
            nalgebra::Matrix4::identity(),
            nalgebra::Matrix4::identity(),
            3.0,
            1.0,
            (800, 600),
        );
        let culler = LabelCuller::new(view, 100.0);
        let candidates = vec![
            LabelCandidate {
                key: (0, 1),
                priority: 1,
                opacity: 1.0,
                envelope: Envelope::axis_aligned((100.0, 100.0), (5.0, 5.0)),
                group_id: 42,
                world_position: Point3::new(0.0, 0.0, 0.0),
            },
            LabelCandidate {
                key: (0, 2),
                priority: 1,
                opacity: 1.0,
                envelope: Envelope::axis_aligned((400.0, 400.0), (5.0, 5.0)),
                group_id: 42,
                world_position: Point3::new(80.0, 0.0, 0.0),
            },
        ];
        let visible = culler.cull(candidates);
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn test_line_placement_weight_symmetric() {
        assert_eq!(line_placement_weight(2, 5), line_placement_weight(3, 5));
    }

    #[test]
    fn test_longest_valid_run_splits_on_sharp_turn() {
        let angles = vec![10.0, 170.0, 15.0];
        let run = longest_valid_run(&angles).unwrap();
        assert_eq!(run, (2, 4));
    }
}
