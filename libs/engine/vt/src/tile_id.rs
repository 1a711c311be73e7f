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
use std::fmt;

/// A slippy-map tile coordinate: zoom level plus the tile's column/row
/// within the `2^zoom × 2^zoom` grid at that zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    pub fn parent(self) -> Option<TileId> {
        if self.zoom == 0 {
            return None;
        }
        Some(TileId {
            zoom: self.zoom - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    pub fn child(self, dx: u32, dy: u32) -> TileId {
        debug_assert!(dx < 2 && dy < 2);
        TileId {
            zoom: self.zoom + 1,
            x: self.x * 2 + dx,
            y: self.y * 2 + dy,
        }
    }

    /// `true` iff one of `self`/`other` is an ancestor (or equal) of the
    /// other: the shallower tile's quadrant covers the deeper one's.
    pub fn intersects(self, other: TileId) -> bool {
        let (shallow, deep) = if self.zoom <= other.zoom {
            (self, other)
        } else {
            (other, self)
        };
        let shift = deep.zoom - shallow.zoom;
        (deep.x >> shift) == shallow.x && (deep.y >> shift) == shallow.y
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parent_child_round_trip() {
        let id = TileId::new(3, 5, 6);
        let parent = id.parent().unwrap();
        let back = parent.child(id.x % 2, id.y % 2);
        assert_eq!(back, id);
    }

    #[test]
    fn test_root_has_no_parent() {
        assert_eq!(TileId::new(0, 0, 0).parent(), None);
    }

    #[test]
    fn test_intersects_covers_descendants() {
        let root = TileId::new(1, 0, 0);
        let child = root.child(0, 0).child(1, 0);
        assert!(root.intersects(child));
        assert!(child.intersects(root));
        let unrelated = TileId::new(2, 3, 3);
        assert!(!root.intersects(unrelated));
    }

    #[test]
    fn test_self_intersects() {
        let id = TileId::new(4, 2, 2);
        assert!(id.intersects(id));
    }
}
