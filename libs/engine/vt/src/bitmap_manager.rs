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
use std::collections::HashMap;
use std::sync::Arc;

/// Smallest power-of-two `>= n`, used to size cached procedural textures
/// so they tile cleanly with mipmap chains.
pub fn next_pot(n: u32) -> u32 {
    if n <= 1 {
        return 1;
    }
    1u32 << (32 - (n - 1).leading_zeros())
}

/// Process-wide cache of decoded/synthesized bitmaps keyed by filename —
/// for procedurally generated markers the "filename" is a synthetic string
/// encoding the generator's parameters (e.g. `"circle:r=8,color=#ff0000"`),
/// matching the teacher's content-keyed caches (`libs/system/gpu`'s atlas
/// upload path). Entries are shared via `Arc` so a texture upload can
/// happen once regardless of how many tiles reference the same marker.
#[derive(Default)]
pub struct BitmapManager {
    cache: HashMap<String, Arc<TileBitmap>>,
}

impl BitmapManager {
    pub fn get_or_insert_with(
        &mut self,
        key: impl Into<String>,
        make: impl FnOnce() -> TileBitmap,
    ) -> Arc<TileBitmap> {
        let key = key.into();
        if let Some(existing) = self.cache.get(&key) {
            return existing.clone();
        }
        let bitmap = Arc::new(make());
        debug!("bitmap manager cached new entry '{}' ({}x{})", key, bitmap.width, bitmap.height);
        self.cache.insert(key, bitmap.clone());
        bitmap
    }

    pub fn get(&self, key: &str) -> Option<Arc<TileBitmap>> {
        self.cache.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bitmap::BitmapFormat;

    #[test]
    fn test_next_pot() {
        assert_eq!(next_pot(1), 1);
        assert_eq!(next_pot(5), 8);
        assert_eq!(next_pot(8), 8);
        assert_eq!(next_pot(129), 256);
    }

    #[test]
    fn test_cache_returns_same_entry_for_same_key() {
        let mut mgr = BitmapManager::default();
        let mut calls = 0;
        let a = mgr.get_or_insert_with("circle:r=4", || {
            calls += 1;
            TileBitmap::new(BitmapFormat::Rgba, 8, 8, vec![0u8; 8 * 8 * 4])
        });
        let b = mgr.get_or_insert_with("circle:r=4", || {
            calls += 1;
            TileBitmap::new(BitmapFormat::Rgba, 8, 8, vec![0u8; 8 * 8 * 4])
        });
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls, 1);
    }
}
