//! In-memory LRU cache of rendered tiles.
//!
//! Each layer owns one cache keyed by tile coordinate. Changing anything that
//! affects pixels (palette, extent, time or vertical index, interpolation)
//! must be followed by [`TileCache::invalidate`].

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use coverage_common::TileCoord;

use crate::raster::TileImage;

/// Capacity used when a zero capacity is requested.
pub const DEFAULT_TILE_CACHE_ENTRIES: usize = 256;

/// Counters for a tile cache. Atomic so they can be read without the lock.
#[derive(Debug, Default)]
pub struct TileCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub invalidations: AtomicU64,
}

impl TileCacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits + self.misses.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64 * 100.0
        }
    }
}

pub struct TileCache {
    entries: Mutex<LruCache<TileCoord, Arc<TileImage>>>,
    stats: TileCacheStats,
}

impl TileCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_TILE_CACHE_ENTRIES))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            stats: TileCacheStats::default(),
        }
    }

    pub fn get(&self, coord: &TileCoord) -> Option<Arc<TileImage>> {
        let hit = self.lock().get(coord).cloned();
        if hit.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("tile_cache_hits_total").increment(1);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("tile_cache_misses_total").increment(1);
        }
        hit
    }

    pub fn insert(&self, coord: TileCoord, tile: Arc<TileImage>) {
        let mut entries = self.lock();
        if let Some((evicted, _)) = entries.push(coord, tile) {
            if evicted != coord {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Cached tile for `coord`, rendering and storing it on a miss.
    pub fn get_or_render<E, F>(&self, coord: TileCoord, render: F) -> Result<Arc<TileImage>, E>
    where
        F: FnOnce() -> Result<TileImage, E>,
    {
        if let Some(tile) = self.get(&coord) {
            return Ok(tile);
        }
        let tile = Arc::new(render()?);
        self.insert(coord, Arc::clone(&tile));
        Ok(tile)
    }

    /// Drop every cached tile.
    pub fn invalidate(&self) {
        let mut entries = self.lock();
        let dropped = entries.len();
        entries.clear();
        self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
        debug!(dropped, "Invalidated tile cache");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &TileCacheStats {
        &self.stats
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<TileCoord, Arc<TileImage>>> {
        // a panic while holding the lock leaves the cache usable
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> TileImage {
        TileImage::transparent(4, 4)
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = TileCache::new(4);
        let c = TileCoord::new(1, 0, 0);
        assert!(cache.get(&c).is_none());
        cache.insert(c, Arc::new(tile()));
        assert!(cache.get(&c).is_some());
        assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 1);
        assert_eq!(cache.stats().misses.load(Ordering::Relaxed), 1);
        assert_eq!(cache.stats().hit_rate(), 50.0);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = TileCache::new(2);
        cache.insert(TileCoord::new(0, 0, 0), Arc::new(tile()));
        cache.insert(TileCoord::new(1, 0, 0), Arc::new(tile()));
        cache.insert(TileCoord::new(1, 1, 0), Arc::new(tile()));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&TileCoord::new(0, 0, 0)).is_none());
        assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_get_or_render_renders_once() {
        let cache = TileCache::new(2);
        let c = TileCoord::new(2, 1, 1);
        let mut calls = 0;
        for _ in 0..3 {
            let _ = cache
                .get_or_render::<(), _>(c, || {
                    calls += 1;
                    Ok(tile())
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_invalidate() {
        let cache = TileCache::new(0);
        cache.insert(TileCoord::new(0, 0, 0), Arc::new(tile()));
        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().invalidations.load(Ordering::Relaxed), 1);
    }
}
