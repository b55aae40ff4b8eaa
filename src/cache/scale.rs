//! Per-path display/processing scale cache (C11).
//!
//! The display variant and the processing variant use the same collapsed
//! scale policy (see the resolved open question in the design ledger): both
//! are the original downscaled to fit within `MAX_DISPLAY_WIDTH` x
//! `MAX_DISPLAY_HEIGHT`, never upscaled. Keyed by path alone -- unlike C10,
//! there is exactly one live variant per path.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use tokio::sync::Mutex;

use crate::collab::Clock;
use crate::image::RasterImage;

pub const MAX_DISPLAY_WIDTH: u32 = 1920;
pub const MAX_DISPLAY_HEIGHT: u32 = 1080;
pub const DEFAULT_MAX_ENTRIES: usize = 3;

#[derive(Clone)]
pub struct ScaleEntry {
    pub display: RasterImage,
    /// Multiply a display-space coordinate by this to get original-space.
    pub scale_display_to_original: f64,
}

struct Slot {
    entry: ScaleEntry,
    last_access_tick: u64,
}

struct Inner {
    entries: AHashMap<PathBuf, Slot>,
    max_entries: usize,
}

pub struct ScaleCache {
    inner: Mutex<Inner>,
}

impl ScaleCache {
    pub fn new(max_entries: usize) -> Self {
        Self { inner: Mutex::new(Inner { entries: AHashMap::new(), max_entries: max_entries.max(1) }) }
    }

    /// Returns the cached display variant for `path`, computing it from
    /// `original` on a miss. Callers are expected to have already obtained
    /// `original` from the decode cache (C10) for the same path.
    pub async fn get_or_compute(&self, path: &Path, original: &RasterImage, clock: &dyn Clock) -> ScaleEntry {
        let mut inner = self.inner.lock().await;

        if let Some(slot) = inner.entries.get_mut(path) {
            slot.last_access_tick = clock.tick();
            return slot.entry.clone();
        }

        let entry = compute_entry(original);

        if inner.entries.len() >= inner.max_entries {
            if let Some(oldest) =
                inner.entries.iter().min_by_key(|(_, s)| s.last_access_tick).map(|(k, _)| k.clone())
            {
                inner.entries.remove(&oldest);
            }
        }

        inner.entries.insert(path.to_path_buf(), Slot { entry: entry.clone(), last_access_tick: clock.tick() });
        entry
    }

    pub async fn clear(&self, path: Option<&Path>) {
        let mut inner = self.inner.lock().await;
        match path {
            None => inner.entries.clear(),
            Some(path) => {
                inner.entries.remove(path);
            }
        }
    }

    pub async fn stats(&self) -> super::CacheStats {
        let inner = self.inner.lock().await;
        super::CacheStats { size: inner.entries.len(), max_size: inner.max_entries }
    }
}

fn compute_entry(original: &RasterImage) -> ScaleEntry {
    let (w, h) = (original.width() as f64, original.height() as f64);
    let factor = (MAX_DISPLAY_WIDTH as f64 / w).min(MAX_DISPLAY_HEIGHT as f64 / h).min(1.0);

    if factor >= 1.0 {
        return ScaleEntry { display: original.clone(), scale_display_to_original: 1.0 };
    }

    let new_w = (w * factor).round().max(1.0) as u32;
    let new_h = (h * factor).round().max(1.0) as u32;
    let display = original.resize_exact(new_w, new_h);
    // Recompute from actual output dims so round-tripping a display-space
    // coordinate lands back inside the original, even after integer rounding.
    let scale_display_to_original = (w / new_w as f64 + h / new_h as f64) / 2.0;

    ScaleEntry { display, scale_display_to_original }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testutil::StepClock;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn fixture(w: u32, h: u32) -> RasterImage {
        let buf = RgbaImage::from_pixel(w, h, Rgba([5, 5, 5, 255]));
        RasterImage::decode_bytes(&{
            let mut out = std::io::Cursor::new(Vec::new());
            DynamicImage::ImageRgba8(buf).write_to(&mut out, image::ImageFormat::Png).unwrap();
            out.into_inner()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn small_image_is_not_scaled_down() {
        let cache = ScaleCache::new(3);
        let clock = StepClock::default();
        let original = fixture(100, 100);
        let entry = cache.get_or_compute(Path::new("/a.png"), &original, &clock).await;
        assert_eq!((entry.display.width(), entry.display.height()), (100, 100));
        assert_eq!(entry.scale_display_to_original, 1.0);
    }

    #[tokio::test]
    async fn oversized_image_is_bounded_to_display_limits() {
        let cache = ScaleCache::new(3);
        let clock = StepClock::default();
        let original = fixture(3840, 2160);
        let entry = cache.get_or_compute(Path::new("/a.png"), &original, &clock).await;
        assert!(entry.display.width() <= MAX_DISPLAY_WIDTH);
        assert!(entry.display.height() <= MAX_DISPLAY_HEIGHT);
        assert!(entry.scale_display_to_original > 1.0);
    }

    #[tokio::test]
    async fn repeated_calls_reuse_the_cached_entry() {
        let cache = ScaleCache::new(3);
        let clock = StepClock::default();
        let original = fixture(3840, 2160);
        let first = cache.get_or_compute(Path::new("/a.png"), &original, &clock).await;
        let second = cache.get_or_compute(Path::new("/a.png"), &original, &clock).await;
        assert_eq!(first.display.width(), second.display.width());
    }

    #[tokio::test]
    async fn lru_eviction_drops_the_least_recently_used_path() {
        let cache = ScaleCache::new(2);
        let clock = StepClock::default();
        let a = fixture(3840, 2160);
        let b = fixture(3840, 2160);
        let c = fixture(3840, 2160);

        cache.get_or_compute(Path::new("/a.png"), &a, &clock).await;
        cache.get_or_compute(Path::new("/b.png"), &b, &clock).await;
        cache.get_or_compute(Path::new("/a.png"), &a, &clock).await;
        cache.get_or_compute(Path::new("/c.png"), &c, &clock).await;

        assert_eq!(cache.stats().await.size, 2);
    }

    #[tokio::test]
    async fn clear_path_removes_only_that_entry() {
        let cache = ScaleCache::new(3);
        let clock = StepClock::default();
        let original = fixture(200, 200);
        cache.get_or_compute(Path::new("/a.png"), &original, &clock).await;
        cache.get_or_compute(Path::new("/b.png"), &original, &clock).await;
        cache.clear(Some(Path::new("/a.png"))).await;
        assert_eq!(cache.stats().await.size, 1);
    }
}
