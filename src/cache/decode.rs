//! LRU decoded-image cache, keyed by `(path, options fingerprint)` (C10).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use tokio::sync::{Mutex, OnceCell};

use crate::collab::{Clock, ImageDecoder};
use crate::error::CoreError;
use crate::image::RasterImage;

pub const DEFAULT_MAX_ENTRIES: usize = 10;

/// The resize variant a `loadImageForDisplay` request selects. `None` is the
/// raw decoded original; the others parameterize a downscaled sibling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadVariant {
    Original,
    DownsampleFactor(f64),
    MaxDims { max_width: Option<u32>, max_height: Option<u32> },
}

impl LoadVariant {
    /// Canonical serialization used as the cache key's second component.
    /// Distinct fingerprints are independent entries even for the same path.
    pub fn fingerprint(self) -> String {
        match self {
            Self::Original => "none".to_string(),
            Self::DownsampleFactor(f) => format!("factor:{f:.6}"),
            Self::MaxDims { max_width, max_height } => {
                format!("max:{}x{}", max_width.map_or(0, |w| w), max_height.map_or(0, |h| h))
            }
        }
    }

    /// Resolves this variant against an already-known original size to an
    /// effective downsample factor in `(0, 1]`. `1.0` means "no resize".
    fn effective_factor(self, orig_w: u32, orig_h: u32) -> f64 {
        match self {
            Self::Original => 1.0,
            Self::DownsampleFactor(f) => f.clamp(f64::MIN_POSITIVE, 1.0),
            Self::MaxDims { max_width, max_height } => {
                let fw = max_width.map(|w| orig_w as f64 / w as f64);
                let fh = max_height.map(|h| orig_h as f64 / h as f64);
                let divisor = match (fw, fh) {
                    (Some(fw), Some(fh)) => fw.max(fh),
                    (Some(fw), None) => fw,
                    (None, Some(fh)) => fh,
                    (None, None) => 1.0,
                };
                (1.0 / divisor).min(1.0).max(f64::MIN_POSITIVE)
            }
        }
    }
}

/// A decoded variant together with the original image's dimensions --
/// callers that only ever see a downscaled sibling still need the
/// original's size to map display-space coordinates back to it.
#[derive(Clone)]
pub struct DecodedVariant {
    pub image: RasterImage,
    pub original_width: u32,
    pub original_height: u32,
}

type DecodeSlot = Arc<OnceCell<Result<DecodedVariant, CoreError>>>;

struct Entry {
    variant: DecodedVariant,
    last_access_tick: u64,
}

/// Key separator used so `clear(path)` can match every fingerprint for a
/// path with a simple string-prefix test.
const KEY_SEP: char = '\u{0}';

fn cache_key(path: &Path, fingerprint: &str) -> String {
    format!("{}{KEY_SEP}{fingerprint}", path.to_string_lossy())
}

struct Inner {
    entries: AHashMap<String, Entry>,
    max_entries: usize,
    in_flight: HashMap<String, DecodeSlot>,
}

/// The decoded-image LRU. Guarded by a single `tokio::sync::Mutex`, per the
/// concurrency model's "guarded by a single lock for simplicity" allowance.
pub struct DecodeCache {
    inner: Mutex<Inner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
}

impl DecodeCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: AHashMap::new(),
                max_entries: max_entries.max(1),
                in_flight: HashMap::new(),
            }),
        }
    }

    /// Fetches the decoded variant for `(path, variant)`, decoding (and
    /// resizing, for non-`Original` variants) on a miss. A second concurrent
    /// miss on the same key awaits the first decode instead of issuing a
    /// second one.
    pub async fn get_or_decode(
        &self,
        path: &Path,
        variant: LoadVariant,
        decoder: &dyn ImageDecoder,
        clock: &dyn Clock,
    ) -> Result<DecodedVariant, CoreError> {
        let fingerprint = variant.fingerprint();
        let key = cache_key(path, &fingerprint);

        if let Some(v) = self.touch(&key, clock).await {
            return Ok(v);
        }

        let slot = {
            let mut inner = self.inner.lock().await;
            inner.in_flight.entry(key.clone()).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };

        let result = slot
            .get_or_init(|| async { self.decode_variant(path, variant, decoder).await })
            .await
            .clone();

        {
            let mut inner = self.inner.lock().await;
            inner.in_flight.remove(&key);
            if let Ok(v) = &result {
                self.insert_locked(&mut inner, key, v.clone(), clock);
            }
        }

        result
    }

    async fn decode_variant(
        &self,
        path: &Path,
        variant: LoadVariant,
        decoder: &dyn ImageDecoder,
    ) -> Result<DecodedVariant, CoreError> {
        let original = decoder.decode(path).await?;
        let (original_width, original_height) = (original.width(), original.height());
        let image = match variant {
            LoadVariant::Original => original,
            other => {
                let factor = other.effective_factor(original_width, original_height);
                if factor >= 1.0 {
                    original
                } else {
                    let w = ((original_width as f64) * factor).round().max(1.0) as u32;
                    let h = ((original_height as f64) * factor).round().max(1.0) as u32;
                    original.resize_exact(w, h)
                }
            }
        };
        Ok(DecodedVariant { image, original_width, original_height })
    }

    async fn touch(&self, key: &str, clock: &dyn Clock) -> Option<DecodedVariant> {
        let mut inner = self.inner.lock().await;
        let tick = clock.tick();
        let entry = inner.entries.get_mut(key)?;
        entry.last_access_tick = tick;
        Some(entry.variant.clone())
    }

    fn insert_locked(&self, inner: &mut Inner, key: String, variant: DecodedVariant, clock: &dyn Clock) {
        if inner.entries.contains_key(&key) {
            if let Some(e) = inner.entries.get_mut(&key) {
                e.last_access_tick = clock.tick();
            }
            return;
        }

        if inner.entries.len() >= inner.max_entries {
            if let Some(oldest_key) =
                inner.entries.iter().min_by_key(|(_, e)| e.last_access_tick).map(|(k, _)| k.clone())
            {
                inner.entries.remove(&oldest_key);
            }
        }

        inner.entries.insert(key, Entry { variant, last_access_tick: clock.tick() });
    }

    pub async fn clear(&self, path: Option<&Path>) {
        let mut inner = self.inner.lock().await;
        match path {
            None => inner.entries.clear(),
            Some(path) => {
                let prefix = format!("{}{KEY_SEP}", path.to_string_lossy());
                inner.entries.retain(|k, _| !k.starts_with(&prefix));
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats { size: inner.entries.len(), max_size: inner.max_entries }
    }

    #[cfg(test)]
    pub async fn contains(&self, path: &Path, variant: LoadVariant) -> bool {
        let key = cache_key(path, &variant.fingerprint());
        self.inner.lock().await.entries.contains_key(&key)
    }
}
