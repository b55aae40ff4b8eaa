//! `scanchop_core`: seed-point flood-fill, minimum-area rectangle, and
//! rotation-corrected crop extraction for scanned photo/artwork sheets.
//!
//! [`ScanChop`] is the facade a host embeds: it owns the decode cache (C10),
//! the display/processing scale cache (C11), and the frame registry (C12),
//! and wires them through the [`pipeline`] module's `extract_frame`
//! orchestration. Everything below the facade is a free function or a small
//! struct operating on plain data -- easy to unit test without going through
//! `ScanChop` at all.

use std::path::Path;
use std::sync::Arc;

pub mod cache;
pub mod collab;
pub mod config;
pub mod crop;
mod elapsedlogger;
pub mod error;
pub mod floodfill;
pub mod geometry;
pub mod hull;
pub mod image;
pub mod orientation;
pub mod pipeline;
pub mod predicate;
pub mod rect;
pub mod registry;
pub mod transform;

pub use cache::{CacheStats, DecodedVariant, LoadVariant};
pub use collab::Collaborators;
pub use config::ProcessingConfig;
pub use error::{CoreError, ErrorKind, Result};
pub use geometry::Vector2;
pub use registry::FrameRecord;

pub use elapsedlogger::init_logging;

use cache::{DecodeCache, ScaleCache};
use registry::FrameRegistry;

struct Inner {
    collaborators: Collaborators,
    decode_cache: DecodeCache,
    scale_cache: ScaleCache,
    registry: FrameRegistry,
}

/// Result of [`ScanChop::load_image_for_display`]: the PNG-encoded variant
/// bytes plus the dimensions a caller needs to map a click on the displayed
/// image back to original-space coordinates. `width`/`height` describe the
/// encoded variant; `original_width`/`original_height` describe the
/// undecoded source.
#[derive(Debug, Clone)]
pub struct DisplayImage {
    pub image_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

/// The crate's facade. Cheap to clone -- every clone shares the same caches
/// and registry, the way a GUI's manager handle is shared across tasks.
#[derive(Clone)]
pub struct ScanChop(Arc<Inner>);

impl Default for ScanChop {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanChop {
    pub fn new() -> Self {
        Self::with_collaborators(Collaborators::default())
    }

    pub fn with_collaborators(collaborators: Collaborators) -> Self {
        Self(Arc::new(Inner {
            collaborators,
            decode_cache: DecodeCache::new(cache::decode::DEFAULT_MAX_ENTRIES),
            scale_cache: ScaleCache::new(cache::scale::DEFAULT_MAX_ENTRIES),
            registry: FrameRegistry::new(),
        }))
    }

    /// Runs the full seed-to-frame pipeline (decode, scale, flood-fill,
    /// minimum-area rectangle, smart crop) and registers the result.
    ///
    /// `seed` is in *display*-space coordinates -- the same pixel grid as
    /// the bytes returned by [`Self::load_image_for_display`], not the
    /// original's. The returned record's `bounding_box` is in that same
    /// display space; only the registered crop image itself is rendered
    /// from the original-resolution source.
    pub async fn extract_frame(
        &self,
        path: &Path,
        seed: Vector2,
        label: impl Into<String>,
        config: &ProcessingConfig,
    ) -> Result<FrameRecord> {
        pipeline::extract_frame(
            path,
            seed,
            label.into(),
            config,
            self.0.collaborators.decoder.as_ref(),
            self.0.collaborators.clock.as_ref(),
            &self.0.decode_cache,
            &self.0.scale_cache,
            &self.0.registry,
        )
        .await
        .map_err(log_and_pass)
    }

    /// Decodes (or resizes, via the requested [`LoadVariant`]) a path for
    /// display, returning the PNG-encoded bytes alongside the variant's
    /// dimensions and the undecoded original's, so a caller can map a seed
    /// click on the displayed image back to original-space coordinates.
    pub async fn load_image_for_display(&self, path: &Path, variant: LoadVariant) -> Result<DisplayImage> {
        let decoded = self
            .0
            .decode_cache
            .get_or_decode(path, variant, self.0.collaborators.decoder.as_ref(), self.0.collaborators.clock.as_ref())
            .await
            .map_err(log_and_pass)?;
        let (width, height) = (decoded.image.width(), decoded.image.height());
        let image_bytes = decoded.image.encode_png().map_err(log_and_pass)?;
        Ok(DisplayImage {
            image_bytes,
            width,
            height,
            original_width: decoded.original_width,
            original_height: decoded.original_height,
        })
    }

    pub async fn update_frame(&self, id: &str, label: Option<String>) -> Result<FrameRecord> {
        self.0.registry.update(id, label).await.map_err(log_and_pass)
    }

    pub async fn rotate_frame(&self, id: &str) -> Result<FrameRecord> {
        self.0.registry.rotate_cycle(id).await.map_err(log_and_pass)
    }

    pub async fn delete_frame(&self, id: &str) -> Result<()> {
        self.0.registry.delete(id).await.map_err(log_and_pass)
    }

    pub async fn get_frame(&self, id: &str) -> Option<FrameRecord> {
        self.0.registry.get(id).await
    }

    pub async fn list_frames(&self) -> Vec<FrameRecord> {
        self.0.registry.list().await
    }

    /// Saves a registered frame to `path`, rendering its current
    /// `orientation` at save time rather than from a pre-rotated bitmap.
    /// Fails with `IoError` if the path exists and `overwrite` is false.
    pub async fn save_frame_to_path(&self, id: &str, path: &Path, overwrite: bool) -> Result<()> {
        let record = self
            .0
            .registry
            .get(id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound, "save_frame_to_path", "no such frame id"))?;
        let bytes = record.oriented_image().encode_png().map_err(log_and_pass)?;
        self.0.collaborators.writer.write(path, &bytes, overwrite).await.map_err(log_and_pass)
    }

    /// Produces a filesystem-safe default filename for a frame's label,
    /// suitable for pre-filling the host's file-save dialog. Does not
    /// consult the filesystem -- it is a pure function of the label.
    pub async fn default_filename(&self, id: &str) -> Result<String> {
        let record = self
            .0
            .registry
            .get(id)
            .await
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound, "default_filename", "no such frame id"))?;
        Ok(self.0.collaborators.sanitizer.sanitize(&record.label))
    }

    /// Clears both caches' entries for a single source path.
    pub async fn clear_cache(&self, path: &Path) {
        self.0.decode_cache.clear(Some(path)).await;
        self.0.scale_cache.clear(Some(path)).await;
    }

    /// Clears every cached decoded/scaled image, for every path.
    pub async fn clear_image_cache(&self) {
        self.0.decode_cache.clear(None).await;
        self.0.scale_cache.clear(None).await;
    }

    pub async fn image_cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.0.decode_cache.stats().await, self.0.scale_cache.stats().await)
    }
}

fn log_and_pass(err: CoreError) -> CoreError {
    err.log();
    err
}
