//! Narrow collaborator interfaces consumed from the environment (C13).
//!
//! These are the seams the core treats as external: the actual image codec,
//! the actual filesystem, and the actual clock. The core never reaches for
//! `std::fs` or a concrete decoder directly outside of the default
//! implementations below, which exist for the CLI binary and for tests -- a
//! host embedding this crate is free to supply its own.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{CoreError, ErrorKind};
use crate::image::RasterImage;

/// Decodes a path into a [`RasterImage`]. May fail with `NotFound`,
/// `InvalidInput` (not an image), or `DecodeFailed`.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, path: &Path) -> Result<RasterImage, CoreError>;
}

/// The default decoder, backed by the `image` crate via a blocking pool --
/// decode is one of the three suspension points the concurrency model names.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageDecoder;

#[async_trait]
impl ImageDecoder for FsImageDecoder {
    async fn decode(&self, path: &Path) -> Result<RasterImage, CoreError> {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || RasterImage::open(&owned))
            .await
            .map_err(|e| CoreError::new(ErrorKind::DecodeFailed, "decode", e.to_string()))?
    }
}

/// Writes bytes to a path. `overwrite = false` must fail with
/// `ExistsAndNotOverwritable` (folded into `IoError` in the unified
/// taxonomy) rather than silently clobbering an existing file.
#[async_trait]
pub trait FileWriter: Send + Sync {
    async fn write(&self, path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), CoreError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileWriter;

#[async_trait]
impl FileWriter for FsFileWriter {
    async fn write(&self, path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), CoreError> {
        if !overwrite && tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(CoreError::new(ErrorKind::IoError, "save_frame_to_path", "file already exists")
                .with_path(path));
        }
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| CoreError::new(ErrorKind::IoError, "save_frame_to_path", e.to_string()).with_path(path))
    }
}

/// Produces a filesystem-safe default filename from a frame's label.
pub trait PathSanitizer: Send + Sync {
    fn sanitize(&self, label: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPathSanitizer;

impl PathSanitizer for DefaultPathSanitizer {
    fn sanitize(&self, label: &str) -> String {
        let mut out: String = label
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        if out.is_empty() {
            out = "frame".to_string();
        }
        out
    }
}

/// Supplies strictly-increasing monotonic ticks for the LRU caches (C10,
/// C11). Implementations must be strictly increasing within a process, per
/// the concurrency model.
pub trait Clock: Send + Sync {
    fn tick(&self) -> u64;
}

#[derive(Debug, Default)]
pub struct MonotonicCounter {
    next: std::sync::atomic::AtomicU64,
}

impl Clock for MonotonicCounter {
    fn tick(&self) -> u64 {
        self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }
}

/// Bundles the collaborators a [`crate::ScanChop`] needs at construction
/// time -- decoder, writer, sanitizer, and clock -- so a host can swap any
/// of them out without touching the pipeline.
pub struct Collaborators {
    pub decoder: Box<dyn ImageDecoder>,
    pub writer: Box<dyn FileWriter>,
    pub sanitizer: Box<dyn PathSanitizer>,
    pub clock: Box<dyn Clock>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            decoder: Box::new(FsImageDecoder),
            writer: Box::new(FsFileWriter),
            sanitizer: Box::new(DefaultPathSanitizer),
            clock: Box::new(MonotonicCounter::default()),
        }
    }
}

#[cfg(test)]
pub mod testutil {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// A decoder fixture over an in-memory map, counting decodes so tests
    /// can assert a cache is actually being used (scenario 6 in section 8).
    pub struct CountingDecoder {
        images: HashMap<PathBuf, RasterImage>,
        pub decodes: AtomicUsize,
    }

    impl CountingDecoder {
        pub fn new(images: HashMap<PathBuf, RasterImage>) -> Self {
            Self { images, decodes: AtomicUsize::new(0) }
        }

        pub fn decode_count(&self) -> usize {
            self.decodes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageDecoder for CountingDecoder {
        async fn decode(&self, path: &Path) -> Result<RasterImage, CoreError> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            self.images
                .get(path)
                .cloned()
                .ok_or_else(|| CoreError::new(ErrorKind::NotFound, "decode", "no fixture for path").with_path(path))
        }
    }

    #[derive(Default)]
    pub struct MemoryFileWriter {
        pub files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    }

    #[async_trait]
    impl FileWriter for MemoryFileWriter {
        async fn write(&self, path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), CoreError> {
            let mut files = self.files.lock().unwrap();
            if !overwrite && files.contains_key(path) {
                return Err(CoreError::new(ErrorKind::IoError, "save_frame_to_path", "file already exists")
                    .with_path(path));
            }
            files.insert(path.to_path_buf(), bytes.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct StepClock {
        next: AtomicUsize,
    }

    impl Clock for StepClock {
        fn tick(&self) -> u64 {
            self.next.fetch_add(1, Ordering::SeqCst) as u64
        }
    }
}
