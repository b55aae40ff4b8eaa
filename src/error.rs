//! The error taxonomy shared by every pipeline stage (C14).
//!
//! Each stage builds its own [`CoreError`] with a stable [`ErrorKind`] plus
//! enough context (`operation`, `path`, `seed`) to satisfy the logging
//! contract without re-deriving it at each call site. Propagation is always
//! via `?` -- no stage recovers from another stage's error.

use std::fmt;
use std::path::PathBuf;

use derive_more::Display;

use crate::geometry::Vector2;

/// Taxonomy of failure kinds. This is a classification, not a type
/// hierarchy -- every stage produces the same [`CoreError`] carrier.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    DecodeFailed,
    EmptyRegion,
    RegionTooLarge,
    RegionTooSmall,
    CropOutOfImage,
    IoError,
    Cancelled,
}

/// A pipeline failure. Carries the fields the logging contract in section 7
/// asks for: `(operation, path, seed, error_kind, message)`.
#[derive(Debug, Clone)]
pub struct CoreError {
    pub kind: ErrorKind,
    pub operation: &'static str,
    pub path: Option<PathBuf>,
    pub seed: Option<Vector2>,
    pub message: String,
}

impl CoreError {
    pub fn new(kind: ErrorKind, operation: &'static str, message: impl Into<String>) -> Self {
        Self { kind, operation, path: None, seed: None, message: message.into() }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: Vector2) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Logs this error at the level its kind warrants, as an
    /// `(operation, path, seed, error_kind, message)` tuple. `Cancelled` is
    /// expected traffic so it logs at `debug`; everything else logs at
    /// `warn` -- the pipeline never panics on these, so `error` is reserved
    /// for truly unexpected states.
    pub fn log(&self) {
        let level = if self.kind == ErrorKind::Cancelled { log::Level::Debug } else { log::Level::Warn };
        log::log!(
            level,
            "{} path={:?} seed={:?} kind={} message={}",
            self.operation,
            self.path,
            self.seed,
            self.kind,
            self.message
        );
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.operation, self.kind, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " [path={}]", path.display())?;
        }
        if let Some(seed) = self.seed {
            write!(f, " [seed=({:.1}, {:.1})]", seed.x, seed.y)?;
        }
        Ok(())
    }
}

impl std::error::Error for CoreError {}

pub type Result<T> = std::result::Result<T, CoreError>;
