//! Color predicates consumed by the flood-fill stage.

use std::sync::Arc;

/// An 8-bit RGB triple. Alpha is preserved by [`crate::image::RasterImage`]
/// but never reaches this type -- the core only reasons about color in RGB.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mean of the three channels: `(r+g+b)/3`.
    pub const fn brightness(self) -> u32 {
        (self.r as u32 + self.g as u32 + self.b as u32) / 3
    }
}

impl From<image::Rgba<u8>> for Rgb {
    fn from(p: image::Rgba<u8>) -> Self {
        Self { r: p.0[0], g: p.0[1], b: p.0[2] }
    }
}

/// A boolean predicate over `(pixel, seed_pixel)`. Must be pure and cheap to
/// call up to `max_pixels` times; the flood-fill makes no ordering guarantee
/// beyond "called once per accepted pixel" for stateful callers.
///
/// The predicate keeps the seed pixel in its signature even though the only
/// predicate this crate ships ignores it -- this leaves room for
/// seed-relative predicates without changing the flood-fill's contract.
pub type Predicate = Arc<dyn Fn(Rgb, Rgb) -> bool + Send + Sync>;

/// Default "white boundary" predicate: accepts any pixel darker than
/// `threshold` (exclusive), ignoring the seed pixel.
pub fn white_boundary(threshold: u8) -> Predicate {
    let threshold = threshold as u32;
    Arc::new(move |pixel, _seed| pixel.brightness() < threshold)
}
