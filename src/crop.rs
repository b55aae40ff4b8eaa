//! Smart crop: axis-aligned pre-crop, rotate-to-upright, inner crop, edge
//! inset (C8).

use crate::error::{CoreError, ErrorKind};
use crate::geometry::{normalize_angle, rotate, Vector2};
use crate::image::RasterImage;
use crate::rect::BoundingBox;
use crate::transform::{axis_aligned_bounds, center, transform_corners};

pub const DEFAULT_CROP_INSET: u32 = 8;
pub const DEFAULT_MIN_ROTATION_DEG: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
pub struct CropConfig {
    pub padding: f64,
    pub crop_inset: u32,
    pub min_rotation: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self { padding: 0.0, crop_inset: DEFAULT_CROP_INSET, min_rotation: DEFAULT_MIN_ROTATION_DEG }
    }
}

fn inflate(b: BoundingBox, padding: f64) -> BoundingBox {
    if padding <= 0.0 {
        return b;
    }
    let u = rotate(Vector2::new(1.0, 0.0), b.rotation);
    let v = rotate(Vector2::new(0.0, 1.0), b.rotation);
    let origin = b.origin().sub(u.scale(padding)).sub(v.scale(padding));
    BoundingBox { x: origin.x, y: origin.y, width: b.width + 2.0 * padding, height: b.height + 2.0 * padding, rotation: b.rotation }
}

/// Shrinks `(x, y, w, h)` by `inset` on every side, clamping the inset so
/// the result never drops below `1x1`.
fn apply_inset(x: i64, y: i64, w: i64, h: i64, inset: u32) -> (i64, i64, i64, i64) {
    let max_inset_w = (w.saturating_sub(1)) / 2;
    let max_inset_h = (h.saturating_sub(1)) / 2;
    let inset = (inset as i64).min(max_inset_w).min(max_inset_h).max(0);
    (x + inset, y + inset, (w - 2 * inset).max(1), (h - 2 * inset).max(1))
}

/// Crops `original` to the region described by `b` (in `original`'s
/// coordinate space), applying padding, rotation-to-upright, and the edge
/// inset.
pub fn smart_crop(original: &RasterImage, b: BoundingBox, config: &CropConfig) -> Result<RasterImage, CoreError> {
    let inflated = inflate(b, config.padding);

    let corners = transform_corners(inflated);
    let pre_bounds = axis_aligned_bounds(&corners, Some((original.width(), original.height())));
    if pre_bounds.is_empty() {
        return Err(CoreError::new(ErrorKind::CropOutOfImage, "smart_crop", "pre-crop bounds are empty"));
    }

    let pre_crop = original.crop(pre_bounds.min_x, pre_bounds.min_y, pre_bounds.width() as u32, pre_bounds.height() as u32)?;

    let shifted = BoundingBox {
        x: inflated.x - pre_bounds.min_x as f64,
        y: inflated.y - pre_bounds.min_y as f64,
        width: inflated.width,
        height: inflated.height,
        rotation: inflated.rotation,
    };

    let upright = normalize_angle(shifted.rotation);

    let (cx, cy, cw, ch) = if upright.abs() <= config.min_rotation {
        (shifted.x.round() as i64, shifted.y.round() as i64, shifted.width.round() as i64, shifted.height.round() as i64)
    } else {
        let old_w = pre_crop.width() as f64;
        let old_h = pre_crop.height() as f64;
        let old_center = Vector2::new(old_w / 2.0, old_h / 2.0);
        let box_center = center(shifted);

        let rotated = pre_crop.rotate(-upright);
        let new_center = Vector2::new(rotated.width() as f64 / 2.0, rotated.height() as f64 / 2.0);
        let mapped_center = new_center.add(rotate(box_center.sub(old_center), -upright));

        let w = shifted.width.round() as i64;
        let h = shifted.height.round() as i64;
        let x = (mapped_center.x - shifted.width / 2.0).round() as i64;
        let y = (mapped_center.y - shifted.height / 2.0).round() as i64;

        // Clamp to stay within the rotated canvas -- this step never fails.
        let x = x.clamp(0, (rotated.width() as i64 - w).max(0));
        let y = y.clamp(0, (rotated.height() as i64 - h).max(0));
        let w = w.min(rotated.width() as i64);
        let h = h.min(rotated.height() as i64);

        let (x, y, w, h) = apply_inset(x, y, w, h, config.crop_inset);
        return rotated.crop(x, y, w as u32, h as u32);
    };

    let cx = cx.clamp(0, (pre_crop.width() as i64 - cw).max(0));
    let cy = cy.clamp(0, (pre_crop.height() as i64 - ch).max(0));
    let cw = cw.min(pre_crop.width() as i64);
    let ch = ch.min(pre_crop.height() as i64);

    let (x, y, w, h) = apply_inset(cx, cy, cw, ch, config.crop_inset);
    pre_crop.crop(x, y, w as u32, h as u32)
}
