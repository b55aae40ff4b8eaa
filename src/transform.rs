//! Coordinate transforms between display/processing and original image space
//! (C7). Scaling never rounds early; integer snapping only happens where a
//! pixel index is required by the caller.

use crate::geometry::{rotate, Vector2};
use crate::rect::BoundingBox;

pub fn scale_point(p: Vector2, s: f64) -> Vector2 {
    p.scale(s)
}

pub fn scale_region(region: &[(i64, i64)], s: f64) -> Vec<Vector2> {
    region.iter().map(|&(x, y)| Vector2::from((x, y)).scale(s)).collect()
}

pub fn scale_box(b: BoundingBox, s: f64) -> BoundingBox {
    BoundingBox { x: b.x * s, y: b.y * s, width: b.width * s, height: b.height * s, rotation: b.rotation }
}

/// The four corners of `b` in order `[origin, origin + W*u, origin + W*u +
/// H*v, origin + H*v]`, where `u` is the rectangle's local +x axis and `v`
/// its local +y axis.
pub fn transform_corners(b: BoundingBox) -> [Vector2; 4] {
    let u = rotate(Vector2::new(1.0, 0.0), b.rotation);
    let v = rotate(Vector2::new(0.0, 1.0), b.rotation);
    let origin = b.origin();
    let wu = u.scale(b.width);
    let hv = v.scale(b.height);

    [origin, origin.add(wu), origin.add(wu).add(hv), origin.add(hv)]
}

/// Axis-aligned integer bounds `[min, max)` of `corners`, floor/ceil clamped
/// and optionally clipped to `[0, w) x [0, h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisAlignedBounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl AxisAlignedBounds {
    pub const fn width(self) -> i64 {
        (self.max_x - self.min_x).max(0)
    }

    pub const fn height(self) -> i64 {
        (self.max_y - self.min_y).max(0)
    }

    pub const fn is_empty(self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }
}

pub fn axis_aligned_bounds(corners: &[Vector2], clip: Option<(u32, u32)>) -> AxisAlignedBounds {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in corners {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let mut bounds =
        AxisAlignedBounds { min_x: min_x.floor() as i64, min_y: min_y.floor() as i64, max_x: max_x.ceil() as i64, max_y: max_y.ceil() as i64 };

    if let Some((w, h)) = clip {
        bounds.min_x = bounds.min_x.clamp(0, w as i64);
        bounds.min_y = bounds.min_y.clamp(0, h as i64);
        bounds.max_x = bounds.max_x.clamp(0, w as i64);
        bounds.max_y = bounds.max_y.clamp(0, h as i64);
    }

    bounds
}

pub fn center(b: BoundingBox) -> Vector2 {
    let u = rotate(Vector2::new(1.0, 0.0), b.rotation);
    let v = rotate(Vector2::new(0.0, 1.0), b.rotation);
    b.origin().add(u.scale(b.width / 2.0)).add(v.scale(b.height / 2.0))
}
