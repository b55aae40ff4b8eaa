//! 8-connected bounded flood-fill from a seed point (C3).

use std::collections::VecDeque;

use crate::error::{CoreError, ErrorKind};
use crate::geometry::{in_bounds, Vector2};
use crate::image::RasterImage;
use crate::predicate::Predicate;

/// A finite sequence of accepted pixel coordinates, in image space. The
/// flood-fill guarantees point-wise uniqueness (visited-set semantics).
pub type Region = Vec<(i64, i64)>;

pub const DEFAULT_MAX_PIXELS: usize = 2_000_000;

/// 8-connected neighbor offsets in a fixed order, for deterministic enqueue
/// ordering: starting due north and sweeping clockwise.
const NEIGHBORS: [(i64, i64); 8] =
    [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];

/// Runs an 8-connected BFS from `seed`, accepting pixels for which
/// `predicate(pixel, seed_pixel)` holds, capped at `max_pixels`.
pub fn flood_fill(
    image: &RasterImage,
    seed: Vector2,
    predicate: &Predicate,
    max_pixels: usize,
) -> Result<Region, CoreError> {
    let (w, h) = (image.width(), image.height());
    let (sx, sy) = seed.round_to_pixel();

    if !in_bounds(w, h, sx, sy) {
        // The component-level contract calls this `OutOfBounds`; the unified
        // taxonomy in the error handling design folds it into `InvalidInput`
        // ("seed off-image").
        return Err(CoreError::new(ErrorKind::InvalidInput, "flood_fill", "seed is outside the image")
            .with_seed(seed));
    }

    let seed_pixel = image.get_pixel(sx as u32, sy as u32);

    if !predicate(seed_pixel, seed_pixel) {
        return Err(CoreError::new(ErrorKind::EmptyRegion, "flood_fill", "seed pixel fails the predicate")
            .with_seed(seed));
    }

    let mut visited = vec![false; w as usize * h as usize];
    let idx = |x: i64, y: i64| (y as usize) * (w as usize) + (x as usize);

    let mut queue = VecDeque::new();
    let mut region = Region::new();

    visited[idx(sx, sy)] = true;
    queue.push_back((sx, sy));
    region.push((sx, sy));

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (x + dx, y + dy);
            if !in_bounds(w, h, nx, ny) {
                continue;
            }
            let i = idx(nx, ny);
            if visited[i] {
                continue;
            }
            let pixel = image.get_pixel(nx as u32, ny as u32);
            if !predicate(pixel, seed_pixel) {
                continue;
            }

            if region.len() >= max_pixels {
                return Err(CoreError::new(
                    ErrorKind::RegionTooLarge,
                    "flood_fill",
                    format!("region exceeded the {max_pixels}-pixel cap"),
                )
                .with_seed(seed));
            }

            visited[i] = true;
            region.push((nx, ny));
            queue.push_back((nx, ny));
        }
    }

    Ok(region)
}
