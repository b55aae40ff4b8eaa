//! PCA principal-axis estimation, golden-section angle refinement, and the
//! calipers/PCA chooser (C5).

use crate::geometry::{normalize_angle, Vector2};

pub const DEFAULT_REFINE_WINDOW_DEG: f64 = 3.0;
pub const DEFAULT_REFINE_ITERATIONS: u32 = 10;

const GOLDEN_RATIO: f64 = 0.618_033_988_749_895;

/// Projects `p` (relative to `center`) onto the axis perpendicular to
/// `angle_deg`: `project(p, a) = (p.x - c.x) sin a + (p.y - c.y) cos a`.
fn project(p: Vector2, center: Vector2, angle_deg: f64) -> f64 {
    let a = angle_deg.to_radians();
    (p.x - center.x) * a.sin() + (p.y - center.y) * a.cos()
}

/// `max(project) - min(project)` over all points, at a given angle.
pub fn projected_height(points: &[Vector2], center: Vector2, angle_deg: f64) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &p in points {
        let v = project(p, center, angle_deg);
        min = min.min(v);
        max = max.max(v);
    }
    if points.is_empty() { 0.0 } else { max - min }
}

/// The PCA principal-axis angle, in degrees, or `None` if the covariance
/// matrix is degenerate (negative discriminant, or a near-zero eigenvector).
pub fn pca_angle(points: &[Vector2]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    sxx /= n;
    sxy /= n;
    syy /= n;

    let trace = sxx + syy;
    let det = sxx * syy - sxy * sxy;
    let discriminant = trace * trace / 4.0 - det;
    if discriminant < 0.0 {
        return None;
    }

    let lambda = trace / 2.0 - discriminant.sqrt();
    let (ex, ey) = (lambda - syy, sxy);

    const EPS: f64 = 1e-9;
    if ex.abs() < EPS && ey.abs() < EPS {
        return None;
    }

    Some(ey.atan2(ex).to_degrees())
}

/// Golden-section search minimizing [`projected_height`] over
/// `[candidate - window, candidate + window]`, returning the midpoint of the
/// final bracket after `iterations` narrowing steps.
pub fn refine_angle(
    points: &[Vector2],
    candidate_deg: f64,
    center: Vector2,
    window_deg: f64,
    iterations: u32,
) -> f64 {
    let mut lo = candidate_deg - window_deg;
    let mut hi = candidate_deg + window_deg;

    let f = |a: f64| projected_height(points, center, a);

    let mut x1 = hi - GOLDEN_RATIO * (hi - lo);
    let mut x2 = lo + GOLDEN_RATIO * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    for _ in 0..iterations {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - GOLDEN_RATIO * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + GOLDEN_RATIO * (hi - lo);
            f2 = f(x2);
        }
    }

    (lo + hi) / 2.0
}

/// Chooses between the rotating-calipers angle and an optional PCA angle:
/// `calipers_deg` wins unless the PCA angle disagrees by more than 5 degrees
/// *and* strictly minimizes the projected height.
pub fn best_angle(points: &[Vector2], center: Vector2, calipers_deg: f64, pca_deg: Option<f64>) -> f64 {
    let Some(pca_deg) = pca_deg else { return calipers_deg };

    if normalize_angle(calipers_deg - pca_deg).abs() <= 5.0 {
        return calipers_deg;
    }

    let h_calipers = projected_height(points, center, calipers_deg);
    let h_pca = projected_height(points, center, pca_deg);

    if h_pca < h_calipers { pca_deg } else { calipers_deg }
}
