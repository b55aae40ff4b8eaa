//! Monotone-chain convex hull (C4).

use crate::geometry::Vector2;

fn cross(o: Vector2, a: Vector2, b: Vector2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Computes the convex hull of `points`, returned counter-clockwise without
/// a repeated first vertex. Collinear points are dropped (strict left turns
/// only). Fewer than 3 distinct points are returned as-is.
pub fn convex_hull(points: &[Vector2]) -> Vec<Vector2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap().then(a.y.partial_cmp(&b.y).unwrap()));
    pts.dedup_by(|a, b| a.x == b.x && a.y == b.y);

    if pts.len() < 3 {
        return pts;
    }

    let n = pts.len();
    let mut lower: Vec<Vector2> = Vec::with_capacity(n);
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Vector2> = Vec::with_capacity(n);
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Twice the signed area of the polygon (positive iff counter-clockwise).
pub fn signed_area_x2(polygon: &[Vector2]) -> f64 {
    let mut area = 0.0;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        area += a.x * b.y - b.x * a.y;
    }
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hull_of_square_is_ccw() {
        let pts = [
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(10.0, 10.0),
            Vector2::new(0.0, 10.0),
            Vector2::new(5.0, 5.0), // interior point, must be dropped
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(signed_area_x2(&hull) > 0.0);
    }

    #[test]
    fn collinear_points_are_dropped() {
        let pts = [
            Vector2::new(0.0, 0.0),
            Vector2::new(5.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(10.0, 10.0),
            Vector2::new(0.0, 10.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Vector2::new(5.0, 0.0)));
    }

    #[test]
    fn fewer_than_three_points_returned_as_is() {
        let pts = [Vector2::new(1.0, 1.0), Vector2::new(2.0, 2.0)];
        assert_eq!(convex_hull(&pts), pts.to_vec());
    }

    #[test]
    fn hull_of_random_clouds_is_always_ccw_and_encloses_every_point() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let n = rng.gen_range(3..200);
            let pts: Vec<Vector2> =
                (0..n).map(|_| Vector2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0))).collect();

            let hull = convex_hull(&pts);
            if hull.len() < 3 {
                continue;
            }
            assert!(signed_area_x2(&hull) > 0.0, "hull must be counter-clockwise");

            for p in &pts {
                // Every point lies on the non-negative side of each hull edge
                // (allowing for floating-point slack), i.e. inside or on the
                // hull boundary.
                for i in 0..hull.len() {
                    let a = hull[i];
                    let b = hull[(i + 1) % hull.len()];
                    assert!(cross(a, b, *p) >= -1e-6, "point outside hull edge");
                }
            }
        }
    }
}
