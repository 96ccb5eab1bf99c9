//! Polygon helpers shared by the AK/IK per-block validator and the
//! inter-block containment pass (spec.md §4.4). All comparisons use an
//! explicit tolerance — never exact float equality (spec.md §9 "Numeric
//! robustness").

/// Shoelace signed area. Positive for counter-clockwise point order,
/// negative for clockwise (spec.md §3 invariant 6).
pub fn signed_area(points: &[(f64, f64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % points.len()];
        sum += x0 * y1 - x1 * y0;
    }
    sum / 2.0
}

/// First and last point coincide within `tolerance` mm.
pub fn polygon_is_closed(points: &[(f64, f64)], tolerance: f64) -> bool {
    match (points.first(), points.last()) {
        (Some(a), Some(b)) => ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() <= tolerance,
        _ => false,
    }
}

/// Ray-casting point-in-polygon test. `polygon` may be closed (repeated
/// first/last point) or not; both are handled identically since the cast
/// ignores zero-length edges.
pub fn point_in_polygon(point: (f64, f64), polygon: &[(f64, f64)]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let (px, py) = point;
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        let crosses = (yi > py) != (yj > py);
        if crosses {
            let x_intersect = xj + (py - yj) / (yi - yj) * (xi - xj);
            if px < x_intersect {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccw_square_has_positive_area() {
        let sq = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(signed_area(&sq) > 0.0);
    }

    #[test]
    fn cw_square_has_negative_area() {
        let sq = [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)];
        assert!(signed_area(&sq) < 0.0);
    }

    #[test]
    fn point_inside_square() {
        let sq = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(point_in_polygon((5.0, 5.0), &sq));
        assert!(!point_in_polygon((50.0, 50.0), &sq));
    }

    #[test]
    fn closure_within_tolerance() {
        let pts = [(0.0, 0.0), (10.0, 0.0), (0.005, 0.002)];
        assert!(polygon_is_closed(&pts, 0.01));
        assert!(!polygon_is_closed(&pts, 0.001));
    }
}
