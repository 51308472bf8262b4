use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Doubled signed area of `(a, b, p)`. Positive when `p` lies clockwise of
/// `a -> b` in a +Y-down frame.
///
/// The endpoints are evaluated in a fixed order, so
/// `edge_function(a, b, p) == -edge_function(b, a, p)` holds bit for bit and
/// two triangles sharing an edge never both claim a sample on it.
pub fn edge_function(a: Point2<f32>, b: Point2<f32>, p: Point2<f32>) -> f32 {
    let raw = |a: Point2<f32>, b: Point2<f32>| {
        (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
    };
    if (a.y, a.x) <= (b.y, b.x) {
        raw(a, b)
    } else {
        -raw(b, a)
    }
}

/// Top-left fill rule for the directed edge `a -> b` of a triangle wound
/// clockwise in a +Y-down frame: top edges run exactly rightwards, left edges
/// run upwards.
#[inline(always)]
pub fn is_top_left(a: Point2<f32>, b: Point2<f32>) -> bool {
    let d = b - a;
    d.y < 0.0 || (d.y == 0.0 && d.x > 0.0)
}

/// Reweights screen-space barycentrics by `1/w` so attributes interpolate
/// linearly in clip space rather than in screen space.
///
/// Returns `None` when the weights collapse numerically.
pub fn perspective_correct_barycentric(bary: Vector3<f32>, w: [f32; 3]) -> Option<Vector3<f32>> {
    let recip = |w: f32| if w.abs() > EPSILON { 1.0 / w } else { 1.0 };
    let weighted = Vector3::new(bary.x * recip(w[0]), bary.y * recip(w[1]), bary.z * recip(w[2]));

    let sum = weighted.x + weighted.y + weighted.z;
    if sum.abs() < EPSILON {
        return None;
    }
    Some(weighted / sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_function_is_antisymmetric() {
        let a = Point2::new(0.3, 7.1);
        let b = Point2::new(5.9, 1.7);
        for p in [Point2::new(2.5, 3.5), Point2::new(0.5, 0.5), Point2::new(9.0, -4.0)] {
            assert_eq!(edge_function(a, b, p), -edge_function(b, a, p));
        }
    }

    #[test]
    fn clockwise_triangle_has_positive_area() {
        // Top-left, top-right, bottom-left with +Y down.
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 0.0);
        let c = Point2::new(0.0, 4.0);
        assert_eq!(edge_function(a, b, c), 16.0);
        assert!(edge_function(a, c, b) < 0.0);
    }

    #[test]
    fn exactly_one_direction_of_an_edge_is_top_left() {
        let a = Point2::new(1.0, 1.0);
        for b in [Point2::new(3.0, 1.0), Point2::new(1.0, 3.0), Point2::new(4.0, -2.0)] {
            assert_ne!(is_top_left(a, b), is_top_left(b, a));
        }
        // Top edge of a clockwise triangle runs rightwards.
        assert!(is_top_left(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)));
    }

    #[test]
    fn equal_depths_leave_weights_unchanged() {
        let bary = Vector3::new(0.2, 0.3, 0.5);
        let corrected = perspective_correct_barycentric(bary, [2.0, 2.0, 2.0]).unwrap();
        assert!((corrected - bary).norm() < 1e-6);
    }

    #[test]
    fn nearer_vertex_gains_weight_at_midpoint() {
        let bary = Vector3::new(0.5, 0.5, 0.0);
        let corrected = perspective_correct_barycentric(bary, [1.0, 3.0, 1.0]).unwrap();
        assert!(corrected.x > corrected.y);
        assert!((corrected.x - 0.75).abs() < 1e-6);
    }
}
