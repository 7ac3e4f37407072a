//! Angle & Offset Geometry
//!
//! Pure math over landmark positions. Everything here operates on the
//! normalized 2-D image plane; depth is deliberately ignored because the
//! camera views the plank side-on and depth estimates are the noisiest
//! component of the pose output.

use super::Landmark;

/// Angle in degrees at vertex `b` formed by the rays `b -> a` and `b -> c`.
///
/// Always in [0, 180]. The cosine argument is clamped to [-1, 1] before
/// `acos` to guard against floating-point drift pushing it out of domain.
///
/// Precondition: neither `a` nor `c` coincides with `b`. Callers select
/// distinct body parts, so a zero-magnitude ray cannot occur in practice.
pub fn angle_between(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Absolute horizontal offset between two landmarks, in normalized units.
#[inline]
pub fn horizontal_offset(a: &Landmark, b: &Landmark) -> f64 {
    (a.x - b.x).abs()
}

/// Angle of the segment between two landmarks measured from the horizontal,
/// in degrees. A perfectly vertical stack yields 90.
#[inline]
pub fn stack_angle(upper: &Landmark, lower: &Landmark) -> f64 {
    let dy = (upper.y - lower.y).abs();
    let dx = (upper.x - lower.x).abs();
    dy.atan2(dx).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> Landmark {
        Landmark::new(x, y, 1.0)
    }

    #[test]
    fn test_straight_line_is_180() {
        let angle = angle_between(&at(0.0, 0.5), &at(0.5, 0.5), &at(1.0, 0.5));
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle_is_90() {
        let angle = angle_between(&at(0.5, 0.0), &at(0.5, 0.5), &at(1.0, 0.5));
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_folded_back_is_0() {
        let angle = angle_between(&at(1.0, 0.5), &at(0.5, 0.5), &at(1.0, 0.5));
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn test_angle_is_symmetric() {
        let a = at(0.12, 0.83);
        let b = at(0.47, 0.51);
        let c = at(0.91, 0.66);
        assert!((angle_between(&a, &b, &c) - angle_between(&c, &b, &a)).abs() < 1e-12);
    }

    #[test]
    fn test_angle_always_in_range() {
        // Sweep a grid of triples; the result must stay in [0, 180].
        let coords = [0.0, 0.1, 0.33, 0.5, 0.77, 1.0];
        for &ax in &coords {
            for &cy in &coords {
                let a = at(ax, 0.9);
                let b = at(0.5, 0.5);
                let c = at(0.2, cy);
                let angle = angle_between(&a, &b, &c);
                assert!((0.0..=180.0).contains(&angle), "angle {} out of range", angle);
            }
        }
    }

    #[test]
    fn test_cosine_clamped_for_collinear_drift() {
        // Points chosen so the raw cosine computes to just above 1.0
        // without clamping (magnitudes of ~1e-1 with rounding error).
        let a = at(0.1 + 1e-16, 0.1);
        let b = at(0.2, 0.2);
        let c = at(0.3, 0.3);
        let angle = angle_between(&a, &b, &c);
        assert!(angle.is_finite());
        assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn test_horizontal_offset() {
        assert!((horizontal_offset(&at(0.3, 0.9), &at(0.55, 0.1)) - 0.25).abs() < 1e-12);
        assert!((horizontal_offset(&at(0.55, 0.9), &at(0.3, 0.1)) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_stack_angle_vertical() {
        let angle = stack_angle(&at(0.5, 0.3), &at(0.5, 0.7));
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_stack_angle_diagonal() {
        let angle = stack_angle(&at(0.5, 0.5), &at(0.7, 0.7));
        assert!((angle - 45.0).abs() < 1e-9);
    }
}
