//! Scalar helpers shared by every procedural layer.
//!
//! All functions operate in `f64` and are branch-light so they can sit in
//! the per-pixel hot path.

/// Clamp a value to the unit interval.
#[inline]
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Linear interpolation from `a` to `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Cubic Hermite ease of an already-normalized parameter.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Hermite smoothstep between two edges.
///
/// `edge0` may be greater than `edge1`, which yields a falling ramp.
///
/// # Arguments
/// * `edge0` - Input value mapped to 0
/// * `edge1` - Input value mapped to 1
/// * `x` - Value to ease
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    fade(clamp01((x - edge0) / (edge1 - edge0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_smoothstep_reversed_edges_fall() {
        assert_eq!(smoothstep(1.1, 0.98, 0.9), 1.0);
        assert_eq!(smoothstep(1.1, 0.98, 1.2), 0.0);
    }

    #[test]
    fn test_clamp01_and_lerp() {
        assert_eq!(clamp01(-0.3), 0.0);
        assert_eq!(clamp01(1.7), 1.0);
        assert_eq!(lerp(2.0, 4.0, 0.25), 2.5);
    }
}
