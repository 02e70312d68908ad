//! Paper fibers sticking out of a tear edge.
//!
//! Fibers are never materialized. Space is cut into a hashed grid whose
//! cell size shrinks as density rises; each cell hash decides whether the
//! cell owns a strand and, if so, its origin, angle, length and thickness.
//! A pixel evaluates the strands of the 9x9 cells around it and keeps the
//! strongest response, so overlapping fibers never stack.

use crate::config::FiberParams;
use crate::procedural::math::{clamp01, smoothstep};
use crate::procedural::noise::{hash, hash_2d};

// Truncated pi; the spread cone was tuned against it.
#[allow(clippy::approx_constant)]
const DEG_TO_RAD: f64 = 3.14159 / 180.0;

/// How far (in cells) the field looks for strands.
const CELL_REACH: i32 = 4;

/// One implicit strand, derived from a grid cell hash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strand {
    pub origin_x: f64,
    pub origin_y: f64,
    /// Radians; the strand grows along `(cos, sin)` of this angle.
    pub angle: f64,
    pub length: f64,
    pub thickness: f64,
    pub seed: i32,
}

/// Response of a single strand at a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrandSample {
    pub opacity: f64,
    pub shadow: f64,
    pub color_variation: f64,
    /// Position along the strand axis, base at 0.
    pub dist_from_base: f64,
}

impl StrandSample {
    const EMPTY: StrandSample = StrandSample {
        opacity: 0.0,
        shadow: 0.0,
        color_variation: 0.5,
        dist_from_base: 0.0,
    };
}

/// Evaluate one strand at `(px, py)`.
///
/// The strand tapers quadratically toward its tip, wiggles with a small
/// sine wave that dies out along its length, fades out over the feather
/// window and fades in over the two pixels behind its base. A cast shadow
/// copy sits `0.8 * thickness` to one side at half strength.
pub fn fiber_strand(px: f64, py: f64, strand: &Strand, softness: f64, feather: f64) -> StrandSample {
    let mut result = StrandSample::EMPTY;

    let dx = px - strand.origin_x;
    let dy = py - strand.origin_y;
    let (sin_a, cos_a) = (-strand.angle).sin_cos();
    let local_x = dx * cos_a - dy * sin_a;
    let local_y = dx * sin_a + dy * cos_a;

    if local_x < -2.0 || local_x > strand.length + 2.0 {
        return result;
    }

    let t = local_x / strand.length;
    result.dist_from_base = local_x;

    let taper = strand.thickness * (1.0 - t * t);
    let wave = (local_x * 0.5 + strand.seed as f64 * 0.1).sin() * 0.5 * (1.0 - t);
    let adjusted_y = local_y - wave;
    let dist = adjusted_y.abs();

    if dist > taper * 2.0 {
        return result;
    }

    let soft_edge = taper * (0.3 + softness * 0.7);
    let hard_edge = taper * (1.0 - softness * 0.5);

    let feather_start = 0.4 - feather * 0.3;
    let feather_end = 0.7 + feather * 0.3;
    let tip_fade = 1.0 - smoothstep(feather_start, feather_end, t);
    let base_fade = if local_x < 0.0 {
        smoothstep(-2.0, 0.0, local_x)
    } else {
        1.0
    };

    let opacity = (1.0 - smoothstep(hard_edge, hard_edge + soft_edge, dist)) * tip_fade * base_fade;

    let shadow_dist = (adjusted_y - strand.thickness * 0.8).abs();
    let shadow = (1.0 - smoothstep(hard_edge * 1.2, hard_edge * 1.2 + soft_edge * 1.5, shadow_dist))
        * tip_fade
        * base_fade;

    result.opacity = clamp01(opacity);
    result.shadow = clamp01(shadow * 0.5);
    let color_hash = hash(strand.seed.wrapping_add((local_x * 10.0) as i32) as u32);
    result.color_variation = (color_hash & 0xFF) as f64 / 255.0;
    result
}

/// Fiber controls for one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiberLayer {
    /// 0..100; chance (percent) that a cell owns a strand, also sets cell size.
    pub density: f64,
    pub length: f64,
    pub thickness: f64,
    /// Degrees of angular jitter.
    pub spread: f64,
    pub softness: f64,
    pub feather: f64,
    /// -100..100; scales how far from the edge fibers are looked up.
    pub range: f64,
}

impl From<&FiberParams> for FiberLayer {
    fn from(p: &FiberParams) -> Self {
        Self {
            density: p.density,
            length: p.length,
            thickness: p.thickness,
            spread: p.spread,
            softness: p.softness,
            feather: p.feather,
            range: p.range,
        }
    }
}

impl FiberLayer {
    fn cell_size(&self) -> f64 {
        4.0 / (self.density / 50.0 + 0.5)
    }

    /// Farther than this from the edge, no strand can reach the pixel.
    pub fn reach(&self) -> f64 {
        let range_multiplier = 0.5 + self.range / 100.0;
        self.length * range_multiplier.max(0.1) * 2.5
    }
}

/// Combined fiber response of one edge at a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiberFieldSample {
    pub opacity: f64,
    pub shadow: f64,
    pub color_variation: f64,
    /// Furthest strand position (along its own axis) among strands with
    /// opacity above 0.1 at this pixel.
    pub max_extent: f64,
}

impl FiberFieldSample {
    pub const EMPTY: FiberFieldSample = FiberFieldSample {
        opacity: 0.0,
        shadow: 0.0,
        color_variation: 0.5,
        max_extent: 0.0,
    };
}

/// Strands owned by the cells around `(px, py)`.
///
/// `grad` is the direction of increasing distance; strands grow against it,
/// jittered by up to `spread` degrees.
pub fn candidate_strands(
    px: f64,
    py: f64,
    grad: (f64, f64),
    layer: &FiberLayer,
    seed: i32,
) -> impl Iterator<Item = Strand> {
    let cell = layer.cell_size();
    let cell_x = (px / cell).floor() as i32;
    let cell_y = (py / cell).floor() as i32;
    let probability = layer.density / 100.0;
    let base_angle = (-grad.1).atan2(-grad.0);
    let (length, thickness, spread) = (layer.length, layer.thickness, layer.spread);

    (-CELL_REACH..=CELL_REACH)
        .flat_map(move |dy| (-CELL_REACH..=CELL_REACH).map(move |dx| (cell_x + dx, cell_y + dy)))
        .filter_map(move |(cx, cy)| {
            let h = hash_2d(cx, cy, seed);
            if (h & 0xFF) as f64 / 255.0 > probability {
                return None;
            }

            let origin_x = cx as f64 * cell + ((h >> 8) & 0xFFFF) as f64 / 65536.0 * cell;
            let origin_y = cy as f64 * cell + ((h >> 16) & 0xFFFF) as f64 / 65536.0 * cell;
            let angle_noise = (((h >> 4) & 0xFFF) as f64 / 4096.0 - 0.5) * 2.0;
            let length_var = 0.5 + ((h >> 20) & 0xFF) as f64 / 255.0;
            let thick_var = 0.7 + ((h >> 12) & 0xFF) as f64 / 255.0 * 0.6;

            Some(Strand {
                origin_x,
                origin_y,
                angle: base_angle + angle_noise * spread * DEG_TO_RAD,
                length: length * length_var,
                thickness: thickness * thick_var,
                seed: h as i32,
            })
        })
}

/// Fiber response of one edge at a noise-space pixel.
///
/// # Arguments
/// * `px`, `py` - Noise-space coordinates
/// * `edge_dist` - Signed distance from the edge the fibers grow out of
/// * `grad` - Distance gradient at the pixel
/// * `layer` - Fiber controls
/// * `seed` - Field seed
pub fn fiber_field(
    px: f64,
    py: f64,
    edge_dist: f64,
    grad: (f64, f64),
    layer: &FiberLayer,
    seed: i32,
) -> FiberFieldSample {
    let mut result = FiberFieldSample::EMPTY;

    if layer.density <= 0.0 || layer.length <= 0.0 {
        return result;
    }
    if edge_dist.abs() > layer.reach() {
        return result;
    }

    for strand in candidate_strands(px, py, grad, layer, seed) {
        let s = fiber_strand(px, py, &strand, layer.softness, layer.feather);
        if s.opacity > result.opacity {
            result.opacity = s.opacity;
            result.color_variation = s.color_variation;
        }
        result.shadow = result.shadow.max(s.shadow);
        if s.opacity > 0.1 {
            result.max_extent = result.max_extent.max(s.dist_from_base);
        }
    }

    result.opacity = clamp01(result.opacity);
    result.shadow = clamp01(result.shadow);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TornPaperConfig;

    fn horizontal(length: f64, thickness: f64) -> Strand {
        Strand {
            origin_x: 0.0,
            origin_y: 0.0,
            angle: 0.0,
            length,
            thickness,
            seed: 0,
        }
    }

    #[test]
    fn test_strand_rejects_outside_axis_window() {
        let s = horizontal(10.0, 1.0);
        assert_eq!(fiber_strand(-3.0, 0.0, &s, 0.5, 0.5).opacity, 0.0);
        assert_eq!(fiber_strand(12.5, 0.0, &s, 0.5, 0.5).opacity, 0.0);
        assert_eq!(fiber_strand(3.0, 5.0, &s, 0.5, 0.5).opacity, 0.0);
    }

    #[test]
    fn test_strand_body_is_opaque_near_base() {
        let s = horizontal(20.0, 2.0);
        // At x=0 the wave is sin(0) * 0.5 = 0, so y=0 is dead center.
        let hit = fiber_strand(0.0, 0.0, &s, 0.0, 0.0);
        assert!(hit.opacity > 0.99);
        assert_eq!(hit.dist_from_base, 0.0);
        assert!((0.0..=1.0).contains(&hit.color_variation));
    }

    #[test]
    fn test_strand_feather_fades_tip() {
        let s = horizontal(20.0, 2.0);
        let near_tip = fiber_strand(19.9, 0.0, &s, 0.0, 1.0);
        assert!(near_tip.opacity < 0.05);
    }

    #[test]
    fn test_strand_rotation_follows_angle() {
        let s = Strand {
            angle: std::f64::consts::FRAC_PI_2,
            ..horizontal(20.0, 2.0)
        };
        // Pointing down +y: a point straight below the origin is on-axis.
        let hit = fiber_strand(0.0, 5.0, &s, 0.0, 0.0);
        assert!(hit.opacity > 0.99);
        assert!((hit.dist_from_base - 5.0).abs() < 1e-9);
        let miss = fiber_strand(6.0, 0.0, &s, 0.0, 0.0);
        assert_eq!(miss.opacity, 0.0);
    }

    #[test]
    fn test_field_off_when_density_or_length_zero() {
        let cfg = TornPaperConfig::default();
        let mut layer = FiberLayer::from(&cfg.fibers);
        layer.density = 0.0;
        assert_eq!(fiber_field(5.0, 5.0, 0.0, (1.0, 0.0), &layer, 1), FiberFieldSample::EMPTY);

        let mut layer = FiberLayer::from(&cfg.fibers);
        layer.length = 0.0;
        assert_eq!(fiber_field(5.0, 5.0, 0.0, (1.0, 0.0), &layer, 1), FiberFieldSample::EMPTY);
    }

    #[test]
    fn test_field_rejects_far_pixels() {
        let cfg = TornPaperConfig::default();
        let layer = FiberLayer::from(&cfg.fibers);
        let far = layer.reach() + 1.0;
        assert_eq!(fiber_field(5.0, 5.0, far, (1.0, 0.0), &layer, 1), FiberFieldSample::EMPTY);
        assert_eq!(fiber_field(5.0, 5.0, -far, (1.0, 0.0), &layer, 1), FiberFieldSample::EMPTY);
    }

    #[test]
    fn test_field_is_max_of_strands() {
        let layer = FiberLayer {
            density: 100.0,
            length: 12.0,
            thickness: 1.5,
            spread: 60.0,
            softness: 0.5,
            feather: 0.5,
            range: 0.0,
        };
        let mut saw_fiber = false;
        for i in 0..40 {
            let px = i as f64 * 0.73;
            let py = i as f64 * 0.41;
            let grad = (-1.0, 0.0);
            let field = fiber_field(px, py, 0.0, grad, &layer, 77);
            let best = candidate_strands(px, py, grad, &layer, 77)
                .map(|s| fiber_strand(px, py, &s, layer.softness, layer.feather).opacity)
                .fold(0.0_f64, f64::max);
            assert_eq!(field.opacity, best);
            assert!(field.opacity <= 1.0);
            saw_fiber |= field.opacity > 0.0;
        }
        assert!(saw_fiber);
    }

    #[test]
    fn test_field_deterministic() {
        let cfg = TornPaperConfig::default();
        let layer = FiberLayer::from(&cfg.fibers);
        let a = fiber_field(31.5, 12.25, 2.0, (0.6, 0.8), &layer, 1000);
        let b = fiber_field(31.5, 12.25, 2.0, (0.6, 0.8), &layer, 1000);
        assert_eq!(a, b);
    }
}
