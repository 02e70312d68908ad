//! Tear edge placement.
//!
//! Every edge is a scalar offset along the signed distance axis: a pixel at
//! distance `d` lies past an edge `e` when `d > e`. Offsets are recomputed
//! per pixel from noise and never stored.
//!
//! ## Displacement terms
//! - **Roughness**: 4-octave fBm at `rough_scale * scale`, low-frequency wander
//! - **Jaggedness**: ridged multifractal plus sparse value-noise spikes
//! - **Notch**: Worley cells below 0.3 push the edge in sharp dents

use crate::config::{EdgeParams, TornPaperConfig};
use crate::procedural::noise::{fbm_2d, ridged_multifractal, value_noise_2d, worley_noise};

/// Minimum distance kept between the outer and inner edge.
pub const MIN_EDGE_SEPARATION: f64 = 2.0;

/// Noise-driven offset of one edge at a point.
///
/// # Arguments
/// * `px`, `py` - Noise-space coordinates
/// * `seed` - Edge seed
/// * `edge` - Shape controls, in slider units
/// * `scale` - Master scale
pub fn calc_edge_displacement(px: f64, py: f64, seed: i32, edge: &EdgeParams, scale: f64) -> f64 {
    let mut disp = 0.0;

    if edge.roughness > 0.0 {
        let s = edge.rough_scale * scale;
        disp += fbm_2d(px / s, py / s, seed, 4, 0.5) * edge.roughness * scale;
    }

    if edge.jaggedness > 0.0 {
        let s = 20.0 * scale;
        let jag = ridged_multifractal(px / s, py / s, seed.wrapping_add(100), 4);
        disp += (jag - 0.5) * edge.jaggedness * 0.8 * scale;

        let s = 8.0 * scale;
        let spike = value_noise_2d(px / s, py / s, seed.wrapping_add(300));
        if spike > 0.7 {
            disp += (spike - 0.7) * 3.0 * edge.jaggedness * 0.5 * scale;
        }
    }

    if edge.notch > 0.0 {
        let s = 40.0 * scale;
        let notch = worley_noise(px / s, py / s, seed.wrapping_add(500));
        if notch < 0.3 {
            disp += (0.3 - notch) * edge.notch * scale;
        }
    }

    disp
}

/// Resolved edge positions for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeBoundaries {
    pub outer: f64,
    pub inner: f64,
    /// Middle edges; equal to `outer` when disabled.
    pub middle: [f64; 2],
}

impl EdgeBoundaries {
    /// Place all edges for a noise-space point.
    ///
    /// The inner edge is shifted inward by `(100 - expansion) / 50` times a
    /// rough upper estimate of its own displacement. That estimate is not a
    /// bound, so the pair is then forced at least `MIN_EDGE_SEPARATION` apart
    /// around their midpoint.
    pub fn resolve(nx: f64, ny: f64, cfg: &TornPaperConfig) -> Self {
        let scale = cfg.master_scale;
        let inner = &cfg.inner.edge;

        let outer_disp = calc_edge_displacement(nx, ny, cfg.seed, &cfg.outer, scale);
        let inner_raw = calc_edge_displacement(
            nx + 1000.0,
            ny + 1000.0,
            cfg.seed.wrapping_add(5000),
            inner,
            scale,
        );
        let expansion_factor = (100.0 - cfg.inner.expansion) / 50.0;
        let max_estimate =
            (inner.roughness + inner.jaggedness * 0.5 + inner.notch * 0.3) * scale * expansion_factor;
        let inner_disp = inner_raw - max_estimate;

        let half_gap = cfg.gap_width / 2.0;
        let mut outer = -half_gap + outer_disp;
        let mut inner = half_gap + inner_disp;

        if inner < outer + MIN_EDGE_SEPARATION {
            let mid = (inner + outer) / 2.0;
            inner = mid + MIN_EDGE_SEPARATION / 2.0;
            outer = mid - MIN_EDGE_SEPARATION / 2.0;
        }

        let mut middle = [outer; 2];
        let offsets = [(2000.0, 10000), (3000.0, 15000)];
        for (i, m) in cfg.middle.iter().enumerate() {
            if m.amount <= 0.0 {
                continue;
            }
            let (offset, seed_offset) = offsets[i];
            let shape = EdgeParams {
                roughness: m.roughness,
                rough_scale: 100.0,
                jaggedness: m.roughness * 0.2,
                notch: 0.0,
            };
            let disp = calc_edge_displacement(
                nx + offset,
                ny + offset,
                cfg.seed.wrapping_add(seed_offset),
                &shape,
                scale,
            );
            let base = outer + (inner - outer) * m.position;
            middle[i] = (base + disp * 0.4).min(inner - 1.0).max(outer + 1.0);
        }

        Self { outer, inner, middle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TornPaperSettings;

    fn flat() -> EdgeParams {
        EdgeParams {
            roughness: 0.0,
            rough_scale: 100.0,
            jaggedness: 0.0,
            notch: 0.0,
        }
    }

    #[test]
    fn test_flat_edge_has_no_displacement() {
        for i in 0..50 {
            let p = i as f64 * 13.7;
            assert_eq!(calc_edge_displacement(p, -p, 9, &flat(), 1.0), 0.0);
        }
    }

    #[test]
    fn test_roughness_bounded_by_amount() {
        let edge = EdgeParams { roughness: 10.0, ..flat() };
        for i in 0..200 {
            let p = i as f64 * 7.3;
            let d = calc_edge_displacement(p, p * 0.5, 1, &edge, 1.0);
            assert!(d.abs() <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn test_notch_only_pushes_inward() {
        let edge = EdgeParams { notch: 5.0, ..flat() };
        for i in 0..200 {
            let p = i as f64 * 3.1;
            let d = calc_edge_displacement(p, p * 1.3, 4, &edge, 1.0);
            assert!((0.0..=1.5 + 1e-9).contains(&d));
        }
    }

    #[test]
    fn test_inner_never_closer_than_two() {
        let mut settings = TornPaperSettings::default();
        settings.outer_edge.roughness = 300.0;
        settings.outer_edge.jaggedness = 80.0;
        settings.inner_edge.roughness = 300.0;
        settings.inner_edge.notch = 100.0;
        settings.inner_edge.expansion = 1.0;
        for gap in [-200.0, -50.0, 0.0, 40.0] {
            settings.basic.gap_width = gap;
            let cfg = settings.resolve(1.0).unwrap();
            for i in 0..400 {
                let x = (i % 20) as f64 * 17.0;
                let y = (i / 20) as f64 * 11.0;
                let b = EdgeBoundaries::resolve(x, y, &cfg);
                assert!(b.inner >= b.outer + MIN_EDGE_SEPARATION - 1e-9);
                for m in b.middle {
                    assert!(m >= b.outer && m <= b.inner);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_edges_collapse_symmetrically() {
        let mut settings = TornPaperSettings::default();
        settings.outer_edge.roughness = 0.0;
        settings.outer_edge.jaggedness = 0.0;
        settings.outer_edge.notch = 0.0;
        settings.inner_edge.roughness = 0.0;
        settings.inner_edge.jaggedness = 0.0;
        settings.inner_edge.notch = 0.0;
        settings.basic.gap_width = 0.0;
        let cfg = settings.resolve(1.0).unwrap();
        let b = EdgeBoundaries::resolve(10.0, 20.0, &cfg);
        assert_eq!(b.outer, -1.0);
        assert_eq!(b.inner, 1.0);
    }

    #[test]
    fn test_disabled_middle_sits_on_outer() {
        let mut settings = TornPaperSettings::default();
        settings.middle1.amount = 0.0;
        settings.middle2.amount = 0.0;
        let cfg = settings.resolve(1.0).unwrap();
        let b = EdgeBoundaries::resolve(5.0, 5.0, &cfg);
        assert_eq!(b.middle, [b.outer, b.outer]);
    }
}
