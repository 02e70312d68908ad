//! Fold crease with cracks and directional shadows.
//!
//! A fold is a segment between two user points. Pixels are described by
//! their projection onto it: `along` (0 at point 1, 1 at point 2, unclamped)
//! and a signed perpendicular distance (positive = side A). The crease line
//! itself wobbles, each side carries its own jagged crack edge, and short
//! cracks branch off perpendicular to the fold.
//!
//! ## Outputs (all 0..1)
//! - `crack`: reveal strength of the paper backing
//! - `shadow_a` / `shadow_b`: darkening beyond each side's edge

use crate::config::{CrackParams, FoldParams, FoldShadowParams, FoldSideParams};
use crate::procedural::math::{clamp01, smoothstep};
use crate::procedural::noise::{fbm_2d, hash, ridged_multifractal, value_noise_2d, worley_noise};

// Truncated pi; crack angles were tuned against it.
#[allow(clippy::approx_constant)]
const DEG_TO_RAD: f64 = 3.14159 / 180.0;

/// Distance from a point to a segment, plus the unclamped projection
/// parameter along it.
///
/// Segments shorter than 0.001 degrade to the distance to `a`, with
/// `along = 0`.
///
/// # Returns
/// `(distance, along)`
pub fn point_to_line_distance(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len = (dx * dx + dy * dy).sqrt();

    if len < 0.001 {
        let d = ((px - a.0) * (px - a.0) + (py - a.1) * (py - a.1)).sqrt();
        return (d, 0.0);
    }

    let along = ((px - a.0) * dx + (py - a.1) * dy) / (len * len);
    let t = along.clamp(0.0, 1.0);
    let cx = a.0 + t * dx;
    let cy = a.1 + t * dy;
    (((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt(), along)
}

/// One-dimensional tear displacement along the fold.
///
/// The edge-displacement recipe (fBm roughness, ridged jags, spikes, Worley
/// notches) sampled on the line's arc length, with the seed folded into the
/// second noise axis.
pub fn fold_edge_displacement(along: f64, line_len: f64, seed: i32, side: &FoldSideParams, scale: f64) -> f64 {
    let coord = along * line_len;
    let row = seed as f64 * 0.01;
    let mut disp = 0.0;

    if side.roughness > 0.0 {
        let s = side.rough_scale * scale;
        disp += fbm_2d(coord / s, row, seed, 4, 0.5) * side.roughness * scale * 0.12;
    }

    if side.jaggedness > 0.0 {
        let jag = ridged_multifractal(coord / (8.0 * scale), row, seed.wrapping_add(200), 3);
        disp += (jag - 0.5) * side.jaggedness * scale * 0.1;

        let spike = value_noise_2d(coord / (4.0 * scale), row, seed.wrapping_add(300));
        if spike > 0.75 {
            disp += (spike - 0.75) * 4.0 * side.jaggedness * scale * 0.06;
        }

        let notch = worley_noise(coord / (12.0 * scale), row, seed.wrapping_add(400));
        if notch < 0.2 {
            disp += (0.2 - notch) * side.jaggedness * scale * 0.08;
        }
    }

    disp
}

/// Lateral drift of a crack after travelling `dist` away from the fold,
/// integrated in ten steps.
fn crack_curve(dist: f64, cell_hash: u32, curve_freq: f64, curve_amount: f64) -> f64 {
    let step = dist / 10.0;
    if step <= 0.0 {
        return 0.0;
    }
    let seed = cell_hash as i32;
    let mut offset = 0.0;
    let mut d = 0.0;
    while d < dist {
        let n = fbm_2d(
            d * curve_freq + cell_hash as f64 * 0.001,
            cell_hash as f64 * 0.0001,
            seed,
            2,
            0.5,
        );
        offset += n * curve_amount * step;
        d += step;
    }
    offset
}

/// Strength of hashed cracks running away from the fold.
///
/// The line is cut into cells of `8 / (density / 50 + 0.5)`; each cell hash
/// decides whether it spawns a crack, which side it runs on, its length,
/// angle, curvature and up to `1 + branching * 3` branches. Everything is
/// max-combined.
///
/// # Arguments
/// * `along` - Projection parameter on the fold (unclamped)
/// * `perp` - Signed perpendicular distance (after wobble)
/// * `line_len` - Fold length
/// * `seed` - Crack seed
/// * `cracks` - Crack controls
/// * `scale` - Master scale
pub fn perpendicular_cracks(
    along: f64,
    perp: f64,
    line_len: f64,
    seed: i32,
    cracks: &CrackParams,
    scale: f64,
) -> f64 {
    if cracks.density <= 0.0 {
        return 0.0;
    }

    let scaled_length = cracks.length * scale;
    let base_angle = cracks.angle * DEG_TO_RAD;
    let angle_var = cracks.angle_variation * DEG_TO_RAD;
    let cell_size = 8.0 / (cracks.density / 50.0 + 0.5);
    let coord = along * line_len;
    let cell_idx = (coord / cell_size).floor() as i32;
    let abs_perp = perp.abs();

    let mut strength: f64 = 0.0;

    for ci in cell_idx.wrapping_sub(3)..=cell_idx.wrapping_add(3) {
        let cell_hash = hash(ci.wrapping_mul(7919).wrapping_add(seed) as u32);

        if (cell_hash & 0xFF) as f64 / 255.0 > cracks.density / 100.0 {
            continue;
        }

        let origin = (ci as f64 + ((cell_hash >> 8) & 0xFF) as f64 / 255.0) * cell_size;

        let on_side_a = (cell_hash >> 16) & 1 == 0;
        if (on_side_a && perp < 0.0) || (!on_side_a && perp > 0.0) {
            continue;
        }

        let length_random = ((cell_hash >> 20) & 0xFF) as f64 / 255.0;
        let min_length = 1.0 - cracks.length_variation * 0.8;
        let crack_len = scaled_length * (min_length + length_random * cracks.length_variation * 0.8);
        if abs_perp > crack_len * 1.2 {
            continue;
        }

        let angle_jitter = (((cell_hash >> 4) & 0xFF) as f64 / 255.0 - 0.5) * 2.0 * angle_var;
        let angle = base_angle + angle_jitter;
        let angle_offset = |dist: f64| if angle <= 0.1 { 0.0 } else { dist / angle.tan() };

        let curve_amount = ((cell_hash >> 12) & 0xFF) as f64 / 255.0 * 0.5 + 0.2;
        let curve_freq = 0.03 + ((cell_hash >> 4) & 0xFF) as f64 / 255.0 * 0.02;

        // Main crack.
        let curve = crack_curve(abs_perp, cell_hash, curve_freq, curve_amount);
        let t = abs_perp / crack_len;
        let width = ((1.8 - t * 1.5) * scale).max(0.3 * scale);
        let off_line = (coord - origin - angle_offset(abs_perp) - curve).abs();

        if off_line < width && t < 1.0 {
            let erratic = value_noise_2d(
                abs_perp * 0.2,
                cell_hash as f64 * 0.01,
                cell_hash.wrapping_add(500) as i32,
            ) * 0.3
                + 0.7;
            let profile = (1.0 - smoothstep(width * 0.2, width, off_line))
                * (1.0 - smoothstep(0.7, 1.0, t))
                * erratic;
            strength = strength.max(profile);
        }

        if cracks.branching <= 0.0 {
            continue;
        }

        // Branches.
        let max_branches = (cracks.branching * 3.0) as u32 + 1;
        for bi in 0..max_branches {
            let branch_hash = hash(cell_hash.wrapping_add(bi.wrapping_mul(1337)));

            if (branch_hash & 0xFF) as f64 / 255.0 > cracks.branching {
                continue;
            }

            let start = 0.2 + ((branch_hash >> 8) & 0xFF) as f64 / 255.0 * 0.5;
            let start_dist = start * crack_len;
            if abs_perp < start_dist {
                continue;
            }

            let mut branch_angle = (30.0 + ((branch_hash >> 16) & 0xFF) as f64 / 255.0 * 30.0) * DEG_TO_RAD;
            if (branch_hash >> 24) & 1 == 1 {
                branch_angle = -branch_angle;
            }
            let branch_len = crack_len * (0.15 + ((branch_hash >> 20) & 0xFF) as f64 / 255.0 * 0.25);

            let branch_origin = origin
                + angle_offset(start_dist)
                + crack_curve(start_dist, cell_hash, curve_freq, curve_amount);

            let branch_dist = abs_perp - start_dist;
            if branch_dist < 0.0 || branch_dist > branch_len {
                continue;
            }

            let wander = fbm_2d(
                branch_dist * 0.05,
                branch_hash as f64 * 0.001,
                branch_hash as i32,
                2,
                0.5,
            );
            let expected = branch_origin + branch_angle.sin() * branch_dist + wander * branch_len * 0.15;
            let off_branch = (coord - expected).abs();

            let bt = branch_dist / branch_len;
            let branch_width = ((1.0 - bt * 0.8) * scale).max(0.2 * scale);

            if off_branch < branch_width {
                let profile = (1.0 - smoothstep(branch_width * 0.2, branch_width, off_branch))
                    * (1.0 - smoothstep(0.6, 1.0, bt))
                    * 0.6;
                strength = strength.max(profile);
            }
        }
    }

    strength
}

/// Fold response at one noise-space pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FoldSample {
    pub crack: f64,
    pub shadow_a: f64,
    pub shadow_b: f64,
}

fn side_shadow(
    abs_dist: f64,
    edge_pos: f64,
    along: f64,
    shadow: &FoldShadowParams,
    variability_seed: i32,
    seed: i32,
    end_fade: f64,
    scale: f64,
) -> f64 {
    let outside = abs_dist - edge_pos;
    if outside <= 0.0 {
        return 0.0;
    }

    let mut variation = 1.0;
    if shadow.variability > 0.0 {
        let n = fbm_2d(along * 8.0, seed as f64 * 0.1, variability_seed, 2, 0.5) * 0.5 + 0.5;
        variation = 1.0 - shadow.variability * (1.0 - n);
    }

    let reach = shadow.length * scale * variation;
    if outside >= reach {
        return 0.0;
    }
    let falloff = 1.0 - outside / reach;
    falloff * falloff * shadow.opacity * end_fade
}

/// Evaluate the fold at a noise-space pixel.
///
/// `p1`/`p2` must be in the same space as `(px, py)`. Segments shorter than
/// one pixel produce no effect.
pub fn fold_crease(
    px: f64,
    py: f64,
    seed: i32,
    p1: (f64, f64),
    p2: (f64, f64),
    fold: &FoldParams,
    scale: f64,
) -> FoldSample {
    let mut out = FoldSample::default();

    let dx = p2.0 - p1.0;
    let dy = p2.1 - p1.1;
    let line_len = (dx * dx + dy * dy).sqrt();
    if line_len < 1.0 {
        return out;
    }

    let nx = dx / line_len;
    let ny = dy / line_len;
    let to_x = px - p1.0;
    let to_y = py - p1.1;
    let along = (to_x * nx + to_y * ny) / line_len;
    let perp = to_x * (-ny) + to_y * nx;

    let line = &fold.line;
    let mut wobble = 0.0;
    if line.roughness > 0.0 {
        let s = line.rough_scale * scale;
        let coord = along * line_len;
        let row = seed as f64 * 0.01;
        wobble = fbm_2d(coord / s, row, seed.wrapping_add(1000), 3, 0.6);
        wobble += value_noise_2d(coord / (s * 0.3), row, seed.wrapping_add(1100)) * 0.4;
        let turn = value_noise_2d(coord / (s * 0.5), seed as f64 * 0.02, seed.wrapping_add(1200));
        let sharp_turn = if turn > 0.7 {
            (turn - 0.7) * 3.0
        } else if turn < 0.3 {
            (0.3 - turn) * -3.0
        } else {
            0.0
        };
        wobble += sharp_turn * 0.3;
        wobble *= line.roughness * scale * 0.06;
    }
    let adjusted = perp - wobble;

    let is_side_a = adjusted > 0.0;
    let abs_dist = adjusted.abs();
    let (side, side_seed) = if is_side_a {
        (&fold.side_a, seed.wrapping_add(2000))
    } else {
        (&fold.side_b, seed.wrapping_add(3000))
    };

    let max_dist = (fold.side_a.width + fold.shadow_a.length)
        .max(fold.side_b.width + fold.shadow_b.length)
        * scale
        * 1.2;
    if abs_dist > max_dist {
        return out;
    }

    let end_fade = if along < 0.0 {
        smoothstep(-0.1, 0.02, along)
    } else if along > 1.0 {
        smoothstep(1.1, 0.98, along)
    } else {
        1.0
    };

    // Thin erratic crease line.
    let line_width = line.width * scale;
    let mut main_line = 0.0;
    if abs_dist < line_width {
        let variation = fbm_2d(along * 20.0, seed as f64 * 0.1, seed.wrapping_add(1500), 2, 0.5) * 0.4 + 0.6;
        main_line = (1.0 - smoothstep(line_width * 0.2, line_width, abs_dist)) * variation;
    }

    // Jagged crack band along the active side.
    let edge_pos = side.width * scale + fold_edge_displacement(along, line_len, side_seed, side, scale);
    let inside_edge = edge_pos - abs_dist;
    let mut edge_crack = 0.0;
    if inside_edge > 0.0 {
        let soft = (side.softness * 2.0).max(0.3);
        let variation = fbm_2d(
            along * 12.0 + abs_dist * 0.05,
            seed as f64 * 0.1,
            side_seed.wrapping_add(500),
            2,
            0.5,
        ) * 0.5
            + 0.5;
        edge_crack = smoothstep(-soft, soft * 0.5, inside_edge) * variation;
    }

    let cracks = &fold.cracks;
    let mut perp_cracks = 0.0;
    if cracks.amount > 0.0 && cracks.density > 0.0 {
        perp_cracks =
            perpendicular_cracks(along, adjusted, line_len, seed.wrapping_add(4000), cracks, scale) * cracks.amount;
    }

    out.crack = main_line.max(edge_crack).max(perp_cracks) * end_fade;

    if fold.shadow_a.opacity > 0.0 && is_side_a {
        let seed_a = seed.wrapping_add(2000);
        let edge_a = fold.side_a.width * scale + fold_edge_displacement(along, line_len, seed_a, &fold.side_a, scale);
        out.shadow_a = side_shadow(
            abs_dist,
            edge_a,
            along,
            &fold.shadow_a,
            seed.wrapping_add(6000),
            seed,
            end_fade,
            scale,
        );
    }

    if fold.shadow_b.opacity > 0.0 && !is_side_a {
        let seed_b = seed.wrapping_add(3000);
        let edge_b = fold.side_b.width * scale + fold_edge_displacement(along, line_len, seed_b, &fold.side_b, scale);
        out.shadow_b = side_shadow(
            abs_dist,
            edge_b,
            along,
            &fold.shadow_b,
            seed.wrapping_add(7000),
            seed,
            end_fade,
            scale,
        );
    }

    out.crack = clamp01(out.crack);
    out.shadow_a = clamp01(out.shadow_a);
    out.shadow_b = clamp01(out.shadow_b);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TornPaperConfig;

    fn fold_params() -> FoldParams {
        let mut fold = TornPaperConfig::default().fold;
        fold.amount = 1.0;
        fold
    }

    #[test]
    fn test_point_to_line_distance() {
        let (d, along) = point_to_line_distance(5.0, 3.0, (0.0, 0.0), (10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-12);
        assert!((along - 0.5).abs() < 1e-12);

        // Past the end: distance to the endpoint, along stays unclamped.
        let (d, along) = point_to_line_distance(14.0, 3.0, (0.0, 0.0), (10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-12);
        assert!((along - 1.4).abs() < 1e-12);

        let (d, along) = point_to_line_distance(3.0, 4.0, (0.0, 0.0), (0.0, 0.0));
        assert!((d - 5.0).abs() < 1e-12);
        assert_eq!(along, 0.0);
    }

    #[test]
    fn test_zero_length_fold_is_inert() {
        let fold = fold_params();
        for i in 0..20 {
            let p = i as f64;
            let s = fold_crease(p, p, 50000, (50.0, 50.0), (50.0, 50.5), &fold, 1.0);
            assert_eq!(s, FoldSample::default());
        }
    }

    #[test]
    fn test_crease_center_is_cracked() {
        let mut fold = fold_params();
        fold.line.roughness = 0.0;
        fold.side_a.jaggedness = 0.0;
        fold.side_b.jaggedness = 0.0;
        // On the straight line, side B is active (perp = 0 is not > 0):
        // its band is 1px wide with soft 0.3, fully cracked at the center.
        let s = fold_crease(50.0, 0.0, 7, (0.0, 0.0), (100.0, 0.0), &fold, 1.0);
        assert!(s.crack > 0.0);
    }

    #[test]
    fn test_far_from_fold_is_inert() {
        let fold = fold_params();
        let s = fold_crease(50.0, 5000.0, 7, (0.0, 0.0), (100.0, 0.0), &fold, 1.0);
        assert_eq!(s, FoldSample::default());
    }

    #[test]
    fn test_shadows_are_one_sided() {
        let mut fold = fold_params();
        fold.line.roughness = 0.0;
        fold.shadow_a.opacity = 1.0;
        fold.shadow_b.opacity = 1.0;
        for i in 0..60 {
            let x = 10.0 + i as f64;
            let y = (i as f64 - 30.0) * 3.0;
            let s = fold_crease(x, y, 3, (0.0, 0.0), (100.0, 0.0), &fold, 1.0);
            assert!(s.shadow_a == 0.0 || s.shadow_b == 0.0);
            assert!((0.0..=1.0).contains(&s.crack));
            assert!((0.0..=1.0).contains(&s.shadow_a));
            assert!((0.0..=1.0).contains(&s.shadow_b));
        }
    }

    #[test]
    fn test_shadow_falls_off_with_distance() {
        let mut fold = fold_params();
        fold.line.roughness = 0.0;
        fold.side_a.jaggedness = 0.0;
        fold.side_b.jaggedness = 0.0;
        fold.cracks.density = 0.0;
        fold.shadow_a.opacity = 1.0;
        fold.shadow_a.variability = 0.0;
        fold.shadow_a.length = 100.0;
        // Side A is +perp, which for a left-to-right fold is +y.
        let near = fold_crease(50.0, 5.0, 3, (0.0, 0.0), (100.0, 0.0), &fold, 1.0).shadow_a;
        let far = fold_crease(50.0, 60.0, 3, (0.0, 0.0), (100.0, 0.0), &fold, 1.0).shadow_a;
        assert!(near > far);
        assert!(far > 0.0);
        let gone = fold_crease(50.0, 110.0, 3, (0.0, 0.0), (100.0, 0.0), &fold, 1.0).shadow_a;
        assert_eq!(gone, 0.0);
    }

    #[test]
    fn test_cracks_off_without_density() {
        let mut cracks = fold_params().cracks;
        cracks.density = 0.0;
        assert_eq!(perpendicular_cracks(0.5, 10.0, 100.0, 4000, &cracks, 1.0), 0.0);
    }

    #[test]
    fn test_cracks_bounded_and_deterministic() {
        let mut cracks = fold_params().cracks;
        cracks.density = 100.0;
        cracks.branching = 1.0;
        let mut any = false;
        for side in [3.0, -3.0] {
            for i in 0..1000 {
                let along = i as f64 / 1000.0;
                let a = perpendicular_cracks(along, side, 300.0, 4000, &cracks, 1.0);
                let b = perpendicular_cracks(along, side, 300.0, 4000, &cracks, 1.0);
                assert_eq!(a.to_bits(), b.to_bits());
                assert!((0.0..=1.0).contains(&a));
                any |= a > 0.0;
            }
        }
        assert!(any);
    }

    #[test]
    fn test_edge_displacement_flat_side() {
        let side = FoldSideParams {
            width: 1.0,
            roughness: 0.0,
            rough_scale: 100.0,
            jaggedness: 0.0,
            softness: 0.0,
        };
        assert_eq!(fold_edge_displacement(0.3, 200.0, 2000, &side, 1.0), 0.0);
    }
}
