//! Grunge masks: dirt, smudge and dust.
//!
//! Stateless 0..1 masks over noise-space coordinates. Each short-circuits to
//! exactly 0 when its amount is not positive; otherwise a larger amount
//! lowers the smoothstep threshold and the mask gets denser.

use crate::procedural::math::{clamp01, smoothstep};
use crate::procedural::noise::{fbm_2d, hash, hash_2d, ridged_multifractal, value_noise_2d, worley_noise};

/// Blotchy dirt: three Worley scales blended with ridged noise, gated by a
/// very low-frequency distribution mask, plus fine speckles.
pub fn organic_dirt(x: f64, y: f64, seed: i32, size: f64, amount: f64, scale: f64) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }

    let s = size * scale;

    let w1 = worley_noise(x / s, y / s, seed);
    let w2 = worley_noise(x / (s * 0.4), y / (s * 0.4), seed.wrapping_add(1000));
    let w3 = worley_noise(x / (s * 0.15), y / (s * 0.15), seed.wrapping_add(2000));
    let mut shape = (1.0 - w1) * 0.5 + (1.0 - w2) * 0.3 + (1.0 - w3) * 0.2;

    let ridge = ridged_multifractal(x / (s * 0.8), y / (s * 0.8), seed.wrapping_add(3000), 3);
    shape = shape * 0.6 + ridge * 0.4;

    let threshold = 0.75 - amount * 0.005;
    shape = smoothstep(threshold, threshold + 0.15, shape);

    let spread = fbm_2d(x * 0.002, y * 0.002, seed.wrapping_add(5000), 3, 0.6);
    let spread_threshold = 0.7 - amount * 0.006;
    let spread = smoothstep(spread_threshold, spread_threshold + 0.2, spread);

    let speckle = worley_noise(x / (s * 0.2), y / (s * 0.2), seed.wrapping_add(8000));
    let speckle = if speckle < 0.12 { (0.12 - speckle) / 0.12 } else { 0.0 };

    clamp01(shape * spread + speckle * spread * 0.6)
}

/// Soft streaky smudges: fBm-dominated shape modulated by a sine whose
/// direction drifts with low-frequency noise.
pub fn organic_smudge(x: f64, y: f64, seed: i32, size: f64, amount: f64, scale: f64) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }

    let s = size * scale;

    let fbm1 = fbm_2d(x / s, y / s, seed.wrapping_add(20000), 4, 0.5);
    let fbm2 = fbm_2d(x / (s * 0.5), y / (s * 0.5), seed.wrapping_add(21000), 3, 0.6);
    let w1 = worley_noise(x / (s * 1.5), y / (s * 1.5), seed.wrapping_add(22000));

    let mut shape = fbm1 * 0.5 + fbm2 * 0.3 + (1.0 - w1) * 0.2;
    let threshold = 0.7 - amount * 0.006;
    shape = smoothstep(threshold, threshold + 0.2, shape);

    let spread = fbm_2d(x * 0.001, y * 0.001, seed.wrapping_add(23000), 2, 0.7);
    let spread_threshold = 0.8 - amount * 0.007;
    let spread = smoothstep(spread_threshold, spread_threshold + 0.15, spread);

    let angle = fbm_2d(x * 0.005, y * 0.005, seed.wrapping_add(24000), 2, 0.5) * 6.28;
    let streak = (x * angle.cos() * 0.05 + y * angle.sin() * 0.05).sin() * 0.3 + 0.7;

    clamp01(shape * spread * streak)
}

/// Scattered specks on a hashed grid.
///
/// Cell size shrinks as the amount grows; each cell holds up to four
/// particles, each kept with probability `amount / 100`. Particles get a
/// jittered radius and an angular-noise outline, and overlapping particles
/// are max-combined.
pub fn dust_particles(x: f64, y: f64, seed: i32, size: f64, amount: f64, scale: f64) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }

    let s = size * scale;
    let cell_size = 15.0 / (amount / 30.0 + 0.5);
    let cell_x = (x / cell_size).floor() as i32;
    let cell_y = (y / cell_size).floor() as i32;
    let keep = amount / 100.0;

    let mut strength: f64 = 0.0;

    for cy in cell_y.wrapping_sub(1)..=cell_y.wrapping_add(1) {
        for cx in cell_x.wrapping_sub(1)..=cell_x.wrapping_add(1) {
            let cell_hash = hash_2d(cx, cy, seed);
            let count = 1 + ((cell_hash & 0x3) as f64 * amount / 100.0) as u32;

            for pi in 0..count {
                let h = hash(cell_hash.wrapping_add(pi.wrapping_mul(9973)));

                if (h & 0xFF) as f64 / 255.0 > keep {
                    continue;
                }

                let px = cx as f64 * cell_size + ((h >> 8) & 0xFFFF) as f64 / 65536.0 * cell_size;
                let py = cy as f64 * cell_size + ((h >> 16) & 0xFFFF) as f64 / 65536.0 * cell_size;
                let dx = x - px;
                let dy = y - py;
                let dist = (dx * dx + dy * dy).sqrt();

                let radius = s * (0.3 + ((h >> 4) & 0xFF) as f64 / 255.0 * 0.7);
                if dist >= radius {
                    continue;
                }

                let angle = dy.atan2(dx);
                let irregular = value_noise_2d(angle * 3.0, h as f64 * 0.001, h as i32) * 0.4;
                let outline = radius * (1.0 + irregular);

                if dist < outline {
                    strength = strength.max(1.0 - smoothstep(outline * 0.5, outline, dist));
                }
            }
        }
    }

    clamp01(strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = (f64, f64)> {
        (0..900).map(|i| ((i % 30) as f64 * 3.7 - 40.0, (i / 30) as f64 * 5.3 - 60.0))
    }

    #[test]
    fn test_zero_amount_is_exactly_zero() {
        for (x, y) in grid() {
            assert_eq!(organic_dirt(x, y, 5000, 10.0, 0.0, 1.0), 0.0);
            assert_eq!(organic_smudge(x, y, 8000, 50.0, 0.0, 1.0), 0.0);
            assert_eq!(dust_particles(x, y, 9999, 2.0, 0.0, 1.0), 0.0);
            assert_eq!(dust_particles(x, y, 9999, 2.0, -5.0, 1.0), 0.0);
        }
    }

    #[test]
    fn test_masks_in_unit_range() {
        for (x, y) in grid() {
            for amount in [10.0, 60.0, 100.0] {
                let d = organic_dirt(x, y, 5000, 10.0, amount, 1.0);
                let s = organic_smudge(x, y, 8000, 50.0, amount, 1.0);
                let p = dust_particles(x, y, 9999, 2.0, amount, 1.0);
                assert!((0.0..=1.0).contains(&d));
                assert!((0.0..=1.0).contains(&s));
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn test_heavy_dust_hits_somewhere() {
        let hits = (0..2500)
            .map(|i| ((i % 50) as f64 * 0.9, (i / 50) as f64 * 0.9))
            .filter(|&(x, y)| dust_particles(x, y, 9999, 4.0, 100.0, 1.0) > 0.0)
            .count();
        assert!(hits > 0);
    }

    #[test]
    fn test_masks_are_deterministic() {
        for (x, y) in grid().take(100) {
            assert_eq!(
                organic_dirt(x, y, 1, 10.0, 80.0, 1.0).to_bits(),
                organic_dirt(x, y, 1, 10.0, 80.0, 1.0).to_bits()
            );
            assert_eq!(
                dust_particles(x, y, 2, 3.0, 80.0, 1.0).to_bits(),
                dust_particles(x, y, 2, 3.0, 80.0, 1.0).to_bits()
            );
        }
    }
}
