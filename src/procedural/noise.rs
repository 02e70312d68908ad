//! Hash-based procedural noise.
//!
//! Every generator here is a pure function of `(x, y, seed)`. There is no
//! permutation table and no RNG state, so any pixel can be evaluated on any
//! thread in any order and produce bit-identical results.
//!
//! ## Generators
//!
//! | Function | Range | Character |
//! |----------|-------|-----------|
//! | `value_noise_2d` | [-1, 1] | smooth lattice noise |
//! | `fbm_2d` | ~[-1, 1] | layered value noise |
//! | `ridged_multifractal` | [0, ~1.1] | sharp ridges, crack-like |
//! | `worley_noise` | >= 0 | distance to nearest feature point |
//!
//! Integer arithmetic in the hashes wraps exactly like 32-bit machine
//! integers; floating point never feeds a hash.

use super::math::{fade, lerp};

/// 32-bit avalanche hash.
#[inline]
pub fn hash(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x85eb_ca6b);
    x ^= x >> 13;
    x = x.wrapping_mul(0xc2b2_ae35);
    x ^= x >> 16;
    x
}

/// Hash a lattice coordinate together with a seed.
#[inline]
pub fn hash_2d(x: i32, y: i32, seed: i32) -> u32 {
    hash(hash(x.wrapping_add(seed) as u32) ^ (y.wrapping_mul(15731) as u32))
}

#[inline]
fn corner(x: i32, y: i32, seed: i32) -> f64 {
    (hash_2d(x, y, seed) & 0xFFFF) as f64 / 32768.0 - 1.0
}

/// Smoothly interpolated lattice noise in [-1, 1].
pub fn value_noise_2d(x: f64, y: f64, seed: i32) -> f64 {
    let xf = x.floor();
    let yf = y.floor();
    let xi = xf as i32;
    let yi = yf as i32;

    let n00 = corner(xi, yi, seed);
    let n10 = corner(xi.wrapping_add(1), yi, seed);
    let n01 = corner(xi, yi.wrapping_add(1), seed);
    let n11 = corner(xi.wrapping_add(1), yi.wrapping_add(1), seed);

    let sx = fade(x - xf);
    let sy = fade(y - yf);

    lerp(lerp(n00, n10, sx), lerp(n01, n11, sx), sy)
}

/// Fractal Brownian motion over `value_noise_2d`.
///
/// Octave `i` samples at frequency `2^i` with seed `seed + i * 1000` and
/// amplitude `persistence^i`. The sum is normalized by the total amplitude.
///
/// # Arguments
/// * `octaves` - Number of layers (at least 1 for a meaningful result)
/// * `persistence` - Amplitude decay per octave
pub fn fbm_2d(x: f64, y: f64, seed: i32, octaves: u32, persistence: f64) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_value = 0.0;

    for i in 0..octaves {
        let octave_seed = seed.wrapping_add((i as i32).wrapping_mul(1000));
        total += value_noise_2d(x * frequency, y * frequency, octave_seed) * amplitude;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= 2.0;
    }

    if max_value > 0.0 {
        total / max_value
    } else {
        0.0
    }
}

/// Ridged multifractal noise.
///
/// Each octave contributes `(1 - |n|)^2`, weighted by the previous octave's
/// value so ridges reinforce themselves.
pub fn ridged_multifractal(x: f64, y: f64, seed: i32, octaves: u32) -> f64 {
    let mut sum = 0.0;
    let mut freq = 1.0;
    let mut amp = 1.0;
    let mut prev = 1.0;

    for i in 0..octaves {
        let octave_seed = seed.wrapping_add((i as i32).wrapping_mul(100));
        let n = 1.0 - value_noise_2d(x * freq, y * freq, octave_seed).abs();
        let n = n * n;
        sum += n * amp * prev;
        prev = n;
        freq *= 2.0;
        amp *= 0.5;
    }

    sum
}

/// Cellular noise: distance to the nearest jittered feature point in the
/// surrounding 3x3 cells.
pub fn worley_noise(x: f64, y: f64, seed: i32) -> f64 {
    let xi = x.floor() as i32;
    let yi = y.floor() as i32;
    let mut min_dist = 1e10_f64;

    for dy in -1..=1 {
        for dx in -1..=1 {
            let cx = xi.wrapping_add(dx);
            let cy = yi.wrapping_add(dy);
            let px = cx as f64 + (hash_2d(cx, cy, seed) & 0xFFFF) as f64 / 65536.0;
            let py = cy as f64
                + (hash_2d(cx, cy, seed.wrapping_add(1000)) & 0xFFFF) as f64 / 65536.0;
            let dist = ((x - px) * (x - px) + (y - py) * (y - py)).sqrt();
            min_dist = min_dist.min(dist);
        }
    }

    min_dist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_known_values() {
        assert_eq!(hash(0), 0);
        assert_eq!(hash(1), hash(1));
        assert_ne!(hash(1), hash(2));
    }

    #[test]
    fn test_hash_2d_wraps_without_panicking() {
        let a = hash_2d(i32::MAX, i32::MAX, i32::MAX);
        let b = hash_2d(i32::MAX, i32::MAX, i32::MAX);
        assert_eq!(a, b);
        assert_ne!(hash_2d(3, 4, 7), hash_2d(4, 3, 7));
    }

    #[test]
    fn test_value_noise_deterministic_and_bounded() {
        for i in 0..500 {
            let x = i as f64 * 0.37 - 90.0;
            let y = i as f64 * 0.91 - 40.0;
            let v = value_noise_2d(x, y, 42);
            assert!((-1.0..=1.0).contains(&v));
            assert_eq!(v.to_bits(), value_noise_2d(x, y, 42).to_bits());
        }
    }

    #[test]
    fn test_value_noise_matches_lattice_corner() {
        // At integer coordinates the interpolation collapses to the corner.
        let expected = (hash_2d(5, -3, 9) & 0xFFFF) as f64 / 32768.0 - 1.0;
        assert_eq!(value_noise_2d(5.0, -3.0, 9), expected);
    }

    #[test]
    fn test_fbm_bounded() {
        for i in 0..300 {
            let x = i as f64 * 1.3;
            let v = fbm_2d(x, -x * 0.5, 12345, 4, 0.5);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_fbm_single_octave_is_value_noise() {
        assert_eq!(fbm_2d(1.25, 7.5, 3, 1, 0.5), value_noise_2d(1.25, 7.5, 3));
    }

    #[test]
    fn test_ridged_range() {
        for i in 0..300 {
            let x = i as f64 * 0.77;
            let v = ridged_multifractal(x, x * 0.3, 100, 4);
            assert!(v >= 0.0);
            assert!(v <= 1.875 + 1e-9);
        }
    }

    #[test]
    fn test_worley_non_negative_and_close() {
        for i in 0..300 {
            let x = i as f64 * 0.21 - 30.0;
            let d = worley_noise(x, x * 1.7, 500);
            assert!(d >= 0.0);
            // The point's own cell always holds a feature point within sqrt(2).
            assert!(d <= std::f64::consts::SQRT_2 + 1e-9);
        }
    }

    #[test]
    fn test_order_independence() {
        let coords: Vec<(f64, f64)> = (0..64).map(|i| (i as f64 * 0.5, i as f64 * 0.25)).collect();
        let forward: Vec<u64> = coords
            .iter()
            .map(|&(x, y)| fbm_2d(x, y, 7, 3, 0.6).to_bits())
            .collect();
        let backward: Vec<u64> = coords
            .iter()
            .rev()
            .map(|&(x, y)| fbm_2d(x, y, 7, 3, 0.6).to_bits())
            .collect();
        let mut backward = backward;
        backward.reverse();
        assert_eq!(forward, backward);
    }
}
