//! Per-pixel torn paper pipeline and the frame driver around it.
//!
//! ## Pipeline (per output pixel)
//! 1. Signed distance + gradient from the input's alpha (extended past the
//!    image border for the padded canvas)
//! 2. Outer / inner / middle edge placement
//! 3. Content alpha (around the inner edge) and paper band alpha
//! 4. Fiber fields at every edge, max-combined
//! 5. Paper grain, shared by the backing and the visible paper
//! 6. Paper color: fiber shadow, fiber tint, grain, shadow bands
//! 7. Content: source over backing, fold, grunge, fade into paper
//!
//! Every pixel is independent once the distance field exists, so rows are
//! rendered in parallel and the result does not depend on scheduling.

use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;

use super::edge::EdgeBoundaries;
use super::fiber::{fiber_field, FiberFieldSample, FiberLayer};
use super::fold::fold_crease;
use super::grunge::{dust_particles, organic_dirt, organic_smudge};
use crate::config::TornPaperConfig;
use crate::error::{Result, TornPaperError};
use crate::procedural::distance_field::{DistanceField, FieldSample};
use crate::procedural::math::{clamp01, smoothstep};
use crate::procedural::noise::{fbm_2d, value_noise_2d};
use crate::procedural::pixel::{Channel, ImageView, PixelAccessor, Rgb, Rgba};

/// Edge softness never drops below this, so edges stay anti-aliased.
const MIN_SOFTNESS: f64 = 0.5;

/// Alpha contributions below this are treated as absent.
const ALPHA_EPSILON: f64 = 0.01;

/// Combined fiber response over all edges.
#[derive(Debug, Clone, Copy)]
struct FiberMix {
    alpha: f64,
    shadow: f64,
    color_variation: f64,
    /// How far the outer edge's fibers reach; the outer shadow starts there.
    outer_extent: f64,
}

/// Grain offset added to the paper color; blue gets slightly less.
#[derive(Debug, Clone, Copy, Default)]
struct Grain {
    rg: f64,
    b: f64,
}

impl Grain {
    fn apply(&self, c: Rgb) -> Rgb {
        Rgb::new(clamp01(c.r + self.rg), clamp01(c.g + self.rg), clamp01(c.b + self.b))
    }
}

/// Darken with the warm bias used by every paper shadow.
#[inline]
fn darken(c: Rgb, amount: f64) -> Rgb {
    Rgb::new(c.r * (1.0 - amount), c.g * (1.0 - amount), c.b * (1.0 - amount * 0.8))
}

/// Squared falloff inside `(0, width)`, `None` outside.
#[inline]
fn band_falloff(dist: f64, width: f64) -> Option<f64> {
    if dist > 0.0 && dist < width {
        let f = 1.0 - dist / width;
        Some(f * f)
    } else {
        None
    }
}

/// Opacity of the paper strip between the outer and inner edge.
fn paper_band_alpha(d: f64, outer: f64, inner: f64, softness: f64) -> f64 {
    if d <= outer - softness || d >= inner + softness {
        0.0
    } else if d > outer + softness && d < inner - softness {
        1.0
    } else if d <= outer + softness {
        smoothstep(outer - softness, outer + softness, d)
    } else {
        1.0 - smoothstep(inner - softness, inner + softness, d)
    }
}

/// Torn paper renderer bound to one resolved configuration.
///
/// Cheap to construct; holds no per-frame state, so a single instance can
/// render any number of frames, from any thread.
#[derive(Debug, Clone)]
pub struct RenderCore {
    config: TornPaperConfig,
    outer_fibers: FiberLayer,
    inner_fibers: FiberLayer,
    middle_fibers: [FiberLayer; 2],
    margin: usize,
}

impl RenderCore {
    pub fn new(config: TornPaperConfig) -> Self {
        let base = FiberLayer::from(&config.fibers);
        let inner_fibers = FiberLayer {
            density: base.density * 0.7,
            length: base.length * 0.8,
            ..base
        };
        let middle_fibers = config.middle.map(|m| FiberLayer {
            density: m.fiber_density,
            length: base.length * 0.6,
            range: base.range * 0.5,
            ..base
        });
        let margin = config.canvas_margin();

        Self {
            config,
            outer_fibers: base,
            inner_fibers,
            middle_fibers,
            margin,
        }
    }

    pub fn config(&self) -> &TornPaperConfig {
        &self.config
    }

    /// Padding added on every side of the output, in canvas pixels.
    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Output canvas size `(width, height)` for an input of the given size.
    pub fn output_size(&self, width: usize, height: usize) -> (usize, usize) {
        (width + 2 * self.margin, height + 2 * self.margin)
    }

    /// Noise-space position of an output canvas pixel.
    ///
    /// Input-space pixel coordinates divided by the downsample factor, so a
    /// preview and a full render sample the same noise at the same spot of
    /// the layer.
    pub fn noise_coords(&self, canvas_x: usize, canvas_y: usize) -> (f64, f64) {
        let ix = canvas_x as f64 - self.margin as f64;
        let iy = canvas_y as f64 - self.margin as f64;
        (ix / self.config.downsample, iy / self.config.downsample)
    }

    /// Render an `(H, W, 4)` RGBA array.
    ///
    /// # Returns
    /// `(H + 2m, W + 2m, 4)` array in the same storage type, where `m` is
    /// [`margin`](Self::margin).
    pub fn render<T: Channel>(&self, input: ArrayView3<'_, T>) -> Result<Array3<T>> {
        let image = ImageView::new(input)?;
        self.render_image(&image)
    }

    /// Render from any pixel accessor into storage type `T`.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(width = image.width(), height = image.height(), downsample = self.config.downsample)
    )]
    pub fn render_image<P, T>(&self, image: &P) -> Result<Array3<T>>
    where
        P: PixelAccessor + ?Sized,
        T: Channel,
    {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(TornPaperError::invalid_shape(format!(
                "image must not be empty, got {width}x{height}"
            )));
        }

        let field = DistanceField::from_image(image);
        let margin = self.margin as isize;
        let (out_w, out_h) = self.output_size(width, height);
        tracing::debug!(margin, out_w, out_h, "canvas resolved");

        let downsample = self.config.downsample;
        let mut out = vec![T::default(); out_w * out_h * 4];

        out.par_chunks_mut(out_w * 4).enumerate().for_each(|(y, row)| {
            let iy = y as isize - margin;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let ix = x as isize - margin;
                let inside = ix >= 0 && iy >= 0 && (ix as usize) < width && (iy as usize) < height;
                let src = if inside {
                    image.pixel(ix as usize, iy as usize)
                } else {
                    Rgba::TRANSPARENT
                };
                let sample = field.sample_extended(ix, iy);
                let nx = ix as f64 / downsample;
                let ny = iy as f64 / downsample;
                self.shade_pixel(src, &sample, nx, ny).store(px);
            }
        });

        Ok(Array3::from_shape_vec((out_h, out_w, 4), out)?)
    }

    /// Evaluate the whole pipeline for one pixel.
    ///
    /// # Arguments
    /// * `src` - Source pixel, transparent outside the input
    /// * `field` - Distance field sample in canvas pixels
    /// * `nx`, `ny` - Noise-space position
    pub fn shade_pixel(&self, src: Rgba, field: &FieldSample, nx: f64, ny: f64) -> Rgba {
        let cfg = &self.config;
        let d = field.distance as f64 / cfg.downsample;
        let grad = (field.grad_x as f64, field.grad_y as f64);

        let edges = EdgeBoundaries::resolve(nx, ny, cfg);
        let softness = cfg.edge_softness.max(MIN_SOFTNESS);
        let content_alpha = smoothstep(edges.inner - softness, edges.inner + softness, d);
        let paper_alpha = paper_band_alpha(d, edges.outer, edges.inner, softness);

        let fibers = self.fibers(nx, ny, d, grad, &edges);
        let total_paper_alpha = paper_alpha.max(fibers.alpha);

        let grain = self.grain(nx, ny);
        let backing = grain.apply(cfg.paper.paper_color);
        let paper = if total_paper_alpha > ALPHA_EPSILON {
            self.paper_color(d, &edges, &fibers, grain)
        } else {
            cfg.paper.paper_color
        };

        if content_alpha <= ALPHA_EPSILON {
            return Rgba::new(paper.r, paper.g, paper.b, clamp01(total_paper_alpha));
        }

        let mut color = if src.a > 0.99 {
            src.rgb()
        } else {
            backing.mix(src.rgb(), src.a)
        };
        let mut alpha = 1.0;

        color = self.apply_fold(color, backing, nx, ny);
        color = self.apply_grunge(color, nx, ny);

        if content_alpha < 0.99 {
            color = paper.mix(color, content_alpha);
            alpha = alpha * content_alpha + total_paper_alpha * (1.0 - content_alpha);
        }

        Rgba::new(clamp01(color.r), clamp01(color.g), clamp01(color.b), clamp01(alpha))
    }

    fn fibers(&self, nx: f64, ny: f64, d: f64, grad: (f64, f64), edges: &EdgeBoundaries) -> FiberMix {
        let cfg = &self.config;
        let seed = cfg.seed;
        let inward = (-grad.0, -grad.1);

        let outer = fiber_field(nx, ny, d - edges.outer, grad, &self.outer_fibers, seed.wrapping_add(1000));
        let inner = fiber_field(nx, ny, d - edges.inner, inward, &self.inner_fibers, seed.wrapping_add(2000));

        let mut middle = [FiberFieldSample::EMPTY; 2];
        let middle_seeds = [3000, 4000];
        for i in 0..2 {
            let m = &cfg.middle[i];
            if m.amount > 0.0 && m.fiber_density > 0.0 {
                let mut s = fiber_field(
                    nx,
                    ny,
                    d - edges.middle[i],
                    inward,
                    &self.middle_fibers[i],
                    seed.wrapping_add(middle_seeds[i]),
                );
                s.opacity *= m.amount;
                s.shadow *= m.amount;
                middle[i] = s;
            }
        }

        let opacity = cfg.fibers.opacity;
        let max_op = outer.opacity.max(inner.opacity).max(middle[0].opacity).max(middle[1].opacity);
        let max_shadow = outer.shadow.max(inner.shadow).max(middle[0].shadow).max(middle[1].shadow);
        let mut alpha = max_op * opacity;
        let mut shadow = max_shadow * opacity;

        let winner = alpha / opacity.max(0.001);
        let color_variation = if outer.opacity >= winner - 0.01 {
            outer.color_variation
        } else if inner.opacity >= winner - 0.01 {
            inner.color_variation
        } else {
            0.5
        };

        if cfg.fibers.blur > 0.0 && alpha > 0.0 {
            let k = 1.0 / (1.0 + cfg.fibers.blur * 0.2);
            alpha *= k;
            shadow *= k;
        }

        FiberMix {
            alpha,
            shadow,
            color_variation,
            outer_extent: outer.max_extent,
        }
    }

    fn grain(&self, nx: f64, ny: f64) -> Grain {
        let cfg = &self.config;
        let texture = cfg.paper.texture;
        if texture <= 0.0 {
            return Grain::default();
        }

        let seed = cfg.seed;
        let ts = 3.0 * cfg.master_scale / cfg.downsample;
        let grain1 = fbm_2d(nx / ts, ny / ts, seed.wrapping_add(7000), 3, 0.5);
        let grain2 = value_noise_2d(nx / (ts * 0.5), ny / (ts * 0.5), seed.wrapping_add(8000));
        let streaks = fbm_2d(nx / (ts * 0.67), ny / (ts * 5.0), seed.wrapping_add(9000), 2, 0.6);

        let tex = (grain1 * 0.5 + grain2 * 0.3 + streaks * 0.2 - 0.5) * texture * 0.15;
        Grain { rg: tex, b: tex * 0.9 }
    }

    fn paper_color(&self, d: f64, edges: &EdgeBoundaries, fibers: &FiberMix, grain: Grain) -> Rgb {
        let cfg = &self.config;
        let paper = &cfg.paper;
        let mut c = paper.paper_color;

        if cfg.fibers.shadow > 0.0 && fibers.shadow > ALPHA_EPSILON {
            c = darken(c, fibers.shadow * cfg.fibers.shadow * 0.4);
        }

        if fibers.alpha > 0.05 {
            let shift = (fibers.color_variation - 0.5) * cfg.fibers.color_variation * 0.25;
            let fiber = Rgb::new(
                clamp01(paper.fiber_color.r * (1.0 + shift * 0.3)),
                clamp01(paper.fiber_color.g * (1.0 + shift * 0.2)),
                clamp01(paper.fiber_color.b * (1.0 + shift * 0.1)),
            );
            c = c.mix(fiber, fibers.alpha * 0.6);
        }

        if paper.texture > 0.0 {
            c = grain.apply(c);
        }

        // Middle edges cast a short shadow toward the outer edge.
        for (m, edge) in cfg.middle.iter().zip(edges.middle) {
            if m.amount > 0.0 && m.shadow > 0.0 {
                if let Some(f) = band_falloff(edge - d, paper.shadow_width * 0.4) {
                    c = darken(c, f * m.shadow * m.amount * 0.35);
                }
            }
        }

        if paper.shadow_amount > 0.0 {
            let start = edges.outer + fibers.outer_extent;
            if let Some(f) = band_falloff(d - start, paper.shadow_width) {
                c = darken(c, f * paper.shadow_amount * 0.4);
            }
        }

        if paper.content_shadow_amount > 0.0 {
            if let Some(f) = band_falloff(edges.inner - d, paper.content_shadow_width) {
                c = darken(c, f * paper.content_shadow_amount * 0.5);
            }
        }

        c
    }

    fn apply_fold(&self, color: Rgb, backing: Rgb, nx: f64, ny: f64) -> Rgb {
        let cfg = &self.config;
        let fold = &cfg.fold;
        if fold.amount <= 0.0 {
            return color;
        }

        let p1 = (fold.point1.x, fold.point1.y);
        let p2 = (fold.point2.x, fold.point2.y);
        let s = fold_crease(nx, ny, cfg.seed.wrapping_add(50000), p1, p2, fold, cfg.master_scale);

        let mut c = color;
        let crack = s.crack * fold.amount;
        if crack > 0.0 {
            c = c.mix(backing, clamp01(crack * 1.5));
        }
        let shadow_a = s.shadow_a * fold.amount;
        if shadow_a > 0.0 {
            c = c.mix(fold.shadow_a.color, clamp01(shadow_a));
        }
        let shadow_b = s.shadow_b * fold.amount;
        if shadow_b > 0.0 {
            c = c.mix(fold.shadow_b.color, clamp01(shadow_b));
        }
        c
    }

    fn apply_grunge(&self, color: Rgb, nx: f64, ny: f64) -> Rgb {
        let cfg = &self.config;
        let scale = cfg.master_scale;
        let g = &cfg.grunge;
        let mut c = color;

        if g.dirt.amount > 0.0 {
            let dirt = organic_dirt(nx, ny, g.dirt.seed, g.dirt.size, g.dirt.amount, scale);
            c = c.mix(g.dirt.color, dirt * g.dirt.opacity);
        }

        if g.smudge.amount > 0.0 {
            let smudge = organic_smudge(nx, ny, g.smudge.seed, g.smudge.size, g.smudge.amount, scale);
            c = c.mix(g.smudge.color, smudge * g.smudge.opacity);
        }

        if g.dust.amount > 0.0 {
            let dust = dust_particles(nx, ny, g.dust.seed, g.dust.size, g.dust.amount, scale);
            if dust > 0.0 {
                c = c.mix(g.dust.color, dust);
            }
        }

        c
    }
}
