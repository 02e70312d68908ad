//! Torn paper parameters.
//!
//! Two layers:
//! - [`TornPaperSettings`] mirrors the effect's controls in host units
//!   (percent sliders, unscaled pixel sizes, 8-bit colors). It is serde
//!   (de)serializable and every group falls back to the factory defaults, so
//!   a partial JSON document is a valid settings file.
//! - [`TornPaperConfig`] is the resolved, immutable form consumed by the
//!   renderer: percentages turned into fractions, length-like values
//!   multiplied by the master scale, colors normalized.
//!
//! ## Resolution rules
//!
//! | Rule | Fields |
//! |------|--------|
//! | x master scale | gap width, edge softness, shadow widths, fiber length/thickness |
//! | / 100 | middle amount/position/shadow, texture, shadow amounts, fiber softness/feather/shadow/opacity, fold amount, crack amount/length var/branching, fold shadow opacity/variability, dirt/smudge opacity |
//! | as-is | edge shape values, fiber density/spread/range/blur, fold shape values, crack length/density/angles, grunge amounts/sizes/seeds |
//!
//! A partially specified `middle2` object takes missing fields from the
//! shared middle-edge defaults (the first middle edge's values).

use serde::{Deserialize, Serialize};

use crate::error::{Result, TornPaperError};
use crate::procedural::pixel::Rgb;

/// Upper bound on canvas expansion, in full-resolution pixels.
pub const MAX_EXPAND_PIXELS: f64 = 100.0;

/// Fiber color variation; fixed, the control was retired.
pub const FIBER_COLOR_VARIATION: f64 = 0.30;

/// Fold side softness; fixed, the control was retired.
pub const FOLD_SIDE_SOFTNESS: f64 = 0.0;

// ============================================================================
// Host-facing settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicSettings {
    /// Percent; 100 = 1:1.
    pub master_scale: f64,
    pub gap_width: f64,
    pub seed: i32,
    pub edge_softness: f64,
}

impl Default for BasicSettings {
    fn default() -> Self {
        Self {
            master_scale: 100.0,
            gap_width: -50.0,
            seed: 12345,
            edge_softness: 2.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSettings {
    pub roughness: f64,
    pub rough_scale: f64,
    pub jaggedness: f64,
    pub notch: f64,
}

impl Default for EdgeSettings {
    fn default() -> Self {
        Self {
            roughness: 59.0,
            rough_scale: 189.0,
            jaggedness: 8.0,
            notch: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InnerEdgeSettings {
    pub roughness: f64,
    pub rough_scale: f64,
    pub jaggedness: f64,
    pub notch: f64,
    /// 100 leaves the inner edge where the noise puts it; lower values pull
    /// it inward by an estimate of the maximum displacement.
    pub expansion: f64,
}

impl Default for InnerEdgeSettings {
    fn default() -> Self {
        let edge = EdgeSettings::default();
        Self {
            roughness: edge.roughness,
            rough_scale: edge.rough_scale,
            jaggedness: edge.jaggedness,
            notch: edge.notch,
            expansion: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddleEdgeSettings {
    pub amount: f64,
    pub position: f64,
    pub roughness: f64,
    pub shadow: f64,
    pub fiber_density: f64,
}

impl Default for MiddleEdgeSettings {
    fn default() -> Self {
        Self {
            amount: 50.0,
            position: 15.0,
            roughness: 100.0,
            shadow: 40.0,
            fiber_density: 40.0,
        }
    }
}

impl MiddleEdgeSettings {
    fn second() -> Self {
        Self {
            amount: 48.0,
            position: 25.0,
            shadow: 30.0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperSettings {
    pub texture: f64,
    pub shadow_amount: f64,
    pub shadow_width: f64,
    pub paper_color: [u8; 3],
    pub fiber_color: [u8; 3],
    pub content_shadow_amount: f64,
    pub content_shadow_width: f64,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            texture: 85.0,
            shadow_amount: 100.0,
            shadow_width: 28.9,
            paper_color: [239, 230, 217],
            fiber_color: [137, 131, 122],
            content_shadow_amount: 50.0,
            content_shadow_width: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiberSettings {
    pub density: f64,
    pub length: f64,
    pub thickness: f64,
    /// Degrees of angular jitter around the edge normal.
    pub spread: f64,
    pub softness: f64,
    pub feather: f64,
    pub range: f64,
    pub shadow: f64,
    pub opacity: f64,
    pub blur: f64,
}

impl Default for FiberSettings {
    fn default() -> Self {
        Self {
            density: 28.0,
            length: 18.8,
            thickness: 0.6,
            spread: 60.0,
            softness: 50.0,
            feather: 100.0,
            range: -100.0,
            shadow: 100.0,
            opacity: 100.0,
            blur: 0.0,
        }
    }
}

/// A point in full-resolution layer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldPoint {
    pub x: f64,
    pub y: f64,
}

impl FoldPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert a 16.16 fixed-point host coordinate.
    pub fn from_fixed(x: i32, y: i32) -> Self {
        Self::new(x as f64 / 65536.0, y as f64 / 65536.0)
    }
}

impl Default for FoldPoint {
    fn default() -> Self {
        Self::new(50.0, 50.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldSideSettings {
    pub width: f64,
    pub roughness: f64,
    pub rough_scale: f64,
    pub jaggedness: f64,
}

impl Default for FoldSideSettings {
    fn default() -> Self {
        Self {
            width: 1.0,
            roughness: 0.0,
            rough_scale: 200.0,
            jaggedness: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldShadowSettings {
    pub opacity: f64,
    pub length: f64,
    pub variability: f64,
    pub color: [u8; 3],
}

impl Default for FoldShadowSettings {
    fn default() -> Self {
        Self {
            opacity: 10.0,
            length: 250.0,
            variability: 50.0,
            color: [0, 0, 0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldSettings {
    pub amount: f64,
    pub point1: FoldPoint,
    pub point2: FoldPoint,
    pub line_roughness: f64,
    pub line_rough_scale: f64,
    pub line_width: f64,
    pub side_a: FoldSideSettings,
    pub side_b: FoldSideSettings,
    pub crack_amount: f64,
    pub crack_length: f64,
    pub crack_length_variation: f64,
    pub crack_density: f64,
    pub crack_branching: f64,
    /// Degrees; 90 = perpendicular to the fold.
    pub crack_angle: f64,
    pub crack_angle_variation: f64,
    pub shadow_a: FoldShadowSettings,
    pub shadow_b: FoldShadowSettings,
}

impl Default for FoldSettings {
    fn default() -> Self {
        Self {
            amount: 0.0,
            point1: FoldPoint::default(),
            point2: FoldPoint::default(),
            line_roughness: 50.0,
            line_rough_scale: 85.0,
            line_width: 0.5,
            side_a: FoldSideSettings::default(),
            side_b: FoldSideSettings {
                rough_scale: 40.0,
                ..FoldSideSettings::default()
            },
            crack_amount: 50.0,
            crack_length: 200.0,
            crack_length_variation: 100.0,
            crack_density: 5.0,
            crack_branching: 22.0,
            crack_angle: 90.0,
            crack_angle_variation: 20.0,
            shadow_a: FoldShadowSettings::default(),
            shadow_b: FoldShadowSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrungeLayerSettings {
    pub amount: f64,
    pub size: f64,
    pub opacity: f64,
    pub seed: i32,
    pub color: [u8; 3],
}

impl Default for GrungeLayerSettings {
    fn default() -> Self {
        Self {
            amount: 0.0,
            size: 10.0,
            opacity: 40.0,
            seed: 5000,
            color: [80, 60, 40],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DustSettings {
    pub amount: f64,
    pub size: f64,
    pub seed: i32,
    pub color: [u8; 3],
}

impl Default for DustSettings {
    fn default() -> Self {
        Self {
            amount: 0.0,
            size: 2.0,
            seed: 9999,
            color: [255, 255, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrungeSettings {
    pub dirt: GrungeLayerSettings,
    pub smudge: GrungeLayerSettings,
    pub dust: DustSettings,
}

impl Default for GrungeSettings {
    fn default() -> Self {
        Self {
            dirt: GrungeLayerSettings::default(),
            smudge: GrungeLayerSettings {
                amount: 0.0,
                size: 50.0,
                opacity: 20.0,
                seed: 8000,
                color: [100, 95, 85],
            },
            dust: DustSettings::default(),
        }
    }
}

/// The complete control set of the effect, in host units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TornPaperSettings {
    pub basic: BasicSettings,
    pub outer_edge: EdgeSettings,
    pub inner_edge: InnerEdgeSettings,
    pub middle1: MiddleEdgeSettings,
    pub middle2: MiddleEdgeSettings,
    pub paper: PaperSettings,
    pub fibers: FiberSettings,
    pub fold: FoldSettings,
    pub grunge: GrungeSettings,
}

impl Default for TornPaperSettings {
    fn default() -> Self {
        Self {
            basic: BasicSettings::default(),
            outer_edge: EdgeSettings::default(),
            inner_edge: InnerEdgeSettings::default(),
            middle1: MiddleEdgeSettings::default(),
            middle2: MiddleEdgeSettings::second(),
            paper: PaperSettings::default(),
            fibers: FiberSettings::default(),
            fold: FoldSettings::default(),
            grunge: GrungeSettings::default(),
        }
    }
}

impl TornPaperSettings {
    /// Parse a (possibly partial) JSON settings document.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the renderer cannot clamp its way out of.
    pub fn validate(&self) -> Result<()> {
        if !(self.basic.master_scale.is_finite() && self.basic.master_scale > 0.0) {
            return Err(TornPaperError::invalid_config(format!(
                "master scale must be a positive number, got {}",
                self.basic.master_scale
            )));
        }

        let named = [
            ("basic.gap_width", self.basic.gap_width),
            ("basic.edge_softness", self.basic.edge_softness),
            ("outer_edge.roughness", self.outer_edge.roughness),
            ("outer_edge.rough_scale", self.outer_edge.rough_scale),
            ("outer_edge.jaggedness", self.outer_edge.jaggedness),
            ("outer_edge.notch", self.outer_edge.notch),
            ("inner_edge.roughness", self.inner_edge.roughness),
            ("inner_edge.rough_scale", self.inner_edge.rough_scale),
            ("inner_edge.jaggedness", self.inner_edge.jaggedness),
            ("inner_edge.notch", self.inner_edge.notch),
            ("inner_edge.expansion", self.inner_edge.expansion),
            ("middle1.position", self.middle1.position),
            ("middle2.position", self.middle2.position),
            ("fibers.length", self.fibers.length),
            ("fibers.thickness", self.fibers.thickness),
            ("fold.point1.x", self.fold.point1.x),
            ("fold.point1.y", self.fold.point1.y),
            ("fold.point2.x", self.fold.point2.x),
            ("fold.point2.y", self.fold.point2.y),
            ("grunge.dirt.size", self.grunge.dirt.size),
            ("grunge.smudge.size", self.grunge.smudge.size),
            ("grunge.dust.size", self.grunge.dust.size),
        ];
        if let Some((name, value)) = named.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TornPaperError::invalid_config(format!(
                "{name} must be finite, got {value}"
            )));
        }

        for (name, value) in [
            ("outer_edge.rough_scale", self.outer_edge.rough_scale),
            ("inner_edge.rough_scale", self.inner_edge.rough_scale),
        ] {
            if value <= 0.0 {
                return Err(TornPaperError::invalid_config(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Validate and resolve into renderer units.
    ///
    /// # Arguments
    /// * `downsample` - Preview resolution ratio (1.0 = full resolution)
    pub fn resolve(&self, downsample: f64) -> Result<TornPaperConfig> {
        self.validate()?;
        if !(downsample.is_finite() && downsample > 0.0) {
            return Err(TornPaperError::invalid_config(format!(
                "downsample must be a positive number, got {downsample}"
            )));
        }
        Ok(self.resolve_unchecked(downsample))
    }

    fn resolve_unchecked(&self, downsample: f64) -> TornPaperConfig {
        let scale = self.basic.master_scale / 100.0;
        let pct = |v: f64| v / 100.0;

        let edge = |e: &EdgeSettings| EdgeParams {
            roughness: e.roughness,
            rough_scale: e.rough_scale,
            jaggedness: e.jaggedness,
            notch: e.notch,
        };
        let middle = |m: &MiddleEdgeSettings| MiddleEdgeParams {
            amount: pct(m.amount),
            position: pct(m.position),
            roughness: m.roughness,
            shadow: pct(m.shadow),
            fiber_density: m.fiber_density,
        };
        let side = |s: &FoldSideSettings| FoldSideParams {
            width: s.width,
            roughness: s.roughness,
            rough_scale: s.rough_scale,
            jaggedness: s.jaggedness,
            softness: FOLD_SIDE_SOFTNESS,
        };
        let fold_shadow = |s: &FoldShadowSettings| FoldShadowParams {
            opacity: pct(s.opacity),
            length: s.length,
            variability: pct(s.variability),
            color: Rgb::from_u8(s.color),
        };
        let grunge_layer = |g: &GrungeLayerSettings| GrungeLayer {
            amount: g.amount,
            size: g.size,
            opacity: pct(g.opacity),
            seed: g.seed,
            color: Rgb::from_u8(g.color),
        };

        let ie = &self.inner_edge;
        let fold = &self.fold;
        let fibers = &self.fibers;
        let paper = &self.paper;

        TornPaperConfig {
            master_scale: scale,
            gap_width: self.basic.gap_width * scale,
            seed: self.basic.seed,
            edge_softness: self.basic.edge_softness * scale,
            outer: edge(&self.outer_edge),
            inner: InnerEdgeParams {
                edge: EdgeParams {
                    roughness: ie.roughness,
                    rough_scale: ie.rough_scale,
                    jaggedness: ie.jaggedness,
                    notch: ie.notch,
                },
                expansion: ie.expansion,
            },
            middle: [middle(&self.middle1), middle(&self.middle2)],
            paper: PaperParams {
                texture: pct(paper.texture),
                shadow_amount: pct(paper.shadow_amount),
                shadow_width: paper.shadow_width * scale,
                paper_color: Rgb::from_u8(paper.paper_color),
                fiber_color: Rgb::from_u8(paper.fiber_color),
                content_shadow_amount: pct(paper.content_shadow_amount),
                content_shadow_width: paper.content_shadow_width * scale,
            },
            fibers: FiberParams {
                density: fibers.density,
                length: fibers.length * scale,
                thickness: fibers.thickness * scale,
                spread: fibers.spread,
                softness: pct(fibers.softness),
                feather: pct(fibers.feather),
                range: fibers.range,
                shadow: pct(fibers.shadow),
                opacity: pct(fibers.opacity),
                blur: fibers.blur,
                color_variation: FIBER_COLOR_VARIATION,
            },
            fold: FoldParams {
                amount: pct(fold.amount),
                point1: fold.point1,
                point2: fold.point2,
                line: FoldLineParams {
                    roughness: fold.line_roughness,
                    rough_scale: fold.line_rough_scale,
                    width: fold.line_width,
                },
                side_a: side(&fold.side_a),
                side_b: side(&fold.side_b),
                cracks: CrackParams {
                    amount: pct(fold.crack_amount),
                    length: fold.crack_length,
                    length_variation: pct(fold.crack_length_variation),
                    density: fold.crack_density,
                    branching: pct(fold.crack_branching),
                    angle: fold.crack_angle,
                    angle_variation: fold.crack_angle_variation,
                },
                shadow_a: fold_shadow(&fold.shadow_a),
                shadow_b: fold_shadow(&fold.shadow_b),
            },
            grunge: GrungeParams {
                dirt: grunge_layer(&self.grunge.dirt),
                smudge: grunge_layer(&self.grunge.smudge),
                dust: DustParams {
                    amount: self.grunge.dust.amount,
                    size: self.grunge.dust.size,
                    seed: self.grunge.dust.seed,
                    color: Rgb::from_u8(self.grunge.dust.color),
                },
            },
            downsample,
        }
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// Shape of one noise-displaced tear edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeParams {
    pub roughness: f64,
    pub rough_scale: f64,
    pub jaggedness: f64,
    pub notch: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnerEdgeParams {
    pub edge: EdgeParams,
    pub expansion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiddleEdgeParams {
    /// Fraction; 0 disables the edge.
    pub amount: f64,
    /// Fraction of the way from the outer to the inner edge.
    pub position: f64,
    pub roughness: f64,
    pub shadow: f64,
    pub fiber_density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperParams {
    pub texture: f64,
    pub shadow_amount: f64,
    pub shadow_width: f64,
    pub paper_color: Rgb,
    pub fiber_color: Rgb,
    pub content_shadow_amount: f64,
    pub content_shadow_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiberParams {
    pub density: f64,
    pub length: f64,
    pub thickness: f64,
    pub spread: f64,
    pub softness: f64,
    pub feather: f64,
    pub range: f64,
    pub shadow: f64,
    pub opacity: f64,
    pub blur: f64,
    pub color_variation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldLineParams {
    pub roughness: f64,
    pub rough_scale: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldSideParams {
    pub width: f64,
    pub roughness: f64,
    pub rough_scale: f64,
    pub jaggedness: f64,
    pub softness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrackParams {
    pub amount: f64,
    pub length: f64,
    pub length_variation: f64,
    pub density: f64,
    pub branching: f64,
    /// Degrees.
    pub angle: f64,
    /// Degrees.
    pub angle_variation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldShadowParams {
    pub opacity: f64,
    pub length: f64,
    pub variability: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldParams {
    pub amount: f64,
    /// Full-resolution layer pixels.
    pub point1: FoldPoint,
    pub point2: FoldPoint,
    pub line: FoldLineParams,
    pub side_a: FoldSideParams,
    pub side_b: FoldSideParams,
    pub cracks: CrackParams,
    pub shadow_a: FoldShadowParams,
    pub shadow_b: FoldShadowParams,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrungeLayer {
    pub amount: f64,
    pub size: f64,
    pub opacity: f64,
    pub seed: i32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustParams {
    pub amount: f64,
    pub size: f64,
    pub seed: i32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrungeParams {
    pub dirt: GrungeLayer,
    pub smudge: GrungeLayer,
    pub dust: DustParams,
}

/// Resolved, render-ready configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TornPaperConfig {
    pub master_scale: f64,
    pub gap_width: f64,
    pub seed: i32,
    pub edge_softness: f64,
    pub outer: EdgeParams,
    pub inner: InnerEdgeParams,
    pub middle: [MiddleEdgeParams; 2],
    pub paper: PaperParams,
    pub fibers: FiberParams,
    pub fold: FoldParams,
    pub grunge: GrungeParams,
    /// Preview ratio; noise is sampled at `canvas / downsample`.
    pub downsample: f64,
}

impl Default for TornPaperConfig {
    fn default() -> Self {
        TornPaperSettings::default().resolve_unchecked(1.0)
    }
}

impl TornPaperConfig {
    /// Average per-axis preview ratios into one factor.
    pub fn downsample_from_ratios(x: f64, y: f64) -> f64 {
        (x + y) * 0.5
    }

    /// Padding on every side of the output canvas, in full-resolution pixels.
    pub fn expand_pixels(&self) -> usize {
        let expand = (self.fibers.length + 20.0).trunc();
        expand.clamp(0.0, MAX_EXPAND_PIXELS) as usize
    }

    /// Padding on every side of the output canvas, in canvas pixels.
    pub fn canvas_margin(&self) -> usize {
        (self.expand_pixels() as f64 * self.downsample).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolution() {
        let cfg = TornPaperConfig::default();
        assert_eq!(cfg.master_scale, 1.0);
        assert_eq!(cfg.gap_width, -50.0);
        assert_eq!(cfg.seed, 12345);
        assert_eq!(cfg.middle[0].amount, 0.5);
        assert_eq!(cfg.middle[1].amount, 0.48);
        assert_eq!(cfg.middle[1].position, 0.25);
        assert_eq!(cfg.fibers.color_variation, FIBER_COLOR_VARIATION);
        assert_eq!(cfg.fold.side_a.softness, 0.0);
        assert_eq!(cfg.fold.side_b.rough_scale, 40.0);
        assert_eq!(cfg.fold.amount, 0.0);
        assert_eq!(cfg.grunge.smudge.seed, 8000);
        assert_eq!(cfg.paper.paper_color, Rgb::from_u8([239, 230, 217]));
    }

    #[test]
    fn test_master_scale_multiplies_lengths() {
        let mut settings = TornPaperSettings::default();
        settings.basic.master_scale = 200.0;
        let cfg = settings.resolve(1.0).unwrap();
        assert_eq!(cfg.master_scale, 2.0);
        assert_eq!(cfg.gap_width, -100.0);
        assert!((cfg.edge_softness - 4.4).abs() < 1e-12);
        assert!((cfg.fibers.length - 37.6).abs() < 1e-12);
        assert!((cfg.paper.shadow_width - 57.8).abs() < 1e-12);
        // Shape values stay in slider units.
        assert_eq!(cfg.outer.roughness, 59.0);
        assert_eq!(cfg.fold.cracks.length, 200.0);
    }

    #[test]
    fn test_percentages_become_fractions() {
        let cfg = TornPaperConfig::default();
        assert!((cfg.paper.texture - 0.85).abs() < 1e-12);
        assert_eq!(cfg.fibers.softness, 0.5);
        assert_eq!(cfg.fibers.feather, 1.0);
        assert_eq!(cfg.fold.cracks.branching, 0.22);
        assert_eq!(cfg.fold.shadow_a.opacity, 0.1);
        assert_eq!(cfg.grunge.dirt.opacity, 0.4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "basic": { "seed": 7 }, "fold": { "amount": 100, "point2": { "x": 300, "y": 10 } } }"#;
        let settings = TornPaperSettings::from_json(json).unwrap();
        assert_eq!(settings.basic.seed, 7);
        assert_eq!(settings.basic.master_scale, 100.0);
        assert_eq!(settings.fold.amount, 100.0);
        assert_eq!(settings.fold.point2, FoldPoint::new(300.0, 10.0));
        assert_eq!(settings.fold.point1, FoldPoint::default());
        assert_eq!(settings.middle2, TornPaperSettings::default().middle2);
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let json = TornPaperSettings::default().to_json().unwrap();
        let back = TornPaperSettings::from_json(&json).unwrap();
        assert_eq!(back, TornPaperSettings::default());
    }

    #[test]
    fn test_bad_json_is_error() {
        let err = TornPaperSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TornPaperError::Json(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = TornPaperSettings::default();
        settings.basic.master_scale = 0.0;
        assert!(settings.resolve(1.0).is_err());

        let mut settings = TornPaperSettings::default();
        settings.basic.gap_width = f64::NAN;
        assert!(matches!(settings.validate(), Err(TornPaperError::InvalidConfig(_))));

        assert!(TornPaperSettings::default().resolve(0.0).is_err());
        assert!(TornPaperSettings::default().resolve(f64::INFINITY).is_err());
    }

    #[test]
    fn test_fold_point_from_fixed() {
        let p = FoldPoint::from_fixed(50 << 16, (12 << 16) + 32768);
        assert_eq!(p, FoldPoint::new(50.0, 12.5));
    }

    #[test]
    fn test_canvas_margin() {
        let cfg = TornPaperConfig::default();
        // 18.8 + 20 truncated.
        assert_eq!(cfg.expand_pixels(), 38);
        assert_eq!(cfg.canvas_margin(), 38);

        let half = TornPaperSettings::default().resolve(0.5).unwrap();
        assert_eq!(half.canvas_margin(), 19);

        let mut long = TornPaperSettings::default();
        long.fibers.length = 500.0;
        assert_eq!(long.resolve(1.0).unwrap().expand_pixels(), 100);
    }

    #[test]
    fn test_downsample_average() {
        assert_eq!(TornPaperConfig::downsample_from_ratios(0.5, 0.25), 0.375);
    }
}
